use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use spn_core::hashing::fingerprint_emissions;
use spn_core::{emit, emit_if, named, offset_timestamp, signal_timestamp, suffixed_id, Emission, Engine, Pipeline,
               Signal, StepOutput, StepResult};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
struct Tally {
    count: u32,
    total: i64,
}

fn tally(signal: &Signal<i64>, state: &Tally) -> StepResult<i64, Tally> {
    let amount = *signal.payload();
    let emission = Emission::derived(signal,
                                     "tally",
                                     "tally.updated",
                                     json!({"count": state.count + 1, "total": state.total + amount}));
    Ok(StepOutput::one(emission).updating(move |s: &Tally| Tally { count: s.count + 1,
                                                                  total: s.total + amount }))
}

fn pipeline() -> Arc<Pipeline<i64, Tally>> {
    Arc::new(Pipeline::builder("tally_and_flag").step(named("tally", tally))
                                                .step(emit_if(|p: &i64, _: &Tally| *p >= 100,
                                                              "score.high",
                                                              |p: &i64, s: &Tally| json!({"amount": p, "seen": s.count}),
                                                              suffixed_id("score_high"),
                                                              offset_timestamp(Duration::seconds(1))))
                                                .build())
}

fn signal(id: &str, amount: i64) -> Signal<i64> {
    Signal::new(id, Utc.with_ymd_and_hms(2026, 2, 6, 13, 0, 0).unwrap(), "scores", amount)
}

#[test]
fn fresh_engines_produce_identical_serialized_output() {
    let shared = pipeline();
    let mut first = Engine::new(Arc::clone(&shared), Tally::default());
    let mut second = Engine::new(shared, Tally::default());
    let input = signal("sig_456", 150);

    let a = first.process(&input).unwrap();
    let b = second.process(&input).unwrap();

    let serialized_a: Vec<String> = a.iter().map(|e| e.to_value().to_string()).collect();
    let serialized_b: Vec<String> = b.iter().map(|e| e.to_value().to_string()).collect();
    assert_eq!(serialized_a, serialized_b);
    assert_eq!(fingerprint_emissions(&a), fingerprint_emissions(&b));
    assert_ne!(first.id(), second.id());
}

#[test]
fn emit_if_true_emits_after_the_state_update_with_offset_timestamp() {
    let mut engine = Engine::new(pipeline(), Tally::default());

    let out = engine.process(&signal("sig_456", 150)).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[1].emission_id(), "sig_456:score_high");
    assert_eq!(out[1].emission_type(), "score.high");
    assert_eq!(out[1].timestamp(), out[0].timestamp() + Duration::seconds(1));
    assert_eq!(out[1].payload(), &json!({"amount": 150, "seen": 1}));
}

#[test]
fn emit_if_false_leaves_no_trace() {
    let mut engine = Engine::new(pipeline(), Tally::default());

    let out = engine.process(&signal("sig_1", 5)).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].emission_id(), "sig_1:tally");
    assert_eq!(engine.state(), &Tally { count: 1, total: 5 });
}

#[test]
fn batch_keeps_signal_order_and_carries_state() {
    let mut engine = Engine::new(pipeline(), Tally::default());
    let batch = vec![signal("s1", 120), signal("s2", 7), signal("s3", 300)];

    let out = engine.process_batch(&batch).unwrap();

    let ids: Vec<&str> = out.iter().map(|e| e.emission_id()).collect();
    assert_eq!(ids, vec!["s1:tally", "s1:score_high", "s2:tally", "s3:tally", "s3:score_high"]);
    assert!(out.iter().all(|e| e.emission_id().starts_with(e.caused_by())));
    assert_eq!(out[2].payload(), &json!({"count": 2, "total": 127}));
    assert_eq!(engine.snapshot(), Tally { count: 3, total: 427 });
}

#[test]
fn unconditional_emit_uses_signal_timestamp() {
    let step = emit("echo", |p: &i64, _: &()| json!(p), suffixed_id("echo"), signal_timestamp());
    let mut engine = Engine::from_pipeline(Pipeline::builder("echo").step(step).build(), ());
    let input = signal("sig_9", 3);

    let out = engine.process(&input).unwrap();

    assert_eq!(out[0].timestamp(), input.timestamp());
    assert_eq!(out[0].caused_by(), "sig_9");
}

#[test]
fn engines_over_a_shared_pipeline_run_in_parallel() {
    use rayon::prelude::*;

    let shared = pipeline();
    let totals: Vec<Tally> = (0..8).into_par_iter()
                                   .map(|worker| {
                                       let mut engine = Engine::new(Arc::clone(&shared), Tally::default());
                                       let batch: Vec<Signal<i64>> =
                                           (0..10).map(|i| signal(&format!("w{worker}_{i}"), i * worker)).collect();
                                       engine.process_batch(&batch).expect("batch");
                                       engine.into_state()
                                   })
                                   .collect();

    for (worker, tally) in totals.iter().enumerate() {
        assert_eq!(tally.count, 10);
        assert_eq!(tally.total, 45 * worker as i64);
    }
}
