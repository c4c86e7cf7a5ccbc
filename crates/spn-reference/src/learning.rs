//! m3: attempt -> outcome -> failure -> calibration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spn_core::{named, Emission, Pipeline, Signal, StepOutput, StepResult};

use crate::numeric::round_to;

pub const PIPELINE_NAME: &str = "m3_attempt_outcome_failure_calibration";

/// Brecha a partir de la cual un fallo deja de ser menor.
pub const MAJOR_GAP_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSignal {
    pub learner_id: String,
    pub skill_id: String,
    pub attempt_id: String,
    pub expected_score: f64,
    pub observed_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    None,
    MinorGap,
    MajorGap,
}

impl FailureClass {
    pub fn from_gap(gap: f64) -> Self {
        if gap <= 0.0 {
            FailureClass::None
        } else if gap < MAJOR_GAP_THRESHOLD {
            FailureClass::MinorGap
        } else {
            FailureClass::MajorGap
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::None => "none",
            FailureClass::MinorGap => "minor_gap",
            FailureClass::MajorGap => "major_gap",
        }
    }

    /// Propuesta de calibración asociada.
    pub fn proposal(&self) -> &'static str {
        match self {
            FailureClass::None => "maintain",
            FailureClass::MinorGap => "increase_support",
            FailureClass::MajorGap => "rebuild_foundation",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningState {
    pub attempts_seen: u64,
    pub outcomes_emitted: u64,
    pub failures_emitted: u64,
    pub calibrations_emitted: u64,
    pub latest_gap: f64,
    pub latest_failure_class: Option<FailureClass>,
}

fn attempt(signal: &Signal<AttemptSignal>, _state: &LearningState) -> StepResult<AttemptSignal, LearningState> {
    let a = signal.payload();
    Ok(StepOutput::one(Emission::derived(signal,
                                         "attempt",
                                         "m3.attempt.snapshot",
                                         json!({
                                             "learner_id": a.learner_id,
                                             "skill_id": a.skill_id,
                                             "attempt_id": a.attempt_id,
                                             "expected_score": a.expected_score,
                                             "observed_score": a.observed_score,
                                         }))))
}

fn outcome(signal: &Signal<AttemptSignal>, _state: &LearningState) -> StepResult<AttemptSignal, LearningState> {
    let a = signal.payload();
    let gap = round_to(a.expected_score - a.observed_score, 4);
    let passed = a.observed_score >= a.expected_score;
    let emission = Emission::derived(signal,
                                     "outcome",
                                     "m3.outcome.evaluated",
                                     json!({
                                         "attempt_id": a.attempt_id,
                                         "passed": passed,
                                         "gap": gap,
                                     }));
    Ok(StepOutput::one(emission).updating(move |s: &LearningState| LearningState { attempts_seen: s.attempts_seen + 1,
                                                                                  outcomes_emitted: s.outcomes_emitted + 1,
                                                                                  latest_gap: gap,
                                                                                  ..s.clone() }))
}

fn failure(signal: &Signal<AttemptSignal>, state: &LearningState) -> StepResult<AttemptSignal, LearningState> {
    let class = FailureClass::from_gap(state.latest_gap);
    let emission = Emission::derived(signal,
                                     "failure",
                                     "m3.failure.classified",
                                     json!({
                                         "attempt_id": signal.payload().attempt_id,
                                         "failure_class": class.as_str(),
                                         "gap": state.latest_gap,
                                     }));
    Ok(StepOutput::one(emission).updating(move |s: &LearningState| LearningState { failures_emitted: s.failures_emitted + 1,
                                                                                  latest_failure_class: Some(class),
                                                                                  ..s.clone() }))
}

fn calibration(signal: &Signal<AttemptSignal>, state: &LearningState) -> StepResult<AttemptSignal, LearningState> {
    let (proposal, class) = match state.latest_failure_class {
        Some(class) => (class.proposal(), class.as_str()),
        None => (FailureClass::MinorGap.proposal(), ""),
    };
    let emission = Emission::derived(signal,
                                     "calibration",
                                     "m3.calibration.proposed",
                                     json!({
                                         "attempt_id": signal.payload().attempt_id,
                                         "proposal": proposal,
                                         "failure_class": class,
                                     }));
    Ok(StepOutput::one(emission).updating(|s: &LearningState| LearningState { calibrations_emitted: s.calibrations_emitted + 1,
                                                                             ..s.clone() }))
}

pub fn pipeline() -> Pipeline<AttemptSignal, LearningState> {
    Pipeline::builder(PIPELINE_NAME).step(named("attempt", attempt))
                                    .step(named("outcome", outcome))
                                    .step(named("failure", failure))
                                    .step(named("calibration", calibration))
                                    .build()
}

pub fn signal(signal_id: impl Into<String>,
              timestamp: DateTime<Utc>,
              source: impl Into<String>,
              attempt: AttemptSignal)
              -> Signal<AttemptSignal> {
    Signal::new(signal_id, timestamp, source, attempt)
}
