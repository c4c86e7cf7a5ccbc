//! m0: ingest -> resolve -> emit sobre eventos de ingesta social.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spn_core::{named, Emission, Pipeline, Signal, StepOutput, StepResult};

pub const PIPELINE_NAME: &str = "m0_ingest_resolve_emit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialIngestionEvent {
    pub platform: String,
    pub external_id: String,
    pub actor_ref: String,
    pub content_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionState {
    pub ingested_count: u64,
    pub resolved_count: u64,
    pub last_entity_ref: String,
}

fn ingest(signal: &Signal<SocialIngestionEvent>, _state: &IngestionState) -> StepResult<SocialIngestionEvent, IngestionState> {
    let event = signal.payload();
    let emission = Emission::derived(signal,
                                     "ingest",
                                     "m0.ingest.accepted",
                                     json!({
                                         "platform": event.platform,
                                         "external_id": event.external_id,
                                         "content_hash": event.content_hash,
                                     }));
    Ok(StepOutput::one(emission))
}

fn resolve(signal: &Signal<SocialIngestionEvent>, _state: &IngestionState) -> StepResult<SocialIngestionEvent, IngestionState> {
    let event = signal.payload();
    let entity_ref = format!("{}:{}", event.platform, event.actor_ref);
    let emission = Emission::derived(signal,
                                     "resolve",
                                     "m0.resolve.completed",
                                     json!({
                                         "entity_ref": entity_ref,
                                         "external_id": event.external_id,
                                     }));
    Ok(StepOutput::one(emission).updating(move |s: &IngestionState| IngestionState { ingested_count: s.ingested_count + 1,
                                                                                    resolved_count: s.resolved_count + 1,
                                                                                    last_entity_ref: entity_ref }))
}

fn ready(signal: &Signal<SocialIngestionEvent>, state: &IngestionState) -> StepResult<SocialIngestionEvent, IngestionState> {
    let emission = Emission::derived(signal,
                                     "emit",
                                     "m0.event.ready",
                                     json!({
                                         "entity_ref": state.last_entity_ref,
                                         "ordinal": state.resolved_count,
                                     }));
    Ok(StepOutput::one(emission))
}

pub fn pipeline() -> Pipeline<SocialIngestionEvent, IngestionState> {
    Pipeline::builder(PIPELINE_NAME).step(named("ingest", ingest))
                                    .step(named("resolve", resolve))
                                    .step(named("emit", ready))
                                    .build()
}

pub fn signal(signal_id: impl Into<String>,
              timestamp: DateTime<Utc>,
              source: impl Into<String>,
              event: SocialIngestionEvent)
              -> Signal<SocialIngestionEvent> {
    Signal::new(signal_id, timestamp, source, event)
}
