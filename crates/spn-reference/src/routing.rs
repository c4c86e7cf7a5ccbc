//! m1: profile -> score -> route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spn_core::{named, Emission, Pipeline, Signal, StepOutput, StepResult};

use crate::numeric::round_to;

pub const PIPELINE_NAME: &str = "m1_profile_score_route";

pub const PRIORITY_REVIEW: &str = "priority_review";
pub const STANDARD_QUEUE: &str = "standard_queue";

/// Score mínimo para la cola de revisión prioritaria.
pub const PRIORITY_THRESHOLD: f64 = 0.75;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSignal {
    pub profile_id: String,
    pub profile_tier: String,
    pub quality_score: f64,
    pub intent_score: f64,
    pub channel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingState {
    pub profiled_count: u64,
    pub scored_count: u64,
    pub routed_count: u64,
    pub last_route: String,
}

/// `round(0.6 * quality + 0.4 * intent, 4)`.
pub fn blended_score(profile: &ProfileSignal) -> f64 {
    round_to(profile.quality_score * 0.6 + profile.intent_score * 0.4, 4)
}

pub fn route_for(score: f64) -> &'static str {
    if score >= PRIORITY_THRESHOLD {
        PRIORITY_REVIEW
    } else {
        STANDARD_QUEUE
    }
}

fn profile(signal: &Signal<ProfileSignal>, _state: &RoutingState) -> StepResult<ProfileSignal, RoutingState> {
    let p = signal.payload();
    Ok(StepOutput::one(Emission::derived(signal,
                                         "profile",
                                         "m1.profile.enriched",
                                         json!({
                                             "profile_id": p.profile_id,
                                             "profile_tier": p.profile_tier,
                                             "channel": p.channel,
                                         }))))
}

fn score(signal: &Signal<ProfileSignal>, _state: &RoutingState) -> StepResult<ProfileSignal, RoutingState> {
    let p = signal.payload();
    let score = blended_score(p);
    let route = route_for(score);
    let emission = Emission::derived(signal,
                                     "score",
                                     "m1.scores.computed",
                                     json!({
                                         "profile_id": p.profile_id,
                                         "score": score,
                                         "route_hint": route,
                                     }));
    Ok(StepOutput::one(emission).updating(move |s: &RoutingState| RoutingState { profiled_count: s.profiled_count + 1,
                                                                                scored_count: s.scored_count + 1,
                                                                                last_route: route.to_string(),
                                                                                ..s.clone() }))
}

fn route(signal: &Signal<ProfileSignal>, state: &RoutingState) -> StepResult<ProfileSignal, RoutingState> {
    let emission = Emission::derived(signal,
                                     "route",
                                     "m1.route.selected",
                                     json!({
                                         "profile_id": signal.payload().profile_id,
                                         "route": state.last_route,
                                     }));
    Ok(StepOutput::one(emission).updating(|s: &RoutingState| RoutingState { routed_count: s.routed_count + 1,
                                                                           ..s.clone() }))
}

pub fn pipeline() -> Pipeline<ProfileSignal, RoutingState> {
    Pipeline::builder(PIPELINE_NAME).step(named("profile", profile))
                                    .step(named("score", score))
                                    .step(named("route", route))
                                    .build()
}

pub fn signal(signal_id: impl Into<String>,
              timestamp: DateTime<Utc>,
              source: impl Into<String>,
              profile: ProfileSignal)
              -> Signal<ProfileSignal> {
    Signal::new(signal_id, timestamp, source, profile)
}
