//! m2: ranking de candidatos -> borrador de recomendación.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spn_core::{named, Emission, Pipeline, Signal, StepError, StepOutput, StepResult};

use crate::numeric::round_to;

pub const PIPELINE_NAME: &str = "m2_rank_and_draft";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub context_boost: f64,
}

impl Candidate {
    pub fn new(candidate_id: impl Into<String>, title: impl Into<String>, score: f64, context_boost: f64) -> Self {
        Self { candidate_id: candidate_id.into(),
               title: title.into(),
               score,
               context_boost }
    }

    /// Score combinado agrupado a 3 decimales: valores casi iguales empatan y
    /// el desempate queda en manos del id.
    pub fn bucketed_score(&self) -> f64 {
        round_to(self.score + self.context_boost, 3)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSignal {
    pub audience_id: String,
    pub prompt: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationState {
    pub ranked_count: u64,
    pub drafted_count: u64,
    pub latest_top_candidate_id: String,
    pub latest_ranked_ids: Vec<String>,
}

/// Orden por `(-round(score + boost, 3), candidate_id)`. Orden total: los
/// scores NaN quedan agrupados en un extremo, desempatados por id.
pub fn rank(candidates: &[Candidate]) -> Vec<&Candidate> {
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| {
              b.bucketed_score()
               .total_cmp(&a.bucketed_score())
               .then_with(|| a.candidate_id.cmp(&b.candidate_id))
          });
    ranked
}

fn recommendation(signal: &Signal<RecommendationSignal>,
                  _state: &RecommendationState)
                  -> StepResult<RecommendationSignal, RecommendationState> {
    let request = signal.payload();
    let ranked = rank(&request.candidates);
    let top = ranked.first()
                    .map(|c| c.candidate_id.clone())
                    .ok_or_else(|| {
                        StepError::new("cannot rank an empty candidate list")
                            .with_detail(json!({ "audience_id": request.audience_id }))
                    })?;
    let ranked_ids: Vec<String> = ranked.iter().map(|c| c.candidate_id.clone()).collect();

    let emission = Emission::derived(signal,
                                     "recommendation",
                                     "m2.recommendation.ranked",
                                     json!({
                                         "audience_id": request.audience_id,
                                         "ranked_ids": ranked_ids,
                                         "top_candidate_id": top,
                                     }));
    let update = move |s: &RecommendationState| RecommendationState { ranked_count: s.ranked_count + 1,
                                                                      latest_top_candidate_id: top,
                                                                      latest_ranked_ids: ranked_ids,
                                                                      ..s.clone() };
    Ok(StepOutput::one(emission).updating(update))
}

fn draft(signal: &Signal<RecommendationSignal>,
         state: &RecommendationState)
         -> StepResult<RecommendationSignal, RecommendationState> {
    let request = signal.payload();
    if state.latest_top_candidate_id.is_empty() {
        return Ok(StepOutput::none());
    }
    let Some(top) = request.candidates
                           .iter()
                           .find(|c| c.candidate_id == state.latest_top_candidate_id)
    else {
        return Ok(StepOutput::none());
    };

    let emission = Emission::derived(signal,
                                     "draft",
                                     "m2.draft.generated",
                                     json!({
                                         "audience_id": request.audience_id,
                                         "recommended_candidate_id": top.candidate_id,
                                         "draft_text": format!("{}: {}", request.prompt, top.title),
                                     }));
    Ok(StepOutput::one(emission).updating(|s: &RecommendationState| RecommendationState { drafted_count: s.drafted_count + 1,
                                                                                         ..s.clone() }))
}

pub fn pipeline() -> Pipeline<RecommendationSignal, RecommendationState> {
    Pipeline::builder(PIPELINE_NAME).step(named("recommendation", recommendation))
                                    .step(named("draft", draft))
                                    .build()
}

pub fn signal(signal_id: impl Into<String>,
              timestamp: DateTime<Utc>,
              source: impl Into<String>,
              request: RecommendationSignal)
              -> Signal<RecommendationSignal> {
    Signal::new(signal_id, timestamp, source, request)
}
