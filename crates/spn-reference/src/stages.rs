//! Tabla de etapas de demo -> pipeline de referencia y sufijos de emisión.

use std::collections::BTreeMap;

use crate::{ingestion, learning, recommendations, routing};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub stage_key: &'static str,
    pub pipeline_name: &'static str,
    pub module_name: &'static str,
    pub emission_suffixes: &'static [&'static str],
}

pub fn stage_specs() -> BTreeMap<&'static str, StageSpec> {
    let specs = [StageSpec { stage_key: "m0_ingest",
                             pipeline_name: ingestion::PIPELINE_NAME,
                             module_name: "spn_reference::ingestion",
                             emission_suffixes: &["ingest", "resolve", "emit"] },
                 StageSpec { stage_key: "m1_route",
                             pipeline_name: routing::PIPELINE_NAME,
                             module_name: "spn_reference::routing",
                             emission_suffixes: &["profile", "score", "route"] },
                 StageSpec { stage_key: "m2_shortlist",
                             pipeline_name: recommendations::PIPELINE_NAME,
                             module_name: "spn_reference::recommendations",
                             emission_suffixes: &["recommendation", "draft"] },
                 StageSpec { stage_key: "m3_learning",
                             pipeline_name: learning::PIPELINE_NAME,
                             module_name: "spn_reference::learning",
                             emission_suffixes: &["attempt", "outcome", "failure", "calibration"] }];
    specs.into_iter().map(|spec| (spec.stage_key, spec)).collect()
}

/// Ids de emisión esperados para `signal_id` en la etapa `stage_key`, o
/// `None` si la etapa no existe.
pub fn expected_emission_ids(signal_id: &str, stage_key: &str) -> Option<Vec<String>> {
    let specs = stage_specs();
    let spec = specs.get(stage_key)?;
    Some(spec.emission_suffixes
             .iter()
             .map(|suffix| format!("{signal_id}:{suffix}"))
             .collect())
}
