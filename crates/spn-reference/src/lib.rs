//! spn-reference: pipelines de referencia construidos sobre `spn-core`.
//!
//! - `ingestion` (m0): ingest -> resolve -> emit
//! - `routing` (m1): profile -> score -> route
//! - `recommendations` (m2): ranking -> draft
//! - `learning` (m3): attempt -> outcome -> failure -> calibration
//! - `rewards` (m4): attention -> pool -> staker, configurable vía `config`
//!
//! Todas las emisiones usan ids `"{signal_id}:{suffix}"` y el timestamp de la
//! señal que las causa.
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod learning;
pub mod numeric;
pub mod recommendations;
pub mod rewards;
pub mod routing;
pub mod stages;

pub use config::{init_dotenv, RewardConfig};
pub use errors::ConfigError;
pub use stages::{expected_emission_ids, stage_specs, StageSpec};
