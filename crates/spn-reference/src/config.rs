//! Carga de configuración de recompensas desde variables de entorno.
//! Convención `SPN_REWARD_*`; las variables ausentes toman el default.

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const ENV_EARLY_CONVICTION: &str = "SPN_REWARD_EARLY_CONVICTION";
pub const ENV_EARLY_CONVICTION_MULTIPLIER: &str = "SPN_REWARD_EARLY_CONVICTION_MULTIPLIER";
pub const ENV_EARLY_CONVICTION_DAYS: &str = "SPN_REWARD_EARLY_CONVICTION_DAYS";

/// Controles del pipeline m4 para experimentos de recompensas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub enable_early_conviction_multiplier: bool,
    pub early_conviction_multiplier: f64,
    pub early_conviction_days_threshold: u32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self { enable_early_conviction_multiplier: false,
               early_conviction_multiplier: 1.25,
               early_conviction_days_threshold: 30 }
    }
}

impl RewardConfig {
    /// Multiplicador activado con los valores por defecto.
    pub fn with_early_conviction() -> Self {
        Self { enable_early_conviction_multiplier: true,
               ..Self::default() }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de una función arbitraria (tests,
    /// configuraciones embebidas).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let config = Self { enable_early_conviction_multiplier:
                                parse_or(&lookup, ENV_EARLY_CONVICTION, "a boolean", parse_bool)?
                                .unwrap_or(defaults.enable_early_conviction_multiplier),
                            early_conviction_multiplier:
                                parse_or(&lookup, ENV_EARLY_CONVICTION_MULTIPLIER, "a number", parse_from_str)?
                                .unwrap_or(defaults.early_conviction_multiplier),
                            early_conviction_days_threshold:
                                parse_or(&lookup, ENV_EARLY_CONVICTION_DAYS, "a whole number of days", parse_from_str)?
                                .unwrap_or(defaults.early_conviction_days_threshold) };
        debug!("reward config loaded: {:?}", config);
        Ok(config)
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

fn parse_or<F, T>(lookup: &F,
                  key: &'static str,
                  expected: &'static str,
                  parse: fn(&str) -> Option<T>)
                  -> Result<Option<T>, ConfigError>
    where F: Fn(&str) -> Option<String>
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => parse(raw.trim()).map(Some)
                                      .ok_or(ConfigError::InvalidValue { key,
                                                                         value: raw,
                                                                         expected }),
    }
}

fn parse_from_str<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
