//! Aritmética determinista compartida por los pipelines de referencia.

use std::collections::BTreeMap;

/// Redondeo decimal a `places` dígitos con empate al par, calculado sobre el
/// valor binario exacto (el mismo resultado en cualquier plataforma).
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Participación de cada clave sobre el total de pesos (negativos cuentan
/// como 0), redondeada a 6 decimales. Con total 0 reparte en partes iguales.
/// Claves repetidas suman al total; en el resultado gana la última.
pub fn shares(weights: &[(String, f64)]) -> BTreeMap<String, f64> {
    if weights.is_empty() {
        return BTreeMap::new();
    }
    let total: f64 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    if total > 0.0 {
        weights.iter()
               .map(|(key, w)| (key.clone(), round_to(w.max(0.0) / total, 6)))
               .collect()
    } else {
        let equal = round_to(1.0 / weights.len() as f64, 6);
        weights.iter().map(|(key, _)| (key.clone(), equal)).collect()
    }
}

/// Reparte `pool` en proporción a los pesos, redondeando a 6 decimales. Con
/// total no positivo todos reciben 0.
pub fn proportional_split(pool: f64, weights: &[(String, f64)]) -> BTreeMap<String, f64> {
    let total: f64 = weights.iter().map(|(_, w)| w.max(0.0)).sum();
    weights.iter()
           .map(|(key, w)| {
               let amount = if total > 0.0 { round_to(pool * (w.max(0.0) / total), 6) } else { 0.0 };
               (key.clone(), amount)
           })
           .collect()
}
