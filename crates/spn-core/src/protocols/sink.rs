use std::convert::Infallible;

use log::trace;

use crate::hashing::fingerprint_emissions;
use crate::model::Emission;

/// Capacidad de aceptar lotes de emisiones (persistencia, reenvío, ...).
pub trait EmissionSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Acepta un lote en el orden recibido.
    fn accept(&mut self, emissions: &[Emission]) -> Result<(), Self::Error>;
}

/// Sink en memoria: guarda todo lo aceptado en orden de llegada.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    emissions: Vec<Emission>,
    batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    /// Cantidad de llamadas a `accept`.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Fingerprint blake3 de todo lo aceptado hasta ahora.
    pub fn fingerprint(&self) -> String {
        fingerprint_emissions(&self.emissions)
    }

    pub fn into_emissions(self) -> Vec<Emission> {
        self.emissions
    }
}

impl EmissionSink for MemorySink {
    type Error = Infallible;

    fn accept(&mut self, emissions: &[Emission]) -> Result<(), Self::Error> {
        trace!("memory sink accepted {} emission(s)", emissions.len());
        self.emissions.extend_from_slice(emissions);
        self.batches += 1;
        Ok(())
    }
}
