//! Constantes del runtime.
//!
//! `ENGINE_VERSION` forma parte del input del fingerprint de emisiones: un
//! cambio incompatible del contrato de serialización debe incrementarla para
//! que los goldens de replay se recalculen de forma explícita.

/// Versión lógica del contrato de emisiones.
pub const ENGINE_VERSION: &str = "S1.0";

/// Clave de metadata reservada para el registro de auditoría de una emisión.
pub const TRACE_KEY: &str = "trace";
