//! Ventanas sobre payloads recientes guardadas dentro del estado.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::StateLens;
use crate::model::{Emission, Signal};
use crate::step::{StateUpdate, Step, StepOutput, StepResult};

/// Umbral que dispara la ventana.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowTrigger {
    /// Se alcanzan `n` entradas en el buffer.
    Count(usize),
    /// El timestamp más nuevo está a `span` o más del más viejo (sin importar
    /// el orden de llegada).
    Span(Duration),
}

/// Qué hacer con el buffer después de disparar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Vaciar el buffer.
    #[default]
    Tumbling,
    /// Conservar las `n - 1` entradas más recientes (`Count`) o las que caen
    /// dentro del span medido desde el timestamp más nuevo (`Span`).
    Sliding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowEntry<P> {
    pub timestamp: DateTime<Utc>,
    pub payload: P,
}

/// Buffer persistido en el estado. Se reemplaza entero en cada señal.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowBuffer<P> {
    entries: Vec<WindowEntry<P>>,
}

impl<P> Default for WindowBuffer<P> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<P> WindowBuffer<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[WindowEntry<P>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timestamps extremos del buffer, sin importar el orden de llegada.
    fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let oldest = self.entries.iter().map(|e| e.timestamp).min()?;
        let newest = self.entries.iter().map(|e| e.timestamp).max()?;
        Some((oldest, newest))
    }

    fn crossed(&self, trigger: WindowTrigger) -> bool {
        match trigger {
            WindowTrigger::Count(n) => self.entries.len() >= n.max(1),
            WindowTrigger::Span(span) => self.bounds()
                                             .map(|(oldest, newest)| newest - oldest >= span)
                                             .unwrap_or(false),
        }
    }

    fn after_fire(mut self, trigger: WindowTrigger, mode: WindowMode) -> Self {
        match (mode, trigger) {
            (WindowMode::Tumbling, _) => self.entries.clear(),
            (WindowMode::Sliding, WindowTrigger::Count(n)) => {
                // quedan las n - 1 entradas más recientes
                let keep = n.max(1) - 1;
                let excess = self.entries.len().saturating_sub(keep);
                self.entries.drain(..excess);
            }
            (WindowMode::Sliding, WindowTrigger::Span(span)) => {
                if let Some((_, newest)) = self.bounds() {
                    self.entries.retain(|e| newest - e.timestamp < span);
                }
            }
        }
        self
    }
}

impl<P> From<Vec<WindowEntry<P>>> for WindowBuffer<P> {
    fn from(entries: Vec<WindowEntry<P>>) -> Self {
        Self { entries }
    }
}

type OnFire<P, S> = dyn Fn(&Signal<P>, &[WindowEntry<P>], &S) -> Vec<Emission> + Send + Sync;

/// Step de ventana: agrega `(timestamp, payload)` al buffer y, si el umbral
/// se cruza, produce las emisiones de `on_fire` con la ventana completa.
pub struct Window<P, S> {
    id: String,
    lens: StateLens<S, WindowBuffer<P>>,
    trigger: WindowTrigger,
    mode: WindowMode,
    on_fire: Arc<OnFire<P, S>>,
}

pub fn window<P, S, F>(id: impl Into<String>,
                       lens: StateLens<S, WindowBuffer<P>>,
                       trigger: WindowTrigger,
                       on_fire: F)
                       -> Window<P, S>
    where F: Fn(&Signal<P>, &[WindowEntry<P>], &S) -> Vec<Emission> + Send + Sync + 'static
{
    Window { id: id.into(),
             lens,
             trigger,
             mode: WindowMode::Tumbling,
             on_fire: Arc::new(on_fire) }
}

impl<P, S> Window<P, S> {
    pub fn sliding(mut self) -> Self {
        self.mode = WindowMode::Sliding;
        self
    }

    pub fn mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }
}

impl<P, S> Step<P, S> for Window<P, S>
    where P: Clone + 'static,
          S: 'static
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        let mut buffer = self.lens.get(state).clone();
        buffer.entries.push(WindowEntry { timestamp: signal.timestamp(),
                                          payload: signal.payload().clone() });

        let (emissions, next) = if buffer.crossed(self.trigger) {
            let fired = (self.on_fire)(signal, buffer.entries(), state);
            (fired, buffer.after_fire(self.trigger, self.mode))
        } else {
            (Vec::new(), buffer)
        };

        let lens = self.lens.clone();
        Ok(StepOutput::emit(emissions).with_update(StateUpdate::new(move |state: &S| lens.set(state, next))))
    }
}
