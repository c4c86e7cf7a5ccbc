use std::fmt;

use serde_json::json;

use super::Step;
use crate::hashing::hash_value;

/// Secuencia ordenada e inmutable de steps más un nombre de diagnóstico.
///
/// No guarda datos mutables: se comparte entre engines vía `Arc<Pipeline>`.
/// Construirlo no valida nada más allá de aceptar el orden recibido.
///
/// Usage:
///   let pipeline = Pipeline::builder("m0").step(ingest).step(resolve).build();
///   let engine = Engine::new(Arc::new(pipeline), State::default());
pub struct Pipeline<P, S> {
    name: String,
    steps: Vec<Box<dyn Step<P, S>>>,
}

impl<P, S> Pipeline<P, S> {
    pub fn new(name: impl Into<String>, steps: Vec<Box<dyn Step<P, S>>>) -> Self {
        Self { name: name.into(),
               steps }
    }

    pub fn builder(name: impl Into<String>) -> PipelineBuilder<P, S> {
        PipelineBuilder { name: name.into(),
                          steps: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Box<dyn Step<P, S>>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Hash estable de la forma del pipeline (nombre + ids en orden).
    pub fn definition_hash(&self) -> String {
        hash_value(&json!({
            "name": self.name,
            "steps": self.step_ids(),
        }))
    }
}

impl<P, S> fmt::Debug for Pipeline<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
         .field("name", &self.name)
         .field("steps", &self.step_ids())
         .finish()
    }
}

/// Builder incremental; el orden de `step` es el orden de ejecución.
pub struct PipelineBuilder<P, S> {
    name: String,
    steps: Vec<Box<dyn Step<P, S>>>,
}

impl<P, S> PipelineBuilder<P, S> {
    pub fn step<T>(mut self, step: T) -> Self
        where T: Step<P, S> + 'static
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn boxed(mut self, step: Box<dyn Step<P, S>>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Pipeline<P, S> {
        Pipeline::new(self.name, self.steps)
    }
}
