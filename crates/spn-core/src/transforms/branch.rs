use std::fmt::Debug;

use serde_json::json;

use crate::errors::StepError;
use crate::model::Signal;
use crate::step::{Step, StepResult};

/// Step que elige exactamente un sub-step según `selector(payload, state)` y
/// devuelve su resultado sin modificarlo.
pub struct Branch<P, S, K, F> {
    id: String,
    selector: F,
    arms: Vec<(K, Box<dyn Step<P, S>>)>,
    fallback: Option<Box<dyn Step<P, S>>>,
}

pub fn branch<P, S, K, F>(id: impl Into<String>, selector: F) -> Branch<P, S, K, F>
    where F: Fn(&P, &S) -> K + Send + Sync
{
    Branch { id: id.into(),
             selector,
             arms: Vec::new(),
             fallback: None }
}

impl<P, S, K, F> Branch<P, S, K, F> {
    /// Agrega un brazo; ante claves repetidas gana el primero registrado.
    pub fn arm<T>(mut self, key: K, step: T) -> Self
        where T: Step<P, S> + 'static
    {
        self.arms.push((key, Box::new(step)));
        self
    }

    pub fn otherwise<T>(mut self, step: T) -> Self
        where T: Step<P, S> + 'static
    {
        self.fallback = Some(Box::new(step));
        self
    }
}

impl<P, S, K, F> Step<P, S> for Branch<P, S, K, F>
    where K: PartialEq + Debug + Send + Sync,
          F: Fn(&P, &S) -> K + Send + Sync
{
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, signal: &Signal<P>, state: &S) -> StepResult<P, S> {
        let key = (self.selector)(signal.payload(), state);
        let chosen = self.arms
                         .iter()
                         .find(|(candidate, _)| *candidate == key)
                         .map(|(_, step)| step)
                         .or(self.fallback.as_ref());
        match chosen {
            Some(step) => step.run(signal, state),
            None => Err(StepError::new(format!("branch `{}` has no arm for key {:?}", self.id, key))
                        .with_detail(json!({ "branch": self.id, "key": format!("{key:?}") }))),
        }
    }
}
