use std::sync::Arc;

type Getter<S, T> = dyn Fn(&S) -> &T + Send + Sync;
type Setter<S, T> = dyn Fn(&S, T) -> S + Send + Sync;

/// Par de accesores puros sobre un campo del estado.
///
/// `set` nunca muta: devuelve un estado nuevo con el campo reemplazado. Es
/// barato de clonar (los accesores viven en `Arc`), lo que permite moverlo a
/// los `StateUpdate` que producen `accumulate` y `window`.
pub struct StateLens<S, T> {
    get: Arc<Getter<S, T>>,
    set: Arc<Setter<S, T>>,
}

impl<S, T> StateLens<S, T> {
    pub fn new<G, W>(get: G, set: W) -> Self
        where G: Fn(&S) -> &T + Send + Sync + 'static,
              W: Fn(&S, T) -> S + Send + Sync + 'static
    {
        Self { get: Arc::new(get),
               set: Arc::new(set) }
    }

    pub fn get<'s>(&self, state: &'s S) -> &'s T {
        (self.get)(state)
    }

    pub fn set(&self, state: &S, value: T) -> S {
        (self.set)(state, value)
    }
}

impl<S> StateLens<S, S> {
    /// El campo es el estado completo.
    pub fn identity() -> Self {
        Self::new(|s: &S| s, |_: &S, value: S| value)
    }
}

impl<S, T> Clone for StateLens<S, T> {
    fn clone(&self) -> Self {
        Self { get: Arc::clone(&self.get),
               set: Arc::clone(&self.set) }
    }
}

impl<S, T> std::fmt::Debug for StateLens<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StateLens(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Totals {
        sum: i64,
        label: &'static str,
    }

    #[test]
    fn set_returns_a_new_state_and_keeps_other_fields() {
        let lens = StateLens::new(|s: &Totals| &s.sum,
                                  |s: &Totals, sum| Totals { sum, ..s.clone() });
        let before = Totals { sum: 1, label: "x" };
        let after = lens.set(&before, 5);
        assert_eq!(*lens.get(&after), 5);
        assert_eq!(after.label, "x");
        assert_eq!(before.sum, 1);
    }

    #[test]
    fn identity_replaces_everything() {
        let lens = StateLens::<u32, u32>::identity();
        assert_eq!(*lens.get(&3), 3);
        assert_eq!(lens.set(&3, 9), 9);
    }
}
