use crate::model::Signal;

/// Capacidad de producir señales de forma perezosa. La secuencia puede ser
/// infinita y no necesariamente reiniciable.
pub trait SignalSource<P> {
    /// Siguiente señal, o `None` cuando la fuente se agotó.
    fn next_signal(&mut self) -> Option<Signal<P>>;

    /// Vista de la fuente como `Iterator`. Consume la fuente a medida que se
    /// recorre.
    fn signals(&mut self) -> Signals<'_, Self, P>
        where Self: Sized
    {
        Signals { source: self,
                  _payload: std::marker::PhantomData }
    }
}

/// Adaptador `Iterator` devuelto por `SignalSource::signals`.
pub struct Signals<'a, T, P> {
    source: &'a mut T,
    _payload: std::marker::PhantomData<fn() -> P>,
}

impl<T, P> Iterator for Signals<'_, T, P> where T: SignalSource<P>
{
    type Item = Signal<P>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_signal()
    }
}

/// Fuente respaldada por cualquier iterador de señales.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I> {
    pub fn new<T>(signals: T) -> Self
        where T: IntoIterator<IntoIter = I>
    {
        Self { inner: signals.into_iter() }
    }
}

impl<P, I> SignalSource<P> for IterSource<I> where I: Iterator<Item = Signal<P>>
{
    fn next_signal(&mut self) -> Option<Signal<P>> {
        self.inner.next()
    }
}
