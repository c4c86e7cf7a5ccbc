//! Combinadores: funciones que construyen las formas de step más comunes.
//!
//! Cada combinador devuelve un struct pequeño que implementa `Step`, de modo
//! que se compone con `Pipeline::builder(..).step(..)` igual que un step
//! escrito a mano.
//!
//! | combinador      | emite                   | estado                     | flujo |
//! |-----------------|-------------------------|----------------------------|-------|
//! | `map_signal`    | nada                    | sin cambio                 | payload reescrito |
//! | `filter_signal` | nada                    | sin cambio                 | `Halt` si el predicado es falso |
//! | `accumulate`    | nada                    | fold sobre un campo        | continúa |
//! | `window`        | `on_fire` al cruzar     | buffer en un campo         | continúa |
//! | `emit`/`emit_if`| una emisión (o ninguna) | sin cambio                 | continúa |
//! | `branch`        | lo que emita el brazo   | lo que devuelva el brazo   | idem  |
//! | `merge`         | concatenación           | reemplazos compuestos      | `Halt` si alguno corta |

mod accumulate;
mod branch;
mod emit;
mod lens;
mod map;
mod merge;
mod window;

pub use accumulate::{accumulate, Accumulate};
pub use branch::{branch, Branch};
pub use emit::{emit, emit_if, offset_timestamp, signal_timestamp, suffixed_id, Emit};
pub use lens::StateLens;
pub use map::{filter_signal, map_signal, FilterSignal, MapSignal};
pub use merge::{merge, Merge};
pub use window::{window, Window, WindowBuffer, WindowEntry, WindowMode, WindowTrigger};
