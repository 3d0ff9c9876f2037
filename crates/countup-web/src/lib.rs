#![forbid(unsafe_code)]

//! WASM frontend for scroll-triggered count-up counters.
//!
//! [`start`] discovers every counter element once the document has parsed,
//! watches each one with a single `IntersectionObserver`, and runs an
//! independent `requestAnimationFrame` loop per counter the first time it is
//! at least half visible. The returned [`CounterPage`] handle owns the
//! observer; dropping it (or calling `disconnect`) stops watching.
//!
//! All browser-independent bookkeeping lives in `page_core`, which is also
//! compiled for native tests.

pub mod error;

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{CounterPage, start, start_with_options};

// Page core is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod page_core;
