//! Platform abstraction layer
//!
//! Handles browser/native differences for time. Storage lives in
//! [`crate::persistence`]; input and focus handling live in the binary.

pub mod time;

pub use time::{Clock, SteppedClock};

#[cfg(not(target_arch = "wasm32"))]
pub use time::SystemClock;

#[cfg(target_arch = "wasm32")]
pub use time::BrowserClock;
