#![cfg_attr(not(feature = "std"), no_std)]

//! # Keyer Core
//!
//! Iambic paddle keyer logic for embedded and host targets: squeeze
//! resolution, a FIFO element queue, and letter decoding from timing gaps.

pub mod types;
pub mod morse;
pub mod sequencer;
pub mod keyer;
pub mod hal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use sequencer::*;
pub use keyer::*;
pub use hal::{*, Instant, Duration};

/// Keyer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
