//! Iambic keyer for a Linux host: sysfs GPIO paddles and light, optional
//! sound card sidetone, decoded letters on the console.

pub mod console;
pub mod gpio;
pub mod hardware;
pub mod settings;
pub mod tone;

#[cfg(feature = "sidetone")]
pub mod sidetone;

pub use console::ConsoleOperator;
pub use hardware::{AppHal, StdDelay};
pub use settings::Settings;
