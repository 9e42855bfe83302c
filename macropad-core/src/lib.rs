#![cfg_attr(not(any(feature = "std", test)), no_std)]

//! # Macropad Core
//!
//! Macro script interpreter for BLE HID button pads.
//! Turns a button press into a timed sequence of keyboard and mouse reports,
//! with key combinations and pluggable special actions.

pub mod keycodes;
pub mod types;
pub mod error;
pub mod script;
pub mod translate;
pub mod hal;
pub mod port;
pub mod action;
pub mod input;
pub mod config;
pub mod engine;
pub mod profile;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use error::*;
pub use script::{AppHandle, AppRegistry, Application, Script, Steps, MAX_SCRIPTS, REGISTRY_CAPACITY};
pub use translate::{KeyStrokes, Stroke, TextMatrix};
pub use hal::*;
pub use port::HidPort;
pub use action::*;
pub use input::*;
pub use config::MacroConfig;
pub use engine::*;

/// Macropad library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Combo steps press at most this many keys
pub const MAX_COMBO_KEYS: usize = codes::COMBINE_MAX;

/// Default configuration: the built-in profile with standard timing
pub fn default_config() -> Result<MacroConfig<'static, BuiltinAction>, ConfigError> {
    profile::default_profile(TimingConfig::default())
}
