//! Error types for script validation, configuration and execution

use crate::types::{AppId, StepCode};

/// A malformed script row
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScriptError {
    /// Row has no executable slot
    Empty,
    /// Code falls outside every step range
    ReservedCode { slot: usize, code: StepCode },
    /// Combo or special step runs past the end of the row
    Truncated { slot: usize },
    /// Combo operand is not a plain key
    InvalidComboKey { slot: usize, code: StepCode },
    /// Special action index is not a byte
    InvalidSpecialIndex { slot: usize, code: StepCode },
}

/// Startup configuration errors
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Static application pool is full
    RegistryExhausted,
    /// Application id registered twice
    DuplicateApplication(AppId),
    /// More scripts than an application can hold
    TooManyScripts { app: AppId, count: usize },
    /// Script rows without executable slots
    ScriptTooShort { app: AppId },
    /// A script failed validation
    Malformed { app: AppId, script: usize, error: ScriptError },
    /// Script refers to a special action the table does not hold
    UnknownAction { app: AppId, script: usize, index: u8 },
    /// Button mapped to a script index that does not exist
    UnknownCommand { app: AppId, line: usize, command: u8 },
    /// Table entry for an application that is not registered
    UnknownApplication(AppId),
    /// Rejected timing parameters
    InvalidTiming(&'static str),
}

impl From<&'static str> for ConfigError {
    fn from(reason: &'static str) -> Self {
        ConfigError::InvalidTiming(reason)
    }
}

/// Errors from direct script execution
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    UnknownApplication(AppId),
    UnknownCommand { app: AppId, command: u8 },
}

#[cfg(feature = "std")]
impl core::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScriptError::Empty => write!(f, "script has no executable steps"),
            ScriptError::ReservedCode { slot, code } => {
                write!(f, "reserved step code {} at slot {}", code, slot)
            }
            ScriptError::Truncated { slot } => {
                write!(f, "step at slot {} runs past the end of the script", slot)
            }
            ScriptError::InvalidComboKey { slot, code } => {
                write!(f, "combo operand {} at slot {} is not a key", code, slot)
            }
            ScriptError::InvalidSpecialIndex { slot, code } => {
                write!(f, "special action index {} at slot {} is out of range", code, slot)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ScriptError {}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::RegistryExhausted => write!(f, "application registry exhausted"),
            ConfigError::DuplicateApplication(app) => {
                write!(f, "application {} registered twice", app.0)
            }
            ConfigError::TooManyScripts { app, count } => {
                write!(f, "application {} has too many scripts ({})", app.0, count)
            }
            ConfigError::ScriptTooShort { app } => {
                write!(f, "application {} scripts have no step slots", app.0)
            }
            ConfigError::Malformed { app, script, error } => {
                write!(f, "application {} script {}: {}", app.0, script, error)
            }
            ConfigError::UnknownAction { app, script, index } => write!(
                f,
                "application {} script {} uses missing special action {}",
                app.0, script, index
            ),
            ConfigError::UnknownCommand { app, line, command } => write!(
                f,
                "application {} line {} maps to missing command {}",
                app.0, line, command
            ),
            ConfigError::UnknownApplication(app) => {
                write!(f, "application {} is not registered", app.0)
            }
            ConfigError::InvalidTiming(reason) => write!(f, "invalid timing: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::UnknownApplication(app) => {
                write!(f, "application {} is not registered", app.0)
            }
            EngineError::UnknownCommand { app, command } => {
                write!(f, "application {} has no command {}", app.0, command)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}
