//! Core data types for the macro interpreter

use crate::keycodes::{KEY_RIGHT_GUI, MOUSE_BUTTON_LEFT, MOUSE_BUTTON_RIGHT};

/// One raw instruction unit of a script row
pub type StepCode = i32;

/// Reserved step code values
///
/// The code space is partitioned so that no two step kinds overlap:
///
/// | codes       | meaning                          |
/// |-------------|----------------------------------|
/// | 0           | end of script                    |
/// | 1..=231     | single key (HID usage)           |
/// | 232         | special action, index follows    |
/// | 242..=249   | combine the next 2..=9 keys      |
/// | 251..=255   | mouse click (253 = left)         |
///
/// Everything else is reserved and rejected when a script is registered.
pub mod codes {
    use super::StepCode;

    pub const NONE: StepCode = 0;
    pub const KEY_MIN: StepCode = 1;
    pub const KEY_MAX: StepCode = super::KEY_RIGHT_GUI as StepCode;
    pub const SPECIAL: StepCode = 232;
    pub const COMBINE_BASE: StepCode = 240;
    pub const COMBINE_MIN: usize = 2;
    pub const COMBINE_MAX: usize = 9;
    pub const CLICK_THRESHOLD: StepCode = 250;
    pub const CLICK_MAX: StepCode = 255;
    pub const MOUSE_LEFT: StepCode = 253;
    pub const MOUSE_RIGHT: StepCode = 254;

    /// Marker for "press the next `n` keys together"; `NONE` when `n` is out of range
    pub const fn combine(n: usize) -> StepCode {
        if n < COMBINE_MIN || n > COMBINE_MAX {
            NONE
        } else {
            COMBINE_BASE + n as StepCode
        }
    }

    const _: () = {
        assert!(NONE < KEY_MIN);
        assert!(KEY_MAX < SPECIAL);
        assert!(SPECIAL < COMBINE_BASE + COMBINE_MIN as StepCode);
        assert!(COMBINE_BASE + (COMBINE_MAX as StepCode) < CLICK_THRESHOLD);
        assert!(MOUSE_LEFT > CLICK_THRESHOLD && MOUSE_LEFT <= CLICK_MAX);
        assert!(MOUSE_RIGHT > CLICK_THRESHOLD && MOUSE_RIGHT <= CLICK_MAX);
    };
}

/// Mouse button pulsed by a click step
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// Button bit inside a mouse report
    pub const fn mask(&self) -> u8 {
        match self {
            MouseButton::Left => MOUSE_BUTTON_LEFT,
            MouseButton::Right => MOUSE_BUTTON_RIGHT,
        }
    }
}

/// Kind of a single step code, without looking at its operands
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodeClass {
    End,
    Key(u8),
    Special,
    Combine(u8),
    Click(MouseButton),
    Reserved,
}

/// Classify a raw step code
pub const fn classify(code: StepCode) -> CodeClass {
    match code {
        codes::NONE => CodeClass::End,
        codes::SPECIAL => CodeClass::Special,
        c if c >= codes::KEY_MIN && c <= codes::KEY_MAX => CodeClass::Key(c as u8),
        c if c >= codes::COMBINE_BASE + codes::COMBINE_MIN as StepCode
            && c <= codes::COMBINE_BASE + codes::COMBINE_MAX as StepCode =>
        {
            CodeClass::Combine((c - codes::COMBINE_BASE) as u8)
        }
        c if c > codes::CLICK_THRESHOLD && c <= codes::CLICK_MAX => {
            if c == codes::MOUSE_LEFT {
                CodeClass::Click(MouseButton::Left)
            } else {
                CodeClass::Click(MouseButton::Right)
            }
        }
        _ => CodeClass::Reserved,
    }
}

/// Keys pressed together by a combo step
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Combo<'a> {
    codes: &'a [StepCode],
}

impl<'a> Combo<'a> {
    pub(crate) fn new(codes: &'a [StepCode]) -> Self {
        Self { codes }
    }

    /// Number of keys in the combination
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Key usages in press order
    pub fn keys(&self) -> impl Iterator<Item = u8> + Clone + 'a {
        self.codes.iter().map(|&code| code as u8)
    }
}

/// A decoded script step
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Step<'a> {
    /// Terminates the script
    End,
    /// Press then release one key
    Key(u8),
    /// Press all keys, then release all keys
    Combo(Combo<'a>),
    /// Button down / button up pulse
    Click(MouseButton),
    /// Invoke the special action with this index
    Special(u8),
}

impl Step<'_> {
    /// Number of code slots this step occupies
    pub fn width(&self) -> usize {
        match self {
            Step::End | Step::Key(_) | Step::Click(_) => 1,
            Step::Special(_) => 2,
            Step::Combo(combo) => combo.len() + 1,
        }
    }
}

/// Outcome reported by a special action
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ActionOutcome {
    /// Continue with the next step
    #[default]
    Ok = 0,
    /// Stop the script
    Fail = 1,
    /// Skip the step following the special action
    SkipNext = 2,
    /// Stop the script, normal completion
    EndScript = 3,
}

/// Application identity
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppId(pub u8);

/// Opaque identifier of the active HID transport session
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionHandle(pub u16);

impl ConnectionHandle {
    /// Handle used before the first connection
    pub const NONE: ConnectionHandle = ConnectionHandle(0);
}

/// Interpreter states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Polling the input lines
    AwaitInput,
    /// Reading the step at the cursor
    ExecutingStep,
    /// Running a special action
    StepSpecial,
    /// Pressing and releasing a key combination
    StepCombo,
    /// Pressing and releasing one key
    StepSingleKey,
    /// Sending a click pulse
    StepClick,
    /// Script finished, settling before the next poll
    Done,
}

/// Interpreter timing parameters, all in milliseconds
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Hold time between key press and release
    pub key_press_ms: u32,
    /// Hold time of a mouse click
    pub click_press_ms: u32,
    /// Pause after each executed step
    pub step_gap_ms: u32,
    /// Pause after a script finished
    pub settle_ms: u32,
    /// Input polling period
    pub poll_interval_ms: u32,
    /// Upper bound for a special action
    pub action_timeout_ms: u32,
    /// Delay before the first poll after boot
    pub startup_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            key_press_ms: 100,
            click_press_ms: 50,
            step_gap_ms: 500,
            settle_ms: 500,
            poll_interval_ms: 10,
            action_timeout_ms: 30_000,
            startup_ms: 1_000,
        }
    }
}

impl TimingConfig {
    /// Create a new timing configuration with validation
    pub fn new(
        key_press_ms: u32,
        click_press_ms: u32,
        step_gap_ms: u32,
        settle_ms: u32,
        poll_interval_ms: u32,
        action_timeout_ms: u32,
    ) -> Result<Self, &'static str> {
        if key_press_ms == 0 || key_press_ms > 1_000 {
            return Err("Key press time must be between 1 and 1000ms");
        }
        if click_press_ms == 0 || click_press_ms > 1_000 {
            return Err("Click time must be between 1 and 1000ms");
        }
        if step_gap_ms > 5_000 || settle_ms > 5_000 {
            return Err("Step gap and settle time must be <= 5000ms");
        }
        if poll_interval_ms == 0 || poll_interval_ms > 1_000 {
            return Err("Poll interval must be between 1 and 1000ms");
        }
        if action_timeout_ms < 2 * key_press_ms {
            return Err("Special action timeout must cover one key press and release");
        }

        Ok(Self {
            key_press_ms,
            click_press_ms,
            step_gap_ms,
            settle_ms,
            poll_interval_ms,
            action_timeout_ms,
            ..Self::default()
        })
    }

    /// Same timing with a different boot delay
    pub fn with_startup(self, startup_ms: u32) -> Self {
        Self { startup_ms, ..self }
    }
}
