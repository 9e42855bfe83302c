//! Built-in application profile: Zoom and Skype on mobile and PC

use crate::action::{ActionTable, BuiltinAction, SpecialSlot};
use crate::config::MacroConfig;
use crate::error::ConfigError;
use crate::input::ButtonMap;
use crate::keycodes::*;
use crate::script::{script_row, table_is_valid, AppRegistry};
use crate::types::{codes, AppId, StepCode, TimingConfig};

pub const ZOOM_MOBILE: AppId = AppId(0);
pub const ZOOM_PC: AppId = AppId(1);
pub const SKYPE_MOBILE: AppId = AppId(2);
pub const SKYPE_PC: AppId = AppId(3);

/// Step budget of every built-in script
pub const MAX_STEPS: usize = 10;
/// Row width: id slot plus steps
pub const ROW: usize = MAX_STEPS + 1;
/// Scripts per built-in application
pub const SCRIPTS: usize = 5;
/// Buttons on the pad
pub const BUTTONS: usize = 5;

/// Script ids, shared by all applications
pub mod scripts {
    use crate::types::StepCode;

    pub const TOGGLE_MIC: StepCode = 0;
    pub const TOGGLE_VIDEO: StepCode = 1;
    /// Join meeting on mobile, improve video on PC
    pub const JOIN_MEETING: StepCode = 2;
    pub const IMPROVE_VIDEO: StepCode = 2;
    pub const OPEN_APP: StepCode = 3;
    pub const STILL_DECIDING: StepCode = 4;
}

/// Special action indices
pub const TYPE_MEETING: u8 = 0;
pub const VIDEO_SHORTCUT: u8 = 0;

/// Demo meeting credentials
pub const MEETING_ID: &[u8] = b"12345670";
pub const MEETING_PASSCODE: &[u8] = b"coMeValavita";

const fn key(usage: u8) -> StepCode {
    usage as StepCode
}

const fn empty(id: StepCode) -> [StepCode; ROW] {
    script_row(id, &[])
}

const ZOOM_MOBILE_TABLE: [[StepCode; ROW]; SCRIPTS] = [
    script_row(
        scripts::TOGGLE_MIC,
        &[
            codes::MOUSE_LEFT,
            key(KEY_DOWN_ARROW),
            key(KEY_SPACEBAR),
            key(KEY_ESCAPE),
        ],
    ),
    script_row(
        scripts::TOGGLE_VIDEO,
        &[
            codes::MOUSE_LEFT,
            key(KEY_DOWN_ARROW),
            key(KEY_RIGHT_ARROW),
            key(KEY_SPACEBAR),
            key(KEY_ESCAPE),
        ],
    ),
    script_row(
        scripts::JOIN_MEETING,
        &[codes::SPECIAL, TYPE_MEETING as StepCode],
    ),
    empty(scripts::OPEN_APP),
    empty(scripts::STILL_DECIDING),
];

const ZOOM_PC_TABLE: [[StepCode; ROW]; SCRIPTS] = [
    script_row(
        scripts::TOGGLE_MIC,
        &[codes::combine(2), key(KEY_LEFT_ALT), key(KEY_A)],
    ),
    script_row(
        scripts::TOGGLE_VIDEO,
        &[codes::SPECIAL, VIDEO_SHORTCUT as StepCode],
    ),
    empty(scripts::IMPROVE_VIDEO),
    empty(scripts::OPEN_APP),
    empty(scripts::STILL_DECIDING),
];

// Skype scripts are not recorded yet
const SKYPE_TABLE: [[StepCode; ROW]; SCRIPTS] = [
    empty(scripts::TOGGLE_MIC),
    empty(scripts::TOGGLE_VIDEO),
    empty(scripts::IMPROVE_VIDEO),
    empty(scripts::OPEN_APP),
    empty(scripts::STILL_DECIDING),
];

const _: () = {
    assert!(table_is_valid(&ZOOM_MOBILE_TABLE));
    assert!(table_is_valid(&ZOOM_PC_TABLE));
    assert!(table_is_valid(&SKYPE_TABLE));
};

pub static ZOOM_MOBILE_SCRIPTS: [[StepCode; ROW]; SCRIPTS] = ZOOM_MOBILE_TABLE;
pub static ZOOM_PC_SCRIPTS: [[StepCode; ROW]; SCRIPTS] = ZOOM_PC_TABLE;
pub static SKYPE_MOBILE_SCRIPTS: [[StepCode; ROW]; SCRIPTS] = SKYPE_TABLE;
pub static SKYPE_PC_SCRIPTS: [[StepCode; ROW]; SCRIPTS] = SKYPE_TABLE;

pub static ZOOM_MOBILE_ACTIONS: [SpecialSlot<BuiltinAction>; 1] = [SpecialSlot::new(
    BuiltinAction::TypeCredentials,
    MEETING_ID,
    MEETING_PASSCODE,
)];

pub static ZOOM_PC_ACTIONS: [SpecialSlot<BuiltinAction>; 1] = [SpecialSlot::new(
    BuiltinAction::Shortcut,
    &[LEFT_ALT_MASK],
    &[KEY_V],
)];

/// Button `n` runs script `n` in every application
pub static BUTTON_TABLE: [(AppId, ButtonMap); 4] = [
    (ZOOM_MOBILE, ButtonMap::sequential(BUTTONS)),
    (ZOOM_PC, ButtonMap::sequential(BUTTONS)),
    (SKYPE_MOBILE, ButtonMap::sequential(BUTTONS)),
    (SKYPE_PC, ButtonMap::sequential(BUTTONS)),
];

/// Register the four built-in applications
pub fn registry() -> Result<AppRegistry<'static>, ConfigError> {
    let mut registry = AppRegistry::new();
    registry.setup(ZOOM_MOBILE, "Zoom mobile", &ZOOM_MOBILE_SCRIPTS)?;
    registry.setup(ZOOM_PC, "Zoom PC", &ZOOM_PC_SCRIPTS)?;
    registry.setup(SKYPE_MOBILE, "Skype mobile", &SKYPE_MOBILE_SCRIPTS)?;
    registry.setup(SKYPE_PC, "Skype PC", &SKYPE_PC_SCRIPTS)?;
    Ok(registry)
}

/// Special actions of the built-in applications
pub fn builtin_actions() -> Result<ActionTable<'static, BuiltinAction>, ConfigError> {
    let mut actions = ActionTable::new();
    actions.register(ZOOM_MOBILE, &ZOOM_MOBILE_ACTIONS)?;
    actions.register(ZOOM_PC, &ZOOM_PC_ACTIONS)?;
    Ok(actions)
}

/// The shipped configuration
pub fn default_profile(timing: TimingConfig) -> Result<MacroConfig<'static, BuiltinAction>, ConfigError> {
    MacroConfig::new(registry()?, builtin_actions()?, &BUTTON_TABLE, timing)
}
