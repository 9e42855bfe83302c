//! HID keyboard usage IDs and report masks used by the built-in scripts

/// Keyboard usage page codes (HID Usage Tables, page 0x07)
pub const KEY_A: u8 = 0x04;
pub const KEY_V: u8 = 0x19;
pub const KEY_Z: u8 = 0x1D;
pub const KEY_1: u8 = 0x1E;
pub const KEY_9: u8 = 0x26;
pub const KEY_0: u8 = 0x27;
pub const KEY_ENTER: u8 = 0x28;
pub const KEY_ESCAPE: u8 = 0x29;
pub const KEY_BACKSPACE: u8 = 0x2A;
pub const KEY_TAB: u8 = 0x2B;
pub const KEY_SPACEBAR: u8 = 0x2C;
pub const KEY_CAPS_LOCK: u8 = 0x39;
pub const KEY_RIGHT_ARROW: u8 = 0x4F;
pub const KEY_LEFT_ARROW: u8 = 0x50;
pub const KEY_DOWN_ARROW: u8 = 0x51;
pub const KEY_UP_ARROW: u8 = 0x52;

pub const KEY_LEFT_CTRL: u8 = 0xE0;
pub const KEY_LEFT_SHIFT: u8 = 0xE1;
pub const KEY_LEFT_ALT: u8 = 0xE2;
pub const KEY_LEFT_GUI: u8 = 0xE3;
pub const KEY_RIGHT_CTRL: u8 = 0xE4;
pub const KEY_RIGHT_SHIFT: u8 = 0xE5;
pub const KEY_RIGHT_ALT: u8 = 0xE6;
/// Highest usage accepted as a plain key step
pub const KEY_RIGHT_GUI: u8 = 0xE7;

/// Modifier byte bits of a boot keyboard report
pub const LEFT_CTRL_MASK: u8 = 0x01;
pub const LEFT_SHIFT_MASK: u8 = 0x02;
pub const LEFT_ALT_MASK: u8 = 0x04;
pub const LEFT_GUI_MASK: u8 = 0x08;

/// Mouse report button bits
pub const MOUSE_BUTTON_LEFT: u8 = 0x01;
pub const MOUSE_BUTTON_RIGHT: u8 = 0x02;
