//! Special actions: host-side routines a script can call into

use heapless::Vec;

use crate::error::ConfigError;
use crate::hal::{Delay, HidTransport};
use crate::keycodes::{KEY_CAPS_LOCK, LEFT_SHIFT_MASK};
use crate::port::HidPort;
use crate::script::REGISTRY_CAPACITY;
use crate::translate::TextMatrix;
use crate::types::{classify, ActionOutcome, AppId, CodeClass, ConnectionHandle, StepCode};

/// Bytes of translation buffer per typed string (two rows)
pub const TEXT_CAPACITY: usize = 64;

/// Keys a shortcut can hold at once, as in a boot keyboard report
pub const MAX_SHORTCUT_KEYS: usize = 6;

/// Everything an action gets to see about its invocation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActionContext<'a> {
    pub app: AppId,
    /// Index of the action within its application's table
    pub index: u8,
    /// Full code row of the invoking script, id slot included
    pub host_script: &'a [StepCode],
    /// Slot of the `SPECIAL` marker inside `host_script`
    pub cursor: usize,
    /// Transport handle current at invocation time
    pub connection: ConnectionHandle,
    pub arg1: &'a [u8],
    pub arg2: &'a [u8],
}

/// A routine invoked by a `SPECIAL` step
#[allow(async_fn_in_trait)]
pub trait SpecialAction {
    async fn invoke<T, D>(&self, ctx: &ActionContext<'_>, port: &mut HidPort<T, D>) -> ActionOutcome
    where
        T: HidTransport,
        D: Delay;
}

/// One action with its fixed arguments
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpecialSlot<A> {
    pub action: A,
    pub arg1: &'static [u8],
    pub arg2: &'static [u8],
}

impl<A> SpecialSlot<A> {
    pub const fn new(action: A, arg1: &'static [u8], arg2: &'static [u8]) -> Self {
        Self { action, arg1, arg2 }
    }
}

/// Special action slots keyed by application and index
#[derive(Debug)]
pub struct ActionTable<'a, A> {
    entries: Vec<(AppId, &'a [SpecialSlot<A>]), REGISTRY_CAPACITY>,
}

impl<'a, A> Default for ActionTable<'a, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A> ActionTable<'a, A> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Attach the slots of one application; index `n` is `slots[n]`
    pub fn register(&mut self, app: AppId, slots: &'a [SpecialSlot<A>]) -> Result<(), ConfigError> {
        if self.entries.iter().any(|(id, _)| *id == app) {
            return Err(ConfigError::DuplicateApplication(app));
        }
        self.entries
            .push((app, slots))
            .map_err(|_| ConfigError::RegistryExhausted)
    }

    pub fn slots(&self, app: AppId) -> &'a [SpecialSlot<A>] {
        self.entries
            .iter()
            .find(|(id, _)| *id == app)
            .map(|(_, slots)| *slots)
            .unwrap_or(&[])
    }

    pub fn get(&self, app: AppId, index: u8) -> Option<&'a SpecialSlot<A>> {
        self.slots(app).get(index as usize)
    }

    pub fn apps(&self) -> impl Iterator<Item = AppId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }
}

/// Actions shipped with the firmware
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinAction {
    /// Type `arg1` (meeting id) then `arg2` (passcode)
    TypeCredentials,
    /// Hold modifier mask `arg1[0]` and press the keys in `arg2` together
    Shortcut,
}

impl SpecialAction for BuiltinAction {
    async fn invoke<T, D>(&self, ctx: &ActionContext<'_>, port: &mut HidPort<T, D>) -> ActionOutcome
    where
        T: HidTransport,
        D: Delay,
    {
        match self {
            BuiltinAction::TypeCredentials => {
                if type_text(port, ctx.connection, ctx.arg1).await == ActionOutcome::Fail {
                    return ActionOutcome::Fail;
                }
                type_text(port, ctx.connection, ctx.arg2).await
            }
            BuiltinAction::Shortcut => {
                let modifiers = ctx.arg1.first().copied().unwrap_or(0);
                let keys = ctx.arg2;
                let valid = !keys.is_empty()
                    && keys.len() <= MAX_SHORTCUT_KEYS
                    && keys
                        .iter()
                        .all(|&key| matches!(classify(key as StepCode), CodeClass::Key(_)));
                if !valid {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("shortcut {} of app {} has an invalid key list", ctx.index, ctx.app);
                    return ActionOutcome::Fail;
                }
                port.chord(ctx.connection, modifiers, keys.iter().copied()).await;
                ActionOutcome::Ok
            }
        }
    }
}

/// Type printable text, holding left shift for upper-case letters.
///
/// Caps lock is released first so the shift state is predictable.
/// Characters without a scancode are skipped; text that does not fit
/// the translation buffer fails before anything is sent.
pub async fn type_text<T, D>(port: &mut HidPort<T, D>, conn: ConnectionHandle, text: &[u8]) -> ActionOutcome
where
    T: HidTransport,
    D: Delay,
{
    let matrix = match TextMatrix::<TEXT_CAPACITY>::new(text) {
        Ok(matrix) => matrix,
        Err(_reason) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("{=str} ({} bytes)", _reason, text.len());
            return ActionOutcome::Fail;
        }
    };

    port.send_key(conn, 0, KEY_CAPS_LOCK, false);

    for (_column, stroke) in matrix.translate().enumerate() {
        let Some(stroke) = stroke else {
            #[cfg(feature = "defmt")]
            defmt::warn!("skipping unsupported character at {}", _column);
            continue;
        };
        let modifiers = if stroke.shift { LEFT_SHIFT_MASK } else { 0 };
        port.send_key(conn, modifiers, stroke.code, true);
        port.pause(port.key_press_ms()).await;
        port.send_key(conn, modifiers, stroke.code, false);
    }
    ActionOutcome::Ok
}
