//! Script rows, step decoding and the fixed-capacity application registry

use heapless::Vec;

use crate::error::{ConfigError, ScriptError};
use crate::types::{classify, codes, AppId, CodeClass, Combo, Step, StepCode};

/// Default number of applications the registry can hold
pub const REGISTRY_CAPACITY: usize = 10;

/// Scripts per application
pub const MAX_SCRIPTS: usize = 8;

/// Build a script row at compile time: `id` in slot 0, `steps` after it,
/// the remainder padded with `NONE`
pub const fn script_row<const N: usize>(id: StepCode, steps: &[StepCode]) -> [StepCode; N] {
    assert!(steps.len() < N, "script does not fit its step budget");

    let mut row = [codes::NONE; N];
    row[0] = id;
    let mut i = 0;
    while i < steps.len() {
        row[i + 1] = steps[i];
        i += 1;
    }
    row
}

/// Check that a script row decodes cleanly up to its first terminator
pub const fn check_codes(row: &[StepCode]) -> Result<(), ScriptError> {
    if row.len() < 2 {
        return Err(ScriptError::Empty);
    }

    let mut cursor = 1;
    while cursor < row.len() {
        match classify(row[cursor]) {
            CodeClass::End => return Ok(()),
            CodeClass::Key(_) | CodeClass::Click(_) => cursor += 1,
            CodeClass::Special => {
                if cursor + 1 >= row.len() {
                    return Err(ScriptError::Truncated { slot: cursor });
                }
                let index = row[cursor + 1];
                if index < 0 || index > u8::MAX as StepCode {
                    return Err(ScriptError::InvalidSpecialIndex {
                        slot: cursor + 1,
                        code: index,
                    });
                }
                cursor += 2;
            }
            CodeClass::Combine(n) => {
                let n = n as usize;
                if cursor + n >= row.len() {
                    return Err(ScriptError::Truncated { slot: cursor });
                }
                let mut k = 1;
                while k <= n {
                    if !matches!(classify(row[cursor + k]), CodeClass::Key(_)) {
                        return Err(ScriptError::InvalidComboKey {
                            slot: cursor + k,
                            code: row[cursor + k],
                        });
                    }
                    k += 1;
                }
                cursor += n + 1;
            }
            CodeClass::Reserved => {
                return Err(ScriptError::ReservedCode {
                    slot: cursor,
                    code: row[cursor],
                })
            }
        }
    }
    Ok(())
}

/// Compile-time check over a whole script table
pub const fn table_is_valid<const N: usize>(table: &[[StepCode; N]]) -> bool {
    let mut i = 0;
    while i < table.len() {
        if check_codes(&table[i]).is_err() {
            return false;
        }
        i += 1;
    }
    true
}

/// One script: slot 0 is the script id, slots `1..=max_steps` are steps
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Script<'a> {
    codes: &'a [StepCode],
}

impl<'a> Script<'a> {
    pub fn new(codes: &'a [StepCode]) -> Self {
        Self { codes }
    }

    /// Script id stored in slot 0
    pub fn id(&self) -> StepCode {
        self.codes.first().copied().unwrap_or(codes::NONE)
    }

    /// Full code row, id slot included
    pub fn codes(&self) -> &'a [StepCode] {
        self.codes
    }

    /// Last executable slot
    pub fn max_steps(&self) -> usize {
        self.codes.len().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        check_codes(self.codes)
    }

    /// Decode the executable steps in order
    pub fn steps(&self) -> Steps<'a> {
        Steps {
            codes: self.codes,
            cursor: 1,
            finished: false,
        }
    }

    /// Special action indices referenced by this script
    pub fn special_indices(&self) -> impl Iterator<Item = u8> + 'a {
        self.steps().filter_map(|item| match item {
            Ok((_, Step::Special(index))) => Some(index),
            _ => None,
        })
    }
}

/// Step decoder over a script row
///
/// Yields `(slot, step)` pairs. Stops after `Step::End`, after the last slot,
/// or after the first decoding error.
#[derive(Clone, Debug)]
pub struct Steps<'a> {
    codes: &'a [StepCode],
    cursor: usize,
    finished: bool,
}

impl<'a> Steps<'a> {
    fn decode(&self) -> Result<Step<'a>, ScriptError> {
        let slot = self.cursor;
        let code = self.codes[slot];
        match classify(code) {
            CodeClass::End => Ok(Step::End),
            CodeClass::Key(key) => Ok(Step::Key(key)),
            CodeClass::Click(button) => Ok(Step::Click(button)),
            CodeClass::Special => {
                let index = *self
                    .codes
                    .get(slot + 1)
                    .ok_or(ScriptError::Truncated { slot })?;
                u8::try_from(index)
                    .map(Step::Special)
                    .map_err(|_| ScriptError::InvalidSpecialIndex {
                        slot: slot + 1,
                        code: index,
                    })
            }
            CodeClass::Combine(n) => {
                let keys = self
                    .codes
                    .get(slot + 1..=slot + n as usize)
                    .ok_or(ScriptError::Truncated { slot })?;
                for (offset, &key) in keys.iter().enumerate() {
                    if !matches!(classify(key), CodeClass::Key(_)) {
                        return Err(ScriptError::InvalidComboKey {
                            slot: slot + 1 + offset,
                            code: key,
                        });
                    }
                }
                Ok(Step::Combo(Combo::new(keys)))
            }
            CodeClass::Reserved => Err(ScriptError::ReservedCode { slot, code }),
        }
    }
}

impl<'a> Iterator for Steps<'a> {
    type Item = Result<(usize, Step<'a>), ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor >= self.codes.len() {
            self.finished = true;
            return None;
        }

        let slot = self.cursor;
        match self.decode() {
            Ok(step) => {
                if step == Step::End {
                    self.finished = true;
                }
                self.cursor += step.width();
                Some(Ok((slot, step)))
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// A registered application and its scripts
#[derive(Clone, Debug)]
pub struct Application<'a> {
    id: AppId,
    name: &'static str,
    max_steps: usize,
    scripts: Vec<Script<'a>, MAX_SCRIPTS>,
}

impl<'a> Application<'a> {
    pub fn id(&self) -> AppId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Step budget shared by all scripts of this application
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Script selected by a command index
    pub fn script(&self, command: u8) -> Option<&Script<'a>> {
        self.scripts.get(command as usize)
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Script<'a>> {
        self.scripts.iter()
    }
}

/// Handle returned by [`AppRegistry::setup`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppHandle(usize);

/// Fixed-capacity pool of applications
#[derive(Clone, Debug)]
pub struct AppRegistry<'a, const CAP: usize = REGISTRY_CAPACITY> {
    apps: Vec<Application<'a>, CAP>,
}

impl<'a, const CAP: usize> Default for AppRegistry<'a, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const CAP: usize> AppRegistry<'a, CAP> {
    pub const fn new() -> Self {
        Self { apps: Vec::new() }
    }

    /// Register an application from a table of `STEPS`-wide script rows.
    ///
    /// Every row is validated before anything is stored; a full pool yields
    /// [`ConfigError::RegistryExhausted`].
    pub fn setup<const STEPS: usize>(
        &mut self,
        id: AppId,
        name: &'static str,
        rows: &'a [[StepCode; STEPS]],
    ) -> Result<AppHandle, ConfigError> {
        if self.apps.is_full() {
            return Err(ConfigError::RegistryExhausted);
        }
        if self.find(id).is_some() {
            return Err(ConfigError::DuplicateApplication(id));
        }
        if STEPS < 2 {
            return Err(ConfigError::ScriptTooShort { app: id });
        }
        if rows.len() > MAX_SCRIPTS {
            return Err(ConfigError::TooManyScripts {
                app: id,
                count: rows.len(),
            });
        }

        let mut scripts = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let script = Script::new(row);
            script.validate().map_err(|error| ConfigError::Malformed {
                app: id,
                script: index,
                error,
            })?;
            scripts.push(script).map_err(|_| ConfigError::TooManyScripts {
                app: id,
                count: rows.len(),
            })?;
        }

        self.apps
            .push(Application {
                id,
                name,
                max_steps: STEPS - 1,
                scripts,
            })
            .map_err(|_| ConfigError::RegistryExhausted)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("registered application {} ({=str}), {} scripts", id, name, rows.len());

        Ok(AppHandle(self.apps.len() - 1))
    }

    pub fn get(&self, handle: AppHandle) -> Option<&Application<'a>> {
        self.apps.get(handle.0)
    }

    pub fn find(&self, id: AppId) -> Option<&Application<'a>> {
        self.apps.iter().find(|app| app.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Application<'a>> {
        self.apps.iter()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
