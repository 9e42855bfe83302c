//! Input sampling and shared connection/application state
//!
//! Everything here that is written from another context (GPIO callbacks,
//! transport connect events, a selector switch) is a single-word atomic.

use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

use crate::hal::DigitalInputs;
use crate::types::{AppId, ConnectionHandle};

/// Number of input lines a snapshot can describe
pub const MAX_INPUT_LINES: usize = 16;

/// Debounced level of every input line, bit set = pressed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot(pub u16);

impl InputSnapshot {
    pub const EMPTY: InputSnapshot = InputSnapshot(0);

    pub const fn is_pressed(&self, line: usize) -> bool {
        line < MAX_INPUT_LINES && self.0 & (1 << line) != 0
    }

    /// Copy with one line changed; lines past the last one are ignored
    pub const fn with_line(self, line: usize, pressed: bool) -> Self {
        if line >= MAX_INPUT_LINES {
            return self;
        }
        if pressed {
            InputSnapshot(self.0 | (1 << line))
        } else {
            InputSnapshot(self.0 & !(1 << line))
        }
    }

    pub const fn is_idle(&self) -> bool {
        self.0 == 0
    }

    /// Pressed lines in ascending order
    pub fn pressed_lines(self) -> impl Iterator<Item = usize> {
        (0..MAX_INPUT_LINES).filter(move |&line| self.is_pressed(line))
    }
}

/// Atomic bank of input levels
/// Safe for use in interrupt contexts
#[derive(Debug)]
pub struct InputBank {
    levels: AtomicU16,
}

impl InputBank {
    pub const fn new() -> Self {
        Self {
            levels: AtomicU16::new(0),
        }
    }

    /// Store the debounced level of one line (called by the GPIO layer)
    pub fn set_level(&self, line: usize, pressed: bool) {
        if line >= MAX_INPUT_LINES {
            return;
        }
        let mask = 1u16 << line;
        if pressed {
            self.levels.fetch_or(mask, Ordering::Relaxed);
        } else {
            self.levels.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    /// Replace all levels at once
    pub fn store(&self, snapshot: InputSnapshot) {
        self.levels.store(snapshot.0, Ordering::Relaxed);
    }

    pub fn load(&self) -> InputSnapshot {
        InputSnapshot(self.levels.load(Ordering::Relaxed))
    }
}

impl Default for InputBank {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalInputs for &InputBank {
    fn snapshot(&mut self) -> InputSnapshot {
        self.load()
    }
}

/// Current HID transport session
///
/// The last handle is kept after a disconnect; sends against it are the
/// transport's problem.
#[derive(Debug)]
pub struct ConnectionTracker {
    handle: AtomicU16,
    connected: AtomicBool,
}

impl ConnectionTracker {
    pub const fn new() -> Self {
        Self {
            handle: AtomicU16::new(ConnectionHandle::NONE.0),
            connected: AtomicBool::new(false),
        }
    }

    /// Called from the transport's connect event
    pub fn connect(&self, handle: ConnectionHandle) {
        self.handle.store(handle.0, Ordering::Relaxed);
        self.connected.store(true, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!("HID host connected, handle {}", handle);
    }

    /// Called from the transport's disconnect event
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);

        #[cfg(feature = "defmt")]
        defmt::info!("HID host disconnected");
    }

    /// Handle to use for the next send, possibly stale
    pub fn current(&self) -> ConnectionHandle {
        ConnectionHandle(self.handle.load(Ordering::Relaxed))
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Currently selected application
#[derive(Debug)]
pub struct AppSelector {
    current: AtomicU8,
}

impl AppSelector {
    pub const fn new(initial: AppId) -> Self {
        Self {
            current: AtomicU8::new(initial.0),
        }
    }

    pub fn select(&self, app: AppId) {
        self.current.store(app.0, Ordering::Relaxed);
    }

    pub fn current(&self) -> AppId {
        AppId(self.current.load(Ordering::Relaxed))
    }
}

impl Default for AppSelector {
    fn default() -> Self {
        Self::new(AppId(0))
    }
}

/// Input line to command mapping for one application
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ButtonMap {
    commands: [Option<u8>; MAX_INPUT_LINES],
}

impl ButtonMap {
    /// Map of `(line, command)` pairs; later pairs override earlier ones
    pub const fn new(pairs: &[(usize, u8)]) -> Self {
        let mut commands = [None; MAX_INPUT_LINES];
        let mut i = 0;
        while i < pairs.len() {
            let (line, command) = pairs[i];
            assert!(line < MAX_INPUT_LINES, "input line out of range");
            commands[line] = Some(command);
            i += 1;
        }
        Self { commands }
    }

    /// Line `n` selects command `n` for the first `count` lines
    pub const fn sequential(count: usize) -> Self {
        assert!(count <= MAX_INPUT_LINES, "too many input lines");
        let mut commands = [None; MAX_INPUT_LINES];
        let mut line = 0;
        while line < count {
            commands[line] = Some(line as u8);
            line += 1;
        }
        Self { commands }
    }

    pub fn command(&self, line: usize) -> Option<u8> {
        self.commands.get(line).copied().flatten()
    }

    /// Lowest pressed line that has a mapping
    pub fn resolve(&self, snapshot: InputSnapshot) -> Option<Resolution> {
        snapshot.pressed_lines().find_map(|line| {
            self.command(line)
                .map(|command| Resolution { line, command })
        })
    }

    /// Mapped `(line, command)` pairs
    pub fn entries(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.commands
            .iter()
            .enumerate()
            .filter_map(|(line, command)| command.map(|command| (line, command)))
    }
}

/// Button maps keyed by application
pub type ButtonTable<'a> = &'a [(AppId, ButtonMap)];

/// A pressed line resolved to a command
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub line: usize,
    pub command: u8,
}

/// Polls the input collaborator and resolves the first mapped press
///
/// The resolved command is held until [`InputSampler::take`] so each cycle
/// starts clean.
#[derive(Debug, Default)]
pub struct InputSampler {
    resolved: Option<Resolution>,
}

impl InputSampler {
    pub const fn new() -> Self {
        Self { resolved: None }
    }

    /// Read one snapshot and try to resolve it against `map`
    pub fn sample<I: DigitalInputs>(&mut self, inputs: &mut I, map: &ButtonMap) -> bool {
        if self.resolved.is_some() {
            return true;
        }
        let snapshot = inputs.snapshot();
        self.resolved = map.resolve(snapshot);
        self.resolved.is_some()
    }

    pub fn pending(&self) -> Option<Resolution> {
        self.resolved
    }

    /// Hand over the resolution and clear the flag
    pub fn take(&mut self) -> Option<Resolution> {
        self.resolved.take()
    }
}
