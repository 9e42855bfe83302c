//! Test utilities for the macro interpreter

use std::vec::Vec;

use crate::action::SpecialAction;
use crate::config::MacroConfig;
use crate::engine::MacroEngine;
use crate::hal::mock::{HidEvent, RecordingDelay, RecordingTransport, ScriptedInputs};
use crate::input::{AppSelector, ConnectionTracker};
use crate::types::{AppId, ConnectionHandle};

/// A recognised group of HID reports
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pulse {
    /// One key pressed then released
    Tap { modifiers: u8, key: u8 },
    /// Several keys pressed, then the same keys released in the same order
    Chord { modifiers: u8, keys: Vec<u8> },
    /// Buttons down then all buttons up
    Click { buttons: u8 },
    /// Anything that does not fit a pattern
    Raw(HidEvent),
}

/// Group recorded reports into pulses; delays are ignored
pub fn pulses(events: &[HidEvent]) -> Vec<Pulse> {
    let reports: Vec<HidEvent> = events
        .iter()
        .copied()
        .filter(|event| !matches!(event, HidEvent::Delay(_)))
        .collect();

    let mut out = Vec::new();
    let mut i = 0;
    while i < reports.len() {
        if let Some((pulse, used)) = match_click(&reports[i..]).or_else(|| match_keys(&reports[i..])) {
            out.push(pulse);
            i += used;
        } else {
            out.push(Pulse::Raw(reports[i]));
            i += 1;
        }
    }
    out
}

fn match_click(reports: &[HidEvent]) -> Option<(Pulse, usize)> {
    match reports {
        [HidEvent::Mouse { buttons, .. }, HidEvent::Mouse { buttons: 0, .. }, ..] if *buttons != 0 => {
            Some((Pulse::Click { buttons: *buttons }, 2))
        }
        _ => None,
    }
}

fn match_keys(reports: &[HidEvent]) -> Option<(Pulse, usize)> {
    let presses: Vec<(u8, u8)> = reports
        .iter()
        .map_while(|event| match *event {
            HidEvent::Key { modifiers, key, pressed: true, .. } => Some((modifiers, key)),
            _ => None,
        })
        .collect();
    if presses.is_empty() {
        return None;
    }

    let releases: Vec<(u8, u8)> = reports[presses.len()..]
        .iter()
        .take(presses.len())
        .map_while(|event| match *event {
            HidEvent::Key { modifiers, key, pressed: false, .. } => Some((modifiers, key)),
            _ => None,
        })
        .collect();
    if releases != presses {
        return None;
    }

    let modifiers = presses[0].0;
    if presses.iter().any(|(m, _)| *m != modifiers) {
        return None;
    }

    let pulse = if presses.len() == 1 {
        Pulse::Tap {
            modifiers,
            key: presses[0].1,
        }
    } else {
        Pulse::Chord {
            modifiers,
            keys: presses.iter().map(|(_, key)| *key).collect(),
        }
    };
    Some((pulse, presses.len() * 2))
}

/// Reports paired with the simulated time they were sent at
pub fn timeline(events: &[HidEvent]) -> Vec<(u64, HidEvent)> {
    let mut now = 0u64;
    let mut out = Vec::new();
    for event in events {
        match event {
            HidEvent::Delay(ms) => now += *ms as u64,
            report => out.push((now, *report)),
        }
    }
    out
}

/// Recording collaborators sharing one event log
pub struct Harness {
    pub transport: RecordingTransport,
    pub delay: RecordingDelay,
    pub inputs: ScriptedInputs,
    pub connection: ConnectionTracker,
    pub selector: AppSelector,
}

impl Harness {
    /// Connected with `ConnectionHandle(1)`, application 0 selected
    pub fn new() -> Self {
        let transport = RecordingTransport::new();
        let delay = RecordingDelay::with_log(transport.log());
        let connection = ConnectionTracker::new();
        connection.connect(ConnectionHandle(1));
        Self {
            transport,
            delay,
            inputs: ScriptedInputs::new(),
            connection,
            selector: AppSelector::new(AppId(0)),
        }
    }

    pub fn engine<'c, A: SpecialAction>(
        &'c self,
        config: &'c MacroConfig<'c, A>,
    ) -> MacroEngine<'c, A, RecordingTransport, ScriptedInputs, RecordingDelay> {
        MacroEngine::new(
            config,
            self.transport.clone(),
            self.inputs.clone(),
            self.delay.clone(),
            &self.connection,
            &self.selector,
        )
    }

    /// Everything recorded so far, delays included
    pub fn log(&self) -> Vec<HidEvent> {
        self.transport.log().borrow().clone()
    }

    pub fn pulses(&self) -> Vec<Pulse> {
        pulses(&self.log())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
