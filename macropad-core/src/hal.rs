//! Hardware Abstraction Layer for the macro interpreter
//!
//! The interpreter only needs three collaborators: a HID report transport,
//! a snapshot of the debounced input lines and a cooperative millisecond delay.

use embedded_hal::digital::InputPin;

use crate::input::InputSnapshot;
use crate::types::ConnectionHandle;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// No HID host connected
    NotConnected,
    /// Report could not be queued
    TransportError,
    /// Input line could not be read
    InputError,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::NotConnected => write!(f, "No HID host connected"),
            HalError::TransportError => write!(f, "HID report transmission failed"),
            HalError::InputError => write!(f, "Input line read failed"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Trait for sending HID reports to the connected host
///
/// Sends are best effort: the interpreter never changes its control flow
/// based on the result.
pub trait HidTransport {
    type Error: From<HalError>;

    /// Send one keyboard report. `pressed == false` sends the release report.
    fn send_key(
        &mut self,
        conn: ConnectionHandle,
        modifiers: u8,
        key: u8,
        pressed: bool,
    ) -> Result<(), Self::Error>;

    /// Send one mouse report
    fn send_mouse(
        &mut self,
        conn: ConnectionHandle,
        buttons: u8,
        dx: i8,
        dy: i8,
    ) -> Result<(), Self::Error>;
}

/// Trait for reading the debounced input lines
pub trait DigitalInputs {
    /// Latest level of every configured line, bit set = pressed
    fn snapshot(&mut self) -> InputSnapshot;
}

/// Cooperative millisecond delay
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn delay_ms(&mut self, ms: u32);
}

/// Delay backed by the embassy timer queue
#[cfg(feature = "embassy-time")]
#[derive(Copy, Clone, Debug, Default)]
pub struct EmbassyDelay;

#[cfg(feature = "embassy-time")]
impl Delay for EmbassyDelay {
    async fn delay_ms(&mut self, ms: u32) {
        embassy_time::Timer::after_millis(ms as u64).await;
    }
}

/// Input lines read straight from embedded-hal compatible pins
pub struct EmbeddedHalInputs<P, const N: usize> {
    pins: [P; N],
    active_low: bool,
}

impl<P, const N: usize> EmbeddedHalInputs<P, N>
where
    P: InputPin,
{
    /// Pins are assumed pulled up, grounded when pressed
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: true,
        }
    }

    pub fn with_polarity(pins: [P; N], active_low: bool) -> Self {
        Self { pins, active_low }
    }

    /// Read one line; read errors count as released
    pub fn is_pressed(&mut self, line: usize) -> Result<bool, HalError> {
        let pin = self.pins.get_mut(line).ok_or(HalError::InvalidConfig)?;
        let low = pin.is_low().map_err(|_| HalError::InputError)?;
        Ok(low == self.active_low)
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P, const N: usize> DigitalInputs for EmbeddedHalInputs<P, N>
where
    P: InputPin,
{
    fn snapshot(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::EMPTY;
        for line in 0..N {
            if self.is_pressed(line).unwrap_or(false) {
                snapshot = snapshot.with_line(line, true);
            }
        }
        snapshot
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Everything a mock collaborator observed, in order
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum HidEvent {
        Key {
            conn: ConnectionHandle,
            modifiers: u8,
            key: u8,
            pressed: bool,
        },
        Mouse {
            conn: ConnectionHandle,
            buttons: u8,
            dx: i8,
            dy: i8,
        },
        Delay(u32),
    }

    pub type EventLog = Rc<RefCell<Vec<HidEvent>>>;

    /// Transport that records every report
    ///
    /// Clones share the same log, so a test can keep a handle while the
    /// engine owns the transport.
    #[derive(Clone, Default)]
    pub struct RecordingTransport {
        log: EventLog,
        fail: Rc<RefCell<bool>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Share an event log with a [`RecordingDelay`]
        pub fn with_log(log: EventLog) -> Self {
            Self {
                log,
                fail: Rc::default(),
            }
        }

        pub fn log(&self) -> EventLog {
            self.log.clone()
        }

        /// Recorded reports, delays filtered out
        pub fn events(&self) -> Vec<HidEvent> {
            self.log
                .borrow()
                .iter()
                .copied()
                .filter(|event| !matches!(event, HidEvent::Delay(_)))
                .collect()
        }

        /// Reports are still recorded but every send returns an error
        pub fn set_failing(&self, fail: bool) {
            *self.fail.borrow_mut() = fail;
        }

        pub fn clear(&self) {
            self.log.borrow_mut().clear();
        }

        fn record(&self, event: HidEvent) -> Result<(), HalError> {
            self.log.borrow_mut().push(event);
            if *self.fail.borrow() {
                Err(HalError::NotConnected)
            } else {
                Ok(())
            }
        }
    }

    impl HidTransport for RecordingTransport {
        type Error = HalError;

        fn send_key(
            &mut self,
            conn: ConnectionHandle,
            modifiers: u8,
            key: u8,
            pressed: bool,
        ) -> Result<(), Self::Error> {
            self.record(HidEvent::Key {
                conn,
                modifiers,
                key,
                pressed,
            })
        }

        fn send_mouse(
            &mut self,
            conn: ConnectionHandle,
            buttons: u8,
            dx: i8,
            dy: i8,
        ) -> Result<(), Self::Error> {
            self.record(HidEvent::Mouse {
                conn,
                buttons,
                dx,
                dy,
            })
        }
    }

    /// Delay that returns immediately and records the requested time
    #[derive(Clone, Default)]
    pub struct RecordingDelay {
        log: EventLog,
        elapsed: Rc<RefCell<u64>>,
    }

    impl RecordingDelay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_log(log: EventLog) -> Self {
            Self {
                log,
                ..Self::default()
            }
        }

        /// Total simulated time
        pub fn elapsed_ms(&self) -> u64 {
            *self.elapsed.borrow()
        }

        /// Recorded delays in order
        pub fn delays(&self) -> Vec<u32> {
            self.log
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    HidEvent::Delay(ms) => Some(*ms),
                    _ => None,
                })
                .collect()
        }
    }

    impl Delay for RecordingDelay {
        async fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(HidEvent::Delay(ms));
            *self.elapsed.borrow_mut() += ms as u64;
        }
    }

    /// Inputs that replay a queue of snapshots, then hold the last one
    #[derive(Clone, Default)]
    pub struct ScriptedInputs {
        queue: Rc<RefCell<VecDeque<InputSnapshot>>>,
        current: Rc<RefCell<InputSnapshot>>,
        reads: Rc<RefCell<usize>>,
    }

    impl ScriptedInputs {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue one snapshot per future read
        pub fn push(&self, snapshot: InputSnapshot) {
            self.queue.borrow_mut().push_back(snapshot);
        }

        /// Queue `polls` idle reads followed by `line` held down
        pub fn press_after(&self, polls: usize, line: usize) {
            for _ in 0..polls {
                self.push(InputSnapshot::EMPTY);
            }
            self.push(InputSnapshot::EMPTY.with_line(line, true));
        }

        pub fn reads(&self) -> usize {
            *self.reads.borrow()
        }
    }

    impl DigitalInputs for ScriptedInputs {
        fn snapshot(&mut self) -> InputSnapshot {
            *self.reads.borrow_mut() += 1;
            if let Some(next) = self.queue.borrow_mut().pop_front() {
                *self.current.borrow_mut() = next;
            }
            *self.current.borrow()
        }
    }
}
