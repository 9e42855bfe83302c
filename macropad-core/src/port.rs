//! Timed HID primitives shared by the interpreter and special actions

use crate::hal::{Delay, HidTransport};
use crate::types::{ConnectionHandle, MouseButton, TimingConfig};

/// Transport plus delay, with the fixed press/release timing applied
pub struct HidPort<T, D> {
    transport: T,
    delay: D,
    key_press_ms: u32,
    click_press_ms: u32,
    sends: usize,
    failed: usize,
}

impl<T, D> HidPort<T, D>
where
    T: HidTransport,
    D: Delay,
{
    pub fn new(transport: T, delay: D, timing: &TimingConfig) -> Self {
        Self {
            transport,
            delay,
            key_press_ms: timing.key_press_ms,
            click_press_ms: timing.click_press_ms,
            sends: 0,
            failed: 0,
        }
    }

    /// Send one keyboard report, best effort
    pub fn send_key(&mut self, conn: ConnectionHandle, modifiers: u8, key: u8, pressed: bool) {
        self.sends += 1;
        if self.transport.send_key(conn, modifiers, key, pressed).is_err() {
            self.failed += 1;

            #[cfg(feature = "defmt")]
            defmt::warn!("keyboard report {} dropped (conn {})", key, conn);
        }
    }

    /// Send one mouse report, best effort
    pub fn send_mouse(&mut self, conn: ConnectionHandle, buttons: u8, dx: i8, dy: i8) {
        self.sends += 1;
        if self.transport.send_mouse(conn, buttons, dx, dy).is_err() {
            self.failed += 1;

            #[cfg(feature = "defmt")]
            defmt::warn!("mouse report {=u8:x} dropped (conn {})", buttons, conn);
        }
    }

    pub async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Press, hold, release, hold
    pub async fn tap(&mut self, conn: ConnectionHandle, modifiers: u8, key: u8) {
        self.send_key(conn, modifiers, key, true);
        self.delay.delay_ms(self.key_press_ms).await;
        self.send_key(conn, modifiers, key, false);
        self.delay.delay_ms(self.key_press_ms).await;
    }

    /// Press every key, then release every key, one report per key.
    ///
    /// The combo flag is the `pressed` argument; it flips exactly once
    /// between the two phases.
    pub async fn chord<K>(&mut self, conn: ConnectionHandle, modifiers: u8, keys: K)
    where
        K: Iterator<Item = u8> + Clone,
    {
        let mut pressed = true;
        for _phase in 0..2 {
            for key in keys.clone() {
                self.send_key(conn, modifiers, key, pressed);
                self.delay.delay_ms(self.key_press_ms).await;
            }
            pressed = !pressed;
        }
    }

    /// Button down, hold, all buttons up
    pub async fn click(&mut self, conn: ConnectionHandle, button: MouseButton) {
        self.send_mouse(conn, button.mask(), 0, 0);
        self.delay.delay_ms(self.click_press_ms).await;
        self.send_mouse(conn, 0, 0, 0);
    }

    /// Reports sent so far, failed ones included
    pub fn sends(&self) -> usize {
        self.sends
    }

    /// Reports the transport rejected
    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn key_press_ms(&self) -> u32 {
        self.key_press_ms
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Empty keyboard report and all mouse buttons up
    pub fn release_all(&mut self, conn: ConnectionHandle) {
        self.send_key(conn, 0, 0, false);
        self.send_mouse(conn, 0, 0, 0);
    }
}
