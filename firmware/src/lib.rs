#![no_std]

//! Firmware library exposing the board transport and embassy tasks

pub use embassy_executor::Spawner;
pub use embassy_time::Duration;
pub use static_cell::StaticCell;

pub use macropad_core::*;

pub use crate::mock_hardware::*;
pub use crate::tasks::*;

// Stand-in hardware until the BLE HID stack is wired up
pub mod mock_hardware {
    use macropad_core::hal::{HalError, HidTransport};
    use macropad_core::input::ConnectionTracker;
    use macropad_core::types::ConnectionHandle;

    /// HID transport that logs reports instead of notifying a host
    #[derive(Debug)]
    pub struct LoggingTransport {
        connection: &'static ConnectionTracker,
        reports: u32,
    }

    impl LoggingTransport {
        pub fn new(connection: &'static ConnectionTracker) -> Self {
            #[cfg(feature = "defmt")]
            defmt::info!("🧪 Using logging HID transport");
            Self { connection, reports: 0 }
        }

        /// Reports accepted so far
        pub fn reports(&self) -> u32 {
            self.reports
        }

        fn accept(&mut self, conn: ConnectionHandle) -> Result<(), HalError> {
            if !self.connection.is_connected() || conn != self.connection.current() {
                return Err(HalError::NotConnected);
            }
            self.reports = self.reports.wrapping_add(1);
            Ok(())
        }
    }

    impl HidTransport for LoggingTransport {
        type Error = HalError;

        fn send_key(
            &mut self,
            conn: ConnectionHandle,
            modifiers: u8,
            key: u8,
            pressed: bool,
        ) -> Result<(), Self::Error> {
            self.accept(conn)?;
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "⌨️ key {=u8:#04x} mods {=u8:#04x} {}",
                key,
                modifiers,
                if pressed { "DOWN" } else { "UP" }
            );
            #[cfg(not(feature = "defmt"))]
            let _ = (modifiers, key, pressed);
            Ok(())
        }

        fn send_mouse(
            &mut self,
            conn: ConnectionHandle,
            buttons: u8,
            dx: i8,
            dy: i8,
        ) -> Result<(), Self::Error> {
            self.accept(conn)?;
            #[cfg(feature = "defmt")]
            defmt::debug!("🖱️ buttons {=u8:#04x} move ({}, {})", buttons, dx, dy);
            #[cfg(not(feature = "defmt"))]
            let _ = (buttons, dx, dy);
            Ok(())
        }
    }
}

// Embassy tasks module
pub mod tasks {
    use super::*;

    /// Macro engine task wrapper
    #[embassy_executor::task]
    pub async fn macro_task_wrapper(
        config: &'static MacroConfig<'static, BuiltinAction>,
        inputs: &'static InputBank,
        connection: &'static ConnectionTracker,
        selector: &'static AppSelector,
    ) {
        #[cfg(feature = "defmt")]
        defmt::info!("🧠 Macro task started");
        let transport = LoggingTransport::new(connection);
        macropad_core::engine::macro_task(config, transport, inputs, connection, selector).await
    }

    /// Pairing stand-in: reports a host connection once advertising would finish
    #[embassy_executor::task]
    pub async fn connection_task(connection: &'static ConnectionTracker, handle: ConnectionHandle) {
        embassy_time::Timer::after(Duration::from_millis(500)).await;
        connection.connect(handle);
        #[cfg(feature = "defmt")]
        defmt::info!("🔗 Host connected on handle {}", handle.0);
    }
}

/// Board tick hook, re-exported for the timer interrupt handler
pub use crate::time_driver::on_tick;

// Time driver for embassy
mod time_driver;
