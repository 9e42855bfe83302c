#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;

// RISC-V runtime
use riscv_rt as _;

// Panic handler
use panic_halt as _;

use embassy_executor::Spawner;
use embassy_time::Duration;
use static_cell::StaticCell;

use macropad_firmware::*;

// Static resources shared between the BLE callbacks, the GPIO interrupt and the engine
static INPUTS: InputBank = InputBank::new();
static CONNECTION: ConnectionTracker = ConnectionTracker::new();
static SELECTOR: AppSelector = AppSelector::new(profile::ZOOM_MOBILE);
static CONFIG: StaticCell<MacroConfig<'static, BuiltinAction>> = StaticCell::new();

/// Main firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    #[cfg(feature = "defmt")]
    defmt::info!("🔧 Macropad Firmware Starting...");

    let config = match default_config() {
        Ok(config) => CONFIG.init(config),
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("❌ Macro configuration rejected: {}", _e);
            halt().await
        }
    };
    #[cfg(feature = "defmt")]
    defmt::info!(
        "⚙️ {} applications, step gap {} ms",
        config.registry().len(),
        config.timing().step_gap_ms
    );

    #[cfg(feature = "defmt")]
    defmt::info!("🚀 Spawning macro tasks...");

    spawner.must_spawn(connection_task(&CONNECTION, ConnectionHandle(1)));
    spawner.must_spawn(macro_task_wrapper(config, &INPUTS, &CONNECTION, &SELECTOR));

    #[cfg(feature = "defmt")]
    defmt::info!("✨ Macropad firmware ready!");

    // Main supervision loop
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
        #[cfg(feature = "defmt")]
        defmt::trace!("💓 Heartbeat");
    }
}

/// Park the main task after a fatal setup error
async fn halt() -> ! {
    loop {
        embassy_time::Timer::after(Duration::from_secs(1)).await;
    }
}
