// Host-side walkthrough of the built-in macro profile

use macropad_core::hal::mock::HidEvent;
use macropad_core::test_utils::{pulses, timeline, Harness, Pulse};
use macropad_core::*;

fn main() {
    println!("🧪 Macro Pad Host Walkthrough");

    let config = match default_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Built-in profile rejected: {}", error);
            std::process::exit(1);
        }
    };
    println!("⚙️ {} applications, timing {:?}", config.registry().len(), config.timing());

    for app in config.registry().iter() {
        println!();
        println!("📱 {} (app {})", app.name(), app.id().0);
        for command in 0..app.script_count() as u8 {
            run_script(&config, app.id(), command);
        }
    }

    println!();
    println!("✅ Walkthrough finished");
    println!("📝 Run the test suite with: cargo test");
}

/// Run one script against a recording transport and print what the host saw
fn run_script(config: &MacroConfig<'_, BuiltinAction>, app: AppId, command: u8) {
    let harness = Harness::new();
    let mut engine = harness.engine(config);

    let report = match tokio_test::block_on(engine.run_command(app, command)) {
        Ok(report) => report,
        Err(error) => {
            println!("  ⚠️ command {}: {}", command, error);
            return;
        }
    };

    if report.steps == 0 {
        println!("  ⏸️ command {}: empty", command);
        return;
    }

    let log = harness.log();
    let elapsed = timeline(&log).last().map(|(at, _)| *at).unwrap_or(0);
    println!(
        "  ▶️ command {}: {} steps, {} reports over {}ms, {:?}",
        command, report.steps, report.sends, elapsed, report.termination
    );
    for pulse in pulses(&log) {
        println!("    {}", describe(&pulse));
    }
}

fn describe(pulse: &Pulse) -> String {
    match pulse {
        Pulse::Tap { modifiers, key } => format!("tap {:#04x} mods {:#04x}", key, modifiers),
        Pulse::Chord { modifiers, keys } => format!("chord {:02x?} mods {:#04x}", keys, modifiers),
        Pulse::Click { buttons } => format!("click {:#04x}", buttons),
        Pulse::Raw(HidEvent::Key { key, pressed, .. }) => {
            format!("key {:#04x} {}", key, if *pressed { "down" } else { "up" })
        }
        Pulse::Raw(event) => format!("{:?}", event),
    }
}
