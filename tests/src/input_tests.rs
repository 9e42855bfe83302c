//! Input collaborators against embedded-hal mock pins and shared atomics

use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction as PinTransaction};

use macropad_core::profile::{scripts, ZOOM_MOBILE};
use macropad_core::test_utils::{Harness, Pulse};
use macropad_core::keycodes::*;
use macropad_core::*;

fn pin(states: &[State]) -> PinMock {
    let expectations: Vec<PinTransaction> = states.iter().map(|&state| PinTransaction::get(state)).collect();
    PinMock::new(&expectations)
}

#[test]
fn test_active_low_pins_resolve_lowest_line() {
    let pins = [
        pin(&[State::High]),
        pin(&[State::Low]),
        pin(&[State::Low]),
    ];
    let mut inputs = EmbeddedHalInputs::new(pins);

    let snapshot = inputs.snapshot();
    assert_eq!(snapshot, InputSnapshot(0b110));

    let resolution = ButtonMap::sequential(3).resolve(snapshot).unwrap();
    assert_eq!((resolution.line, resolution.command), (1, 1));

    for mut pin in inputs.release() {
        pin.done();
    }
}

#[test]
fn test_unmapped_line_is_ignored() {
    let pins = [pin(&[State::Low]), pin(&[State::High])];
    let mut inputs = EmbeddedHalInputs::new(pins);

    let map = ButtonMap::new(&[(1, 4)]);
    let mut sampler = InputSampler::new();
    assert!(!sampler.sample(&mut inputs, &map));
    assert_eq!(sampler.take(), None);

    for mut pin in inputs.release() {
        pin.done();
    }
}

#[test]
fn test_engine_polls_pins_until_press() {
    let config = default_config().unwrap();
    let harness = Harness::new();

    // two idle polls, then line 1 goes low
    let pins = [
        pin(&[State::High, State::High, State::High]),
        pin(&[State::High, State::High, State::Low]),
    ];
    let mut handles = pins.clone();

    let mut engine = MacroEngine::new(
        &config,
        harness.transport.clone(),
        EmbeddedHalInputs::new(pins),
        harness.delay.clone(),
        &harness.connection,
        &harness.selector,
    );
    let report = tokio_test::block_on(engine.run_cycle()).unwrap();

    assert_eq!(report.app, ZOOM_MOBILE);
    assert_eq!(report.command, scripts::TOGGLE_VIDEO as u8);
    assert_eq!(
        harness.pulses(),
        [
            Pulse::Click { buttons: MOUSE_BUTTON_LEFT },
            Pulse::Tap { modifiers: 0, key: KEY_DOWN_ARROW },
            Pulse::Tap { modifiers: 0, key: KEY_RIGHT_ARROW },
            Pulse::Tap { modifiers: 0, key: KEY_SPACEBAR },
            Pulse::Tap { modifiers: 0, key: KEY_ESCAPE },
        ]
    );

    for handle in handles.iter_mut() {
        handle.done();
    }
}

#[test]
fn test_input_bank_shared_across_threads() {
    static BANK: InputBank = InputBank::new();

    std::thread::scope(|scope| {
        for line in [0usize, 3, 5, 15] {
            scope.spawn(move || BANK.set_level(line, true));
        }
    });
    assert_eq!(BANK.load(), InputSnapshot(0b1000_0000_0010_1001));

    BANK.set_level(3, false);
    let mut reader = &BANK;
    assert_eq!(reader.snapshot().pressed_lines().collect::<Vec<_>>(), [0, 5, 15]);
}

#[test]
fn test_connection_tracker_keeps_stale_handle() {
    let tracker = ConnectionTracker::new();
    assert!(!tracker.is_connected());
    assert_eq!(tracker.current(), ConnectionHandle::NONE);

    tracker.connect(ConnectionHandle(12));
    assert!(tracker.is_connected());

    tracker.disconnect();
    assert!(!tracker.is_connected());
    assert_eq!(tracker.current(), ConnectionHandle(12));
}

#[test]
fn test_selector_switches_application() {
    let selector = AppSelector::default();
    assert_eq!(selector.current(), ZOOM_MOBILE);
    selector.select(AppId(3));
    assert_eq!(selector.current(), AppId(3));
}
