//! Property tests over generated scripts and text

use proptest::prelude::*;

use macropad_core::hal::mock::HidEvent;
use macropad_core::keycodes::LEFT_SHIFT_MASK;
use macropad_core::script::script_row;
use macropad_core::test_utils::{Harness, Pulse};
use macropad_core::translate::{translate_in_place, SHIFT_GAP};
use macropad_core::*;

use crate::Stub;

const ROW: usize = 24;
const APP: AppId = AppId(0);

/// A generated step, before encoding
#[derive(Clone, Debug)]
enum GenStep {
    Key(u8),
    Combo(Vec<u8>),
    Click(StepCode),
    Special,
}

impl GenStep {
    fn encode(&self, out: &mut Vec<StepCode>) {
        match self {
            GenStep::Key(key) => out.push(*key as StepCode),
            GenStep::Combo(keys) => {
                out.push(codes::combine(keys.len()));
                out.extend(keys.iter().map(|&key| key as StepCode));
            }
            GenStep::Click(code) => out.push(*code),
            GenStep::Special => out.extend([codes::SPECIAL, 0]),
        }
    }

    fn expected_pulse(&self) -> Option<Pulse> {
        match self {
            GenStep::Key(key) => Some(Pulse::Tap { modifiers: 0, key: *key }),
            GenStep::Combo(keys) => Some(Pulse::Chord { modifiers: 0, keys: keys.clone() }),
            GenStep::Click(code) => Some(Pulse::Click {
                buttons: if *code == codes::MOUSE_LEFT {
                    MouseButton::Left.mask()
                } else {
                    MouseButton::Right.mask()
                },
            }),
            GenStep::Special => None,
        }
    }
}

fn key() -> impl Strategy<Value = u8> {
    1u8..=231
}

fn step() -> impl Strategy<Value = GenStep> {
    prop_oneof![
        4 => key().prop_map(GenStep::Key),
        2 => prop::collection::vec(key(), codes::COMBINE_MIN..=codes::COMBINE_MAX).prop_map(GenStep::Combo),
        1 => (251..=255).prop_map(GenStep::Click),
        1 => Just(GenStep::Special),
    ]
}

/// Encode as many steps as fit the executable slots
fn encode(steps: &[GenStep]) -> (Vec<GenStep>, Vec<StepCode>) {
    let mut kept = Vec::new();
    let mut codes = Vec::new();
    for step in steps {
        let mut encoded = Vec::new();
        step.encode(&mut encoded);
        if codes.len() + encoded.len() > ROW - 1 {
            break;
        }
        codes.extend(encoded);
        kept.push(step.clone());
    }
    (kept, codes)
}

proptest! {
    #[test]
    fn prop_scripts_play_every_step(steps in prop::collection::vec(step(), 0..16)) {
        let (kept, step_codes) = encode(&steps);
        let table = [script_row::<ROW>(0, &step_codes)];
        let slots = [SpecialSlot::new(Stub::Returns(ActionOutcome::Ok), &[], &[])];

        let mut registry = AppRegistry::new();
        registry.setup(APP, "generated", &table).unwrap();
        let mut actions = ActionTable::new();
        actions.register(APP, &slots).unwrap();
        let config = MacroConfig::new(registry, actions, &[], TimingConfig::default()).unwrap();

        let harness = Harness::new();
        let mut engine = harness.engine(&config);
        let report = tokio_test::block_on(engine.run_command(APP, 0)).unwrap();

        let expected: Vec<Pulse> = kept.iter().filter_map(GenStep::expected_pulse).collect();
        prop_assert_eq!(harness.pulses(), expected);
        prop_assert_eq!(report.steps, kept.len());
        prop_assert!(report.last_slot <= ROW - 1);

        let full = step_codes.len() == ROW - 1;
        let termination = if full { Termination::Exhausted } else { Termination::EndMarker };
        prop_assert_eq!(report.termination, termination);
    }

    #[test]
    fn prop_presses_and_releases_balance(steps in prop::collection::vec(step(), 0..16)) {
        let (_, step_codes) = encode(&steps);
        let table = [script_row::<ROW>(0, &step_codes)];
        let slots = [SpecialSlot::new(Stub::Returns(ActionOutcome::SkipNext), &[], &[])];

        let mut registry = AppRegistry::new();
        registry.setup(APP, "generated", &table).unwrap();
        let mut actions = ActionTable::new();
        actions.register(APP, &slots).unwrap();
        let config = MacroConfig::new(registry, actions, &[], TimingConfig::default()).unwrap();

        let harness = Harness::new();
        let mut engine = harness.engine(&config);
        tokio_test::block_on(engine.run_command(APP, 0)).unwrap();

        let events = harness.transport.events();
        let presses = events.iter().filter(|e| matches!(e, HidEvent::Key { pressed: true, .. })).count();
        let releases = events.iter().filter(|e| matches!(e, HidEvent::Key { pressed: false, .. })).count();
        prop_assert_eq!(presses, releases);

        let downs = events.iter().filter(|e| matches!(e, HidEvent::Mouse { buttons, .. } if *buttons != 0)).count();
        let ups = events.iter().filter(|e| matches!(e, HidEvent::Mouse { buttons: 0, .. })).count();
        prop_assert_eq!(downs, ups);
    }

    #[test]
    fn prop_script_validation_matches_decoder(codes in prop::collection::vec(-2i32..260, 1..12)) {
        let mut row = vec![0];
        row.extend(codes);
        let script = Script::new(&row);

        let decoded_ok = script.steps().all(|item| item.is_ok());
        prop_assert_eq!(script.validate().is_ok(), decoded_ok);
    }

    #[test]
    fn prop_shift_row_follows_case(text in "[ -~]{0,32}") {
        let bytes = text.as_bytes();
        let mut buf = [0u8; 64];
        buf[..bytes.len()].copy_from_slice(bytes);
        let len = translate_in_place(&mut buf, bytes.len());

        prop_assert_eq!(len, bytes.len());
        for (i, &c) in bytes.iter().enumerate() {
            let expected = if c.is_ascii_uppercase() {
                1
            } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
                0
            } else {
                SHIFT_GAP
            };
            prop_assert_eq!(buf[len + i], expected);
        }
    }

    #[test]
    fn prop_typed_text_holds_shift_for_capitals(text in "[a-zA-Z0-9]{1,24}") {
        let table = [script_row::<4>(0, &[codes::SPECIAL, 0])];
        let passcode: &'static [u8] = Box::leak(text.clone().into_bytes().into_boxed_slice());
        let slots = [SpecialSlot::new(BuiltinAction::TypeCredentials, b"", passcode)];

        let mut registry = AppRegistry::new();
        registry.setup(APP, "typing", &table).unwrap();
        let mut actions = ActionTable::new();
        actions.register(APP, &slots).unwrap();
        let config = MacroConfig::new(registry, actions, &[], TimingConfig::default()).unwrap();

        let harness = Harness::new();
        let mut engine = harness.engine(&config);
        tokio_test::block_on(engine.run_command(APP, 0)).unwrap();

        let taps: Vec<u8> = harness
            .pulses()
            .into_iter()
            .filter_map(|pulse| match pulse {
                Pulse::Tap { modifiers, .. } => Some(modifiers),
                _ => None,
            })
            .collect();
        let expected: Vec<u8> = text
            .bytes()
            .map(|c| if c.is_ascii_uppercase() { LEFT_SHIFT_MASK } else { 0 })
            .collect();
        prop_assert_eq!(taps, expected);
    }
}
