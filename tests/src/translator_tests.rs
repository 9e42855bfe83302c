//! Text translation and step code tables

use rstest::rstest;

use macropad_core::keycodes::*;
use macropad_core::translate::{hid_for_ascii, translate_in_place, SHIFT_GAP};
use macropad_core::*;

#[rstest]
#[case(b'a', Some((KEY_A, false)))]
#[case(b'v', Some((KEY_V, false)))]
#[case(b'z', Some((KEY_Z, false)))]
#[case(b'A', Some((KEY_A, true)))]
#[case(b'M', Some((0x10, true)))]
#[case(b'Z', Some((KEY_Z, true)))]
#[case(b'0', Some((KEY_0, false)))]
#[case(b'1', Some((KEY_1, false)))]
#[case(b'9', Some((KEY_9, false)))]
#[case(b' ', None)]
#[case(b'-', None)]
#[case(b'@', None)]
#[case(b'[', None)]
fn test_ascii_scancodes(#[case] c: u8, #[case] expected: Option<(u8, bool)>) {
    assert_eq!(hid_for_ascii(c), expected);
}

#[rstest]
#[case(0, CodeClass::End)]
#[case(1, CodeClass::Key(1))]
#[case(KEY_ESCAPE as StepCode, CodeClass::Key(KEY_ESCAPE))]
#[case(231, CodeClass::Key(231))]
#[case(codes::SPECIAL, CodeClass::Special)]
#[case(242, CodeClass::Combine(2))]
#[case(249, CodeClass::Combine(9))]
#[case(251, CodeClass::Click(MouseButton::Right))]
#[case(253, CodeClass::Click(MouseButton::Left))]
#[case(255, CodeClass::Click(MouseButton::Right))]
#[case(-1, CodeClass::Reserved)]
#[case(233, CodeClass::Reserved)]
#[case(241, CodeClass::Reserved)]
#[case(250, CodeClass::Reserved)]
#[case(256, CodeClass::Reserved)]
fn test_code_classes(#[case] code: StepCode, #[case] class: CodeClass) {
    assert_eq!(classify(code), class);
}

#[test]
fn test_passcode_strokes() {
    let strokes: heapless::Vec<Option<Stroke>, 16> = TextMatrix::<32>::new(b"coMeValavita")
        .unwrap()
        .translate()
        .collect();

    assert_eq!(strokes.len(), 12);
    let shifted: heapless::Vec<usize, 4> = strokes
        .iter()
        .enumerate()
        .filter(|(_, stroke)| matches!(stroke, Some(Stroke { shift: true, .. })))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(shifted, [2, 4]);
    assert_eq!(strokes[0], Some(Stroke { code: 0x06, shift: false }));
    assert_eq!(strokes[4], Some(Stroke { code: KEY_V, shift: true }));
}

#[test]
fn test_unsupported_characters_leave_gaps() {
    let strokes: Vec<Option<Stroke>> = TextMatrix::<16>::new(b"a b!").unwrap().translate().collect();
    assert_eq!(
        strokes,
        [
            Some(Stroke { code: KEY_A, shift: false }),
            None,
            Some(Stroke { code: 0x05, shift: false }),
            None,
        ]
    );
}

#[test]
fn test_matrix_rows() {
    let mut buf = *b"Hi7\0\0\0";
    assert_eq!(translate_in_place(&mut buf, 3), 3);
    assert_eq!(buf, [0x0B, 0x0C, 0x24, 1, 0, 0]);
}

#[test]
fn test_short_buffer_clamps_length() {
    let mut buf = *b"abcde";
    assert_eq!(translate_in_place(&mut buf, 5), 2);
    assert_eq!(&buf[..2], [KEY_A, 0x05]);
    assert_eq!(&buf[2..4], [0, 0]);
    assert_eq!(buf[4], b'e');
}

#[test]
fn test_second_translation_is_all_gaps() {
    let mut buf = *b"Ab\0\0";
    translate_in_place(&mut buf, 2);
    translate_in_place(&mut buf, 2);
    assert_eq!(&buf[2..], [SHIFT_GAP, SHIFT_GAP]);
}

#[rstest]
#[case(0, true)]
#[case(16, true)]
#[case(17, false)]
fn test_matrix_capacity(#[case] len: usize, #[case] fits: bool) {
    let text = vec![b'x'; len];
    assert_eq!(TextMatrix::<32>::new(&text).is_ok(), fits);
}
