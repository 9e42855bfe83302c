//! ASCII to HID scancode translation for the text-typing action
//!
//! Text is handled as a two-row matrix of `len` columns: row 0 holds the
//! characters and is overwritten with scancodes, row 1 receives the shift
//! flag of each column.

use crate::keycodes::{KEY_0, KEY_1, KEY_A};

/// Row 1 value for a column that has no scancode
pub const SHIFT_GAP: u8 = 0xFF;

const LOWER_OFFSET: u8 = b'a' - KEY_A;
const UPPER_OFFSET: u8 = b'A' - KEY_A;
const ZERO_OFFSET: u8 = b'0' - KEY_0;
const DIGIT_OFFSET: u8 = b'1' - KEY_1;

/// Scancode and shift flag for one printable character
pub const fn hid_for_ascii(c: u8) -> Option<(u8, bool)> {
    match c {
        b'a'..=b'z' => Some((c - LOWER_OFFSET, false)),
        b'A'..=b'Z' => Some((c - UPPER_OFFSET, true)),
        b'0' => Some((c - ZERO_OFFSET, false)),
        b'1'..=b'9' => Some((c - DIGIT_OFFSET, false)),
        _ => None,
    }
}

/// Translate the first `len` characters of `buf` in place.
///
/// `buf` must hold `2 * len` bytes; a shorter buffer clamps `len` to
/// `buf.len() / 2`. Row 1 of each column is written before row 0 so the
/// shift decision sees the original character. Unsupported characters keep
/// their byte in row 0 and get [`SHIFT_GAP`] in row 1.
///
/// The translation is destructive: running it twice over the same buffer
/// turns every column into a gap.
pub fn translate_in_place(buf: &mut [u8], len: usize) -> usize {
    let len = len.min(buf.len() / 2);
    let (chars, shifts) = buf.split_at_mut(len);

    for (c, shift) in chars.iter_mut().zip(shifts.iter_mut()) {
        match hid_for_ascii(*c) {
            Some((code, upper)) => {
                *shift = upper as u8;
                *c = code;
            }
            None => *shift = SHIFT_GAP,
        }
    }
    len
}

/// One key press produced from text
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stroke {
    pub code: u8,
    pub shift: bool,
}

/// Owned two-row text buffer of `CAP` bytes, so up to `CAP / 2` characters
#[derive(Clone, Debug)]
pub struct TextMatrix<const CAP: usize> {
    buf: [u8; CAP],
    len: usize,
}

impl<const CAP: usize> TextMatrix<CAP> {
    pub fn new(text: &[u8]) -> Result<Self, &'static str> {
        if text.len() * 2 > CAP {
            return Err("Text does not fit the translation buffer");
        }
        let mut buf = [0; CAP];
        buf[..text.len()].copy_from_slice(text);
        Ok(Self {
            buf,
            len: text.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the text and produce its key strokes
    pub fn translate(mut self) -> KeyStrokes<CAP> {
        let len = translate_in_place(&mut self.buf, self.len);
        KeyStrokes {
            buf: self.buf,
            len,
            next: 0,
        }
    }
}

/// Translated text; yields `None` for characters without a scancode
#[derive(Clone, Debug)]
pub struct KeyStrokes<const CAP: usize> {
    buf: [u8; CAP],
    len: usize,
    next: usize,
}

impl<const CAP: usize> KeyStrokes<CAP> {
    /// The raw matrix, both rows
    pub fn matrix(&self) -> &[u8] {
        &self.buf[..self.len * 2]
    }
}

impl<const CAP: usize> Iterator for KeyStrokes<CAP> {
    type Item = Option<Stroke>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let column = self.next;
        self.next += 1;

        let shift = self.buf[self.len + column];
        Some(match shift {
            SHIFT_GAP => None,
            _ => Some(Stroke {
                code: self.buf[column],
                shift: shift != 0,
            }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.len - self.next;
        (left, Some(left))
    }
}
