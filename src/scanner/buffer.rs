//! Host text access
//!
//! The decoration engine never owns the document. It asks the host for the
//! text of each visible window and for the length of a prefix measured in the
//! host's own offset units:
//! - `str`: byte offsets (native callers)
//! - `Utf16Text`: UTF-16 code units (JavaScript editors)
//! - `VisibleText`: only the on-screen windows, UTF-16 code units (WASM path)

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// Trait
// =============================================================================

/// Read-only, offset-addressable document text.
pub trait TextBuffer {
    /// Total length in buffer units.
    fn len(&self) -> usize;

    /// Text between two buffer offsets. Out-of-bounds ranges are clamped.
    fn slice(&self, range: Range<usize>) -> Cow<'_, str>;

    /// Length of `text` expressed in buffer units.
    fn measure(&self, text: &str) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Byte offsets
// =============================================================================

impl TextBuffer for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = floor_char_boundary(self, range.start);
        let end = floor_char_boundary(self, range.end).max(start);
        Cow::Borrowed(&self[start..end])
    }

    fn measure(&self, text: &str) -> usize {
        text.len()
    }
}

impl TextBuffer for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        TextBuffer::slice(self.as_str(), range)
    }

    fn measure(&self, text: &str) -> usize {
        text.len()
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

// =============================================================================
// UTF-16 offsets
// =============================================================================

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index of the given UTF-16 offset within `text`.
/// An offset that lands inside a surrogate pair rounds down to the pair start.
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, c) in text.char_indices() {
        let next = units + c.len_utf16();
        if next > offset {
            return byte;
        }
        units = next;
    }
    text.len()
}

/// Whole-document text addressed in UTF-16 code units.
#[derive(Debug, Clone, Default)]
pub struct Utf16Text {
    text: String,
    units: usize,
}

impl Utf16Text {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let units = utf16_len(&text);
        Self { text, units }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl TextBuffer for Utf16Text {
    fn len(&self) -> usize {
        self.units
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = utf16_to_byte(&self.text, range.start);
        let end = utf16_to_byte(&self.text, range.end).max(start);
        Cow::Borrowed(&self.text[start..end])
    }

    fn measure(&self, text: &str) -> usize {
        utf16_len(text)
    }
}

// =============================================================================
// Visible windows only
// =============================================================================

/// One on-screen window of the document as sent by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisibleSlice {
    /// Absolute UTF-16 offset of the first unit of `text`
    pub from: usize,
    pub text: String,
}

impl VisibleSlice {
    pub fn new(from: usize, text: impl Into<String>) -> Self {
        Self { from, text: text.into() }
    }

    /// Absolute UTF-16 offset one past the last unit of `text`
    pub fn to(&self) -> usize {
        self.from + utf16_len(&self.text)
    }
}

/// A buffer made only of the windows the host currently renders.
///
/// Reading outside those windows yields empty text, so the cost of a scan is
/// bounded by what is on screen regardless of document size.
#[derive(Debug, Clone, Default)]
pub struct VisibleText {
    slices: Vec<VisibleSlice>,
    len: usize,
}

impl VisibleText {
    /// Overlapping windows are stitched into one so a range never spans
    /// two stored slices. Windows that only touch stay separate.
    pub fn new(mut slices: Vec<VisibleSlice>) -> Self {
        slices.sort_by_key(|s| s.from);

        let mut stitched: Vec<VisibleSlice> = Vec::with_capacity(slices.len());
        for slice in slices {
            match stitched.last_mut() {
                Some(last) if slice.from < last.to() => {
                    let covered = last.to() - slice.from;
                    let tail = utf16_to_byte(&slice.text, covered);
                    last.text.push_str(&slice.text[tail..]);
                }
                _ => stitched.push(slice),
            }
        }

        let len = stitched.iter().map(VisibleSlice::to).max().unwrap_or(0);
        Self { slices: stitched, len }
    }

    /// Half-open ranges covered by the stored windows.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.slices.iter().map(|s| s.from..s.to()).collect()
    }
}

impl TextBuffer for VisibleText {
    fn len(&self) -> usize {
        self.len
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let Some(window) = self
            .slices
            .iter()
            .find(|s| s.from <= range.start && range.start < s.to())
        else {
            return Cow::Borrowed("");
        };

        let local_start = range.start - window.from;
        let local_end = range.end.max(range.start).min(window.to()) - window.from;
        let start = utf16_to_byte(&window.text, local_start);
        let end = utf16_to_byte(&window.text, local_end).max(start);
        Cow::Borrowed(&window.text[start..end])
    }

    fn measure(&self, text: &str) -> usize {
        utf16_len(text)
    }
}

// =============================================================================
// Tests
// =============================================================================
