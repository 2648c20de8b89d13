//! Decoration engine
//!
//! Turns (buffer, visible ranges, selection) into the ordered list of
//! "replace this span with a widget" instructions for the host editor.
//!
//! # Per call
//! 1. Normalize the visible ranges (clamp, drop empty, sort, merge overlaps)
//! 2. Slice each range and run every enabled token matcher over it
//! 3. Keep the first of any overlapping tokens across pipelines
//! 4. Drop tokens touching any selection range (closed-interval test), so
//!    the raw syntax is editable where the cursor is
//! 5. Drop tokens that do not resolve to a valid instant
//! 6. Emit one decoration per survivor, spanning the token and its backticks
//!
//! Nothing is cached between calls. Cost is bounded by the visible text,
//! not the document.

use serde::{Deserialize, Serialize};

use crate::render::widget::Widget;
use crate::scanner::buffer::TextBuffer;
use crate::scanner::token::{CandidateMatch, Syntax, TokenMatcher};

// =============================================================================
// Core Types
// =============================================================================

/// Half-open `[from, to)` window currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub from: usize,
    pub to: usize,
}

impl VisibleRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }
}

/// Closed `[from, to]` selection; a cursor when `from == to`.
/// Endpoints may arrive in either order (anchor after head).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub from: usize,
    pub to: usize,
}

impl SelectionRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn cursor(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    /// Inclusive at both ends: a cursor right after a token still touches it.
    pub fn touches(&self, start: usize, end: usize) -> bool {
        let (lo, hi) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        lo <= end && hi >= start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub ranges: Vec<SelectionRange>,
}

impl Selection {
    pub fn new(ranges: Vec<SelectionRange>) -> Self {
        Self { ranges }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(vec![SelectionRange::cursor(pos)])
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn touches(&self, start: usize, end: usize) -> bool {
        self.ranges.iter().any(|r| r.touches(start, end))
    }
}

/// Replace `[from, to)` with `widget`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub widget: Widget,
}

/// Counters for one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationStats {
    pub ranges_scanned: usize,
    pub units_scanned: usize,
    pub candidates: usize,
    pub suppressed_by_selection: usize,
    pub invalid: usize,
    pub emitted: usize,
    pub elapsed_us: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecorationSet {
    pub decorations: Vec<Decoration>,
    pub stats: DecorationStats,
}

impl DecorationSet {
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.decorations.iter()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The enabled pipelines. Holds no document state; `compute` is a pure
/// function of its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationEngine {
    syntaxes: Vec<Syntax>,
}

impl Default for DecorationEngine {
    fn default() -> Self {
        Self::new(&Syntax::ALL)
    }
}

impl DecorationEngine {
    pub fn new(syntaxes: &[Syntax]) -> Self {
        let mut enabled: Vec<Syntax> = Vec::with_capacity(syntaxes.len());
        for syntax in syntaxes {
            if !enabled.contains(syntax) {
                enabled.push(*syntax);
            }
        }
        Self { syntaxes: enabled }
    }

    pub fn syntaxes(&self) -> &[Syntax] {
        &self.syntaxes
    }

    pub fn compute<B>(&self, buffer: &B, visible: &[VisibleRange], selection: &Selection) -> DecorationSet
    where
        B: TextBuffer + ?Sized,
    {
        let started = instant::Instant::now();
        let mut set = DecorationSet::default();

        for range in normalize_ranges(visible, buffer.len()) {
            let slice = buffer.slice(range.from..range.to);
            set.stats.ranges_scanned += 1;
            set.stats.units_scanned += range.len();

            let mut in_range: Vec<CandidateMatch> = Vec::new();
            for syntax in &self.syntaxes {
                let matcher = TokenMatcher::shared(*syntax);
                in_range.extend(matcher.matches(&slice, range.from, buffer));
            }
            set.stats.candidates += in_range.len();

            // Overlaps are settled on raw text, before selection and validity
            for candidate in dedupe_overlapping(in_range) {
                match decide(&candidate, selection) {
                    Verdict::Emit(decoration) => set.decorations.push(decoration),
                    Verdict::Suppressed => set.stats.suppressed_by_selection += 1,
                    Verdict::Invalid => set.stats.invalid += 1,
                }
            }
        }

        set.stats.emitted = set.decorations.len();
        set.stats.elapsed_us = started.elapsed().as_micros() as u64;
        set
    }
}

/// One pipeline over the given inputs.
pub fn compute_decorations<B>(
    syntax: Syntax,
    buffer: &B,
    visible: &[VisibleRange],
    selection: &Selection,
) -> DecorationSet
where
    B: TextBuffer + ?Sized,
{
    DecorationEngine::new(&[syntax]).compute(buffer, visible, selection)
}

/// Several pipelines, merged in offset order.
pub fn compute_all<B>(
    syntaxes: &[Syntax],
    buffer: &B,
    visible: &[VisibleRange],
    selection: &Selection,
) -> DecorationSet
where
    B: TextBuffer + ?Sized,
{
    DecorationEngine::new(syntaxes).compute(buffer, visible, selection)
}

// =============================================================================
// Helpers
// =============================================================================

enum Verdict {
    Emit(Decoration),
    Suppressed,
    Invalid,
}

fn decide(candidate: &CandidateMatch, selection: &Selection) -> Verdict {
    if selection.touches(candidate.start, candidate.end) {
        return Verdict::Suppressed;
    }
    match Widget::from_fields(&candidate.fields) {
        Some(widget) => Verdict::Emit(Decoration {
            from: candidate.start,
            to: candidate.end,
            widget,
        }),
        None => Verdict::Invalid,
    }
}

/// Clamp to the buffer, drop empties, sort, and merge ranges that overlap.
/// Ranges that only touch stay separate: tokens are never stitched across
/// a range boundary.
pub fn normalize_ranges(visible: &[VisibleRange], len: usize) -> Vec<VisibleRange> {
    let mut ranges: Vec<VisibleRange> = visible
        .iter()
        .map(|r| VisibleRange::new(r.from.min(len), r.to.min(len)))
        .filter(|r| !r.is_empty())
        .collect();
    ranges.sort_by_key(|r| (r.from, r.to));

    let mut merged: Vec<VisibleRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.from < last.to => last.to = last.to.max(range.to),
            _ => merged.push(range),
        }
    }
    merged
}

/// Order by start and keep the first of any overlapping pair.
fn dedupe_overlapping(mut candidates: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    if candidates.len() < 2 {
        return candidates;
    }

    candidates.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));

    let mut result = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        if result.is_empty() || candidate.start >= last_end {
            last_end = candidate.end;
            result.push(candidate);
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_touch_is_inclusive() {
        let sel = SelectionRange::cursor(10);
        assert!(sel.touches(4, 10));
        assert!(sel.touches(10, 16));
        assert!(!sel.touches(11, 16));
        assert!(!sel.touches(0, 9));
    }

    #[test]
    fn test_reversed_selection_range() {
        let sel = SelectionRange::new(20, 5);
        assert!(sel.touches(0, 5));
        assert!(sel.touches(20, 30));
        assert!(!sel.touches(21, 30));
    }

    #[test]
    fn test_normalize_ranges() {
        let ranges = normalize_ranges(
            &[
                VisibleRange::new(50, 80),
                VisibleRange::new(0, 10),
                VisibleRange::new(5, 20),
                VisibleRange::new(20, 30),
                VisibleRange::new(90, 90),
                VisibleRange::new(95, 200),
            ],
            100,
        );
        assert_eq!(
            ranges,
            vec![
                VisibleRange::new(0, 20),
                VisibleRange::new(20, 30),
                VisibleRange::new(50, 80),
                VisibleRange::new(95, 100),
            ]
        );
    }

    #[test]
    fn test_engine_dedupes_syntaxes() {
        let engine = DecorationEngine::new(&[Syntax::EpochTag, Syntax::EpochTag, Syntax::Rfc3339]);
        assert_eq!(engine.syntaxes(), &[Syntax::EpochTag, Syntax::Rfc3339]);
    }
}
