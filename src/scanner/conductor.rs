//! DecorationConductor: recompute-on-notify for one editor view
//!
//! # Design Principles
//! 1. State machine: Detached → Attached
//! 2. The host owns the event wiring; it calls `update` with what changed
//! 3. Every recompute replaces the active set wholesale
//!
//! # Usage
//! ```rust
//! use chronotag::{DecorationConductor, Selection, UpdateFlags, VisibleRange};
//!
//! let text = "shipped `2023-01-01`";
//! let visible = [VisibleRange::new(0, text.len())];
//!
//! let mut conductor = DecorationConductor::default();
//! conductor.attach(text, &visible, &Selection::none());
//! assert_eq!(conductor.decorations().len(), 1);
//!
//! conductor.update(UpdateFlags::selection(), text, &visible, &Selection::cursor(12));
//! assert!(conductor.decorations().is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::scanner::buffer::TextBuffer;
use crate::scanner::decoration::{DecorationEngine, DecorationSet, Selection, VisibleRange};

// =============================================================================
// Update notification
// =============================================================================

/// What changed since the last notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFlags {
    #[serde(default)]
    pub doc_changed: bool,
    #[serde(default)]
    pub viewport_changed: bool,
    #[serde(default)]
    pub selection_changed: bool,
}

impl UpdateFlags {
    pub fn doc() -> Self {
        Self { doc_changed: true, ..Self::default() }
    }

    pub fn viewport() -> Self {
        Self { viewport_changed: true, ..Self::default() }
    }

    pub fn selection() -> Self {
        Self { selection_changed: true, ..Self::default() }
    }

    pub fn any(&self) -> bool {
        self.doc_changed || self.viewport_changed || self.selection_changed
    }
}

// =============================================================================
// State Machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not bound to a view; no active decorations
    Detached,
    /// Bound; the active set reflects the last notification
    Attached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductorStats {
    pub recomputes: u64,
    /// Notifications with no relevant change
    pub skipped: u64,
}

// =============================================================================
// DecorationConductor
// =============================================================================

#[derive(Debug, Clone)]
pub struct DecorationConductor {
    engine: DecorationEngine,
    state: State,
    active: DecorationSet,
    stats: ConductorStats,
}

impl Default for DecorationConductor {
    fn default() -> Self {
        Self::new(DecorationEngine::default())
    }
}

impl DecorationConductor {
    pub fn new(engine: DecorationEngine) -> Self {
        Self {
            engine,
            state: State::Detached,
            active: DecorationSet::default(),
            stats: ConductorStats::default(),
        }
    }

    /// Bind to a view and compute the initial set.
    pub fn attach<B>(&mut self, buffer: &B, visible: &[VisibleRange], selection: &Selection) -> &DecorationSet
    where
        B: TextBuffer + ?Sized,
    {
        self.state = State::Attached;
        self.recompute(buffer, visible, selection)
    }

    /// Handle a host notification. Auto-attaches if the host skipped `attach`.
    pub fn update<B>(
        &mut self,
        flags: UpdateFlags,
        buffer: &B,
        visible: &[VisibleRange],
        selection: &Selection,
    ) -> &DecorationSet
    where
        B: TextBuffer + ?Sized,
    {
        if self.state == State::Detached {
            return self.attach(buffer, visible, selection);
        }
        if !flags.any() {
            self.stats.skipped += 1;
            return &self.active;
        }
        self.recompute(buffer, visible, selection)
    }

    /// Unbind and drop the active set.
    pub fn detach(&mut self) {
        self.state = State::Detached;
        self.active = DecorationSet::default();
    }

    pub fn is_attached(&self) -> bool {
        self.state == State::Attached
    }

    /// Current state name (for debugging)
    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Detached => "detached",
            State::Attached => "attached",
        }
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.active
    }

    pub fn stats(&self) -> ConductorStats {
        self.stats
    }

    pub fn engine(&self) -> &DecorationEngine {
        &self.engine
    }

    fn recompute<B>(&mut self, buffer: &B, visible: &[VisibleRange], selection: &Selection) -> &DecorationSet
    where
        B: TextBuffer + ?Sized,
    {
        self.active = self.engine.compute(buffer, visible, selection);
        self.stats.recomputes += 1;
        &self.active
    }
}
