//! Version gate state machine
//!
//! Groups consecutive aggregate members that share a [`VersionRange`] into
//! runs, so that one guard condition covers each run.
//!
//! ## States
//!
//! ```text
//!                  non-trivial range
//!   NoActiveGate ─────────────────────▶ ActiveGate(range)
//!        ▲                                 │     ▲
//!        │        unbounded range          │     │ different non-trivial range
//!        └─────────────────────────────────┘     │ (close + open)
//!                                                └──────┘
//! ```
//!
//! Members are fed in declaration order. Markers update the tracked range;
//! each member compares the tracked range with the range in effect for the
//! previous member and reports the transition. [`VersionGate::finish`]
//! closes whatever run is still open after the last member.

use crate::version::{RangeUpdate, VersionMarker, VersionRange};
use std::ops::Range;

/// Current state of a [`VersionGate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Members are unconditional
    NoActiveGate,
    /// Members are guarded by the range
    ActiveGate(VersionRange),
}

/// What processing one member did to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Same range as the previous member
    Continue,
    /// A guarded run starts at this member
    Open(VersionRange),
    /// The guarded run ended before this member, which is unconditional
    Close(VersionRange),
    /// The guarded run ended and a differently guarded run starts
    Switch {
        /// Range of the run that was closed
        closed: VersionRange,
        /// Range of the run that was opened
        opened: VersionRange,
    },
}

impl GateTransition {
    /// Range of the run closed by this transition, if any
    pub fn closed(&self) -> Option<VersionRange> {
        match *self {
            GateTransition::Close(range) => Some(range),
            GateTransition::Switch { closed, .. } => Some(closed),
            _ => None,
        }
    }

    /// Range of the run opened by this transition, if any
    pub fn opened(&self) -> Option<VersionRange> {
        match *self {
            GateTransition::Open(range) => Some(range),
            GateTransition::Switch { opened, .. } => Some(opened),
            _ => None,
        }
    }

    /// True if this member starts a new run (guarded or not)
    pub fn starts_run(&self) -> bool {
        !matches!(self, GateTransition::Continue)
    }
}

/// A run of consecutive members sharing one range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedRun {
    /// Range guarding the run (unbounded for unconditional runs)
    pub range: VersionRange,
    /// Member indices covered by the run
    pub members: Range<usize>,
}

/// Version gate state machine
#[derive(Debug, Clone)]
pub struct VersionGate {
    state: GateState,
    tracked: VersionRange,
    in_effect: VersionRange,
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionGate {
    /// Create a gate with no active run
    pub fn new() -> Self {
        VersionGate {
            state: GateState::NoActiveGate,
            tracked: VersionRange::UNBOUNDED,
            in_effect: VersionRange::UNBOUNDED,
        }
    }

    /// Current state
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Range that the next member will be processed under
    pub fn tracked(&self) -> VersionRange {
        self.tracked
    }

    /// Record a newly declared marker
    pub fn declare(&mut self, marker: VersionMarker) -> RangeUpdate {
        self.tracked.apply(marker)
    }

    /// Process the next member under the tracked range
    pub fn member(&mut self) -> GateTransition {
        let range = self.tracked;
        if range == self.in_effect {
            return GateTransition::Continue;
        }
        self.in_effect = range;

        let closed = match self.state {
            GateState::ActiveGate(previous) => Some(previous),
            GateState::NoActiveGate => None,
        };
        let opened = (!range.is_unbounded()).then_some(range);
        self.state = match opened {
            Some(range) => GateState::ActiveGate(range),
            None => GateState::NoActiveGate,
        };

        match (closed, opened) {
            (Some(closed), Some(opened)) => GateTransition::Switch { closed, opened },
            (Some(closed), None) => GateTransition::Close(closed),
            (None, Some(opened)) => GateTransition::Open(opened),
            (None, None) => GateTransition::Continue,
        }
    }

    /// Process the next member under an explicit range
    pub fn advance(&mut self, range: VersionRange) -> GateTransition {
        self.tracked = range;
        self.member()
    }

    /// Close any run still open after the last member
    ///
    /// Returns the range of the closed run. The gate is reset and can be
    /// reused for another member list.
    pub fn finish(&mut self) -> Option<VersionRange> {
        let closed = match self.state {
            GateState::ActiveGate(range) => Some(range),
            GateState::NoActiveGate => None,
        };
        *self = VersionGate::new();
        closed
    }

    /// Partition explicitly ranged members into runs
    ///
    /// Runs cover every member, including unconditional ones, in order.
    pub fn partition<I>(ranges: I) -> Vec<GatedRun>
    where
        I: IntoIterator<Item = VersionRange>,
    {
        let mut gate = VersionGate::new();
        let mut runs: Vec<GatedRun> = Vec::new();

        for (index, range) in ranges.into_iter().enumerate() {
            let transition = gate.advance(range);
            match runs.last_mut() {
                Some(run) if !transition.starts_run() => run.members.end = index + 1,
                _ => runs.push(GatedRun {
                    range,
                    members: index..index + 1,
                }),
            }
        }
        gate.finish();
        runs
    }
}
