// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Breakend and breakpoint loci.
//!
//! A breakend is an interval of possible positions on one reference sequence together with an
//! orientation. `Forward` means that the reference is retained up to (and including) the
//! breakend position and the novel sequence follows to the right, `Backward` means that the
//! novel sequence lies to the left of the breakend position.
//! All coordinates are 1-based and inclusive.

use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Single character code as used in call identifiers.
    pub fn as_char(self) -> char {
        match self {
            Direction::Forward => 'f',
            Direction::Backward => 'b',
        }
    }
}

/// A single-sided breakend with positional uncertainty.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, CopyGetters,
)]
#[getset(get_copy = "pub")]
pub struct BreakendSummary {
    reference_index: usize,
    direction: Direction,
    start: i64,
    end: i64,
}

impl BreakendSummary {
    pub fn new(reference_index: usize, direction: Direction, start: i64, end: i64) -> Self {
        assert!(
            start <= end,
            "bug: breakend start {} must not be greater than end {}",
            start,
            end
        );
        BreakendSummary {
            reference_index,
            direction,
            start,
            end,
        }
    }

    /// Exact breakend without positional uncertainty.
    pub fn exact(reference_index: usize, direction: Direction, position: i64) -> Self {
        Self::new(reference_index, direction, position, position)
    }

    pub fn overlaps(&self, other: &BreakendSummary) -> bool {
        self.reference_index == other.reference_index
            && self.direction == other.direction
            && self.start <= other.end
            && other.start <= self.end
    }

    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn is_exact(&self) -> bool {
        self.start == self.end
    }

    /// Smallest breakend containing both intervals. Both sides must be on the same reference
    /// sequence and share the direction.
    pub fn union(&self, other: &BreakendSummary) -> BreakendSummary {
        assert_eq!(self.reference_index, other.reference_index);
        assert_eq!(self.direction, other.direction);
        BreakendSummary::new(
            self.reference_index,
            self.direction,
            self.start.min(other.start),
            self.end.max(other.end),
        )
    }

    /// Restrict the breakend to the given closed position range.
    pub fn clamp(&self, min: i64, max: i64) -> BreakendSummary {
        let start = self.start.max(min).min(max);
        let end = self.end.min(max).max(start);
        BreakendSummary::new(self.reference_index, self.direction, start, end)
    }
}

impl fmt::Display for BreakendSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.reference_index, self.start)?;
        if self.start != self.end {
            write!(f, "-{}", self.end)?;
        }
        write!(f, "{}", self.direction.as_char())
    }
}

/// A two-sided breakpoint: the local breakend joined to the remote breakend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct BreakpointSummary {
    local: BreakendSummary,
    remote: BreakendSummary,
}

impl BreakpointSummary {
    pub fn new(local: BreakendSummary, remote: BreakendSummary) -> Self {
        BreakpointSummary { local, remote }
    }

    pub fn overlaps(&self, other: &BreakpointSummary) -> bool {
        self.local.overlaps(&other.local) && self.remote.overlaps(&other.remote)
    }

    /// The same breakpoint seen from the remote side.
    pub fn remote_breakpoint(&self) -> BreakpointSummary {
        BreakpointSummary::new(self.remote, self.local)
    }
}

impl fmt::Display for BreakpointSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.local, self.remote)
    }
}

/// Locus of a piece of evidence or a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakendLocus {
    Breakend(BreakendSummary),
    Breakpoint(BreakpointSummary),
}

impl BreakendLocus {
    pub fn local(&self) -> BreakendSummary {
        match self {
            BreakendLocus::Breakend(breakend) => *breakend,
            BreakendLocus::Breakpoint(breakpoint) => breakpoint.local(),
        }
    }

    pub fn remote(&self) -> Option<BreakendSummary> {
        match self {
            BreakendLocus::Breakend(_) => None,
            BreakendLocus::Breakpoint(breakpoint) => Some(breakpoint.remote()),
        }
    }

    pub fn is_breakpoint(&self) -> bool {
        matches!(self, BreakendLocus::Breakpoint(_))
    }

    pub fn reference_index(&self) -> usize {
        self.local().reference_index()
    }

    pub fn direction(&self) -> Direction {
        self.local().direction()
    }

    pub fn start(&self) -> i64 {
        self.local().start()
    }

    /// Overlap between loci. A breakend is compared against the local side of a breakpoint,
    /// two breakpoints must overlap on both sides.
    pub fn overlaps(&self, other: &BreakendLocus) -> bool {
        match (self, other) {
            (BreakendLocus::Breakpoint(a), BreakendLocus::Breakpoint(b)) => a.overlaps(b),
            _ => self.local().overlaps(&other.local()),
        }
    }
}

impl From<BreakendSummary> for BreakendLocus {
    fn from(breakend: BreakendSummary) -> Self {
        BreakendLocus::Breakend(breakend)
    }
}

impl From<BreakpointSummary> for BreakendLocus {
    fn from(breakpoint: BreakpointSummary) -> Self {
        BreakendLocus::Breakpoint(breakpoint)
    }
}

impl fmt::Display for BreakendLocus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BreakendLocus::Breakend(breakend) => breakend.fmt(f),
            BreakendLocus::Breakpoint(breakpoint) => breakpoint.fmt(f),
        }
    }
}

/// Genomic output order: reference index, then local start, then local end, with breakends
/// sorted before breakpoints at the same position.
pub fn by_genomic_position(a: &BreakendLocus, b: &BreakendLocus) -> Ordering {
    let (la, lb) = (a.local(), b.local());
    la.reference_index()
        .cmp(&lb.reference_index())
        .then(la.start().cmp(&lb.start()))
        .then(la.end().cmp(&lb.end()))
        .then(la.direction().cmp(&lb.direction()))
        .then(a.is_breakpoint().cmp(&b.is_breakpoint()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fwd(start: i64, end: i64) -> BreakendSummary {
        BreakendSummary::new(0, Direction::Forward, start, end)
    }

    #[test]
    fn test_breakend_overlap() {
        assert!(fwd(10, 20).overlaps(&fwd(20, 30)));
        assert!(!fwd(10, 20).overlaps(&fwd(21, 30)));
        assert!(!fwd(10, 20).overlaps(&BreakendSummary::new(0, Direction::Backward, 10, 20)));
        assert!(!fwd(10, 20).overlaps(&BreakendSummary::new(1, Direction::Forward, 10, 20)));
    }

    #[test]
    fn test_overlap_is_reflexive() {
        let breakend = BreakendLocus::from(fwd(5, 5));
        let breakpoint = BreakendLocus::from(BreakpointSummary::new(
            fwd(5, 7),
            BreakendSummary::exact(2, Direction::Backward, 100),
        ));
        assert!(breakend.overlaps(&breakend));
        assert!(breakpoint.overlaps(&breakpoint));
    }

    #[test]
    fn test_breakpoint_overlap_requires_both_sides() {
        let a = BreakpointSummary::new(fwd(5, 7), BreakendSummary::exact(2, Direction::Backward, 100));
        let b = BreakpointSummary::new(fwd(6, 6), BreakendSummary::exact(2, Direction::Backward, 200));
        assert!(!BreakendLocus::from(a).overlaps(&BreakendLocus::from(b)));
        // a breakend only needs to overlap the local side
        assert!(BreakendLocus::from(fwd(6, 6)).overlaps(&BreakendLocus::from(b)));
    }

    #[test]
    fn test_display() {
        assert_eq!(fwd(10, 10).to_string(), "0:10f");
        assert_eq!(
            BreakendSummary::new(3, Direction::Backward, 1, 4).to_string(),
            "3:1-4b"
        );
    }

    #[test]
    fn test_union_and_clamp() {
        assert_eq!(fwd(10, 12).union(&fwd(5, 6)), fwd(5, 12));
        assert_eq!(fwd(-5, 3).clamp(1, 100), fwd(1, 3));
        assert_eq!(fwd(90, 120).clamp(1, 100), fwd(90, 100));
    }
}
