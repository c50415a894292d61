// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading back breakend sequences realigned by an external aligner.
//!
//! Records are matched to their evidence by the read name written with the realignment FASTQ.
//! The reference sequences of the alignment header must be in the same order as the sequence
//! dictionary of the caller.

use std::collections::HashMap;
use std::path::Path;
use std::str;

use anyhow::{Context, Result};
use rust_htslib::bam;
use rust_htslib::bam::Read;

use crate::evidence::fastq::RealignmentKey;
use crate::evidence::source::EvidenceIter;
use crate::evidence::{Evidence, ReadEvidenceSource, Realignment};
use crate::locus::{BreakendSummary, Direction};

/// Primary alignment of a breakend sequence. Coordinates are 1-based and inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CopyGetters, new)]
#[getset(get_copy = "pub")]
pub struct BreakendAlignment {
    reference_index: usize,
    start: i64,
    end: i64,
    reverse: bool,
    leading_clip: usize,
    trailing_clip: usize,
    mapq: u8,
}

impl BreakendAlignment {
    /// Remote breakend of a breakend sequence with the given local direction, together with
    /// the number of untemplated bases adjacent to the local breakend.
    ///
    /// Breakend sequences are written in reference orientation of the local breakend, hence
    /// the base next to the breakpoint is the first base for forward and the last base for
    /// backward breakends.
    pub fn remote_breakend(&self, local: Direction) -> (BreakendSummary, usize) {
        if (local == Direction::Forward) != self.reverse {
            (
                BreakendSummary::exact(self.reference_index, Direction::Backward, self.start),
                self.leading_clip,
            )
        } else {
            (
                BreakendSummary::exact(self.reference_index, Direction::Forward, self.end),
                self.trailing_clip,
            )
        }
    }
}

/// The `n` bases of a breakend sequence that are adjacent to its breakend.
fn adjacent_bases(sequence: &[u8], local: Direction, n: usize) -> &[u8] {
    let n = n.min(sequence.len());
    match local {
        Direction::Forward => &sequence[..n],
        Direction::Backward => &sequence[sequence.len() - n..],
    }
}

/// Realignments of breakend sequences, by the key of their evidence.
#[derive(Debug, Clone, Default)]
pub struct RealignmentLookup {
    alignments: HashMap<RealignmentKey, BreakendAlignment>,
}

impl RealignmentLookup {
    /// Read the primary alignments of a SAM, BAM or CRAM file. Unmapped, secondary and
    /// supplementary records are ignored.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = bam::Reader::from_path(path)
            .with_context(|| format!("unable to open realigned records {}", path.display()))?;
        let mut lookup = RealignmentLookup::default();
        for record in reader.records() {
            let record = record?;
            if record.is_unmapped()
                || record.is_secondary()
                || record.is_supplementary()
                || record.tid() < 0
            {
                continue;
            }
            let key = RealignmentKey::decode(str::from_utf8(record.qname())?)?;
            let cigar = record.cigar();
            let alignment = BreakendAlignment::new(
                record.tid() as usize,
                record.pos() + 1,
                cigar.end_pos(),
                record.is_reverse(),
                cigar.leading_softclips() as usize,
                cigar.trailing_softclips() as usize,
                record.mapq(),
            );
            lookup.insert(key, alignment);
        }
        debug!("read {} realigned breakend sequences", lookup.len());
        Ok(lookup)
    }

    /// Add an alignment. The first alignment of a key is kept.
    pub fn insert(&mut self, key: RealignmentKey, alignment: BreakendAlignment) {
        self.alignments.entry(key).or_insert(alignment);
    }

    pub fn get(&self, key: &RealignmentKey) -> Option<&BreakendAlignment> {
        self.alignments.get(key)
    }

    pub fn len(&self) -> usize {
        self.alignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }

    /// Resolve single-sided soft clips and assemblies into breakpoints using their
    /// realignment. Other evidence, and evidence without realignment, is returned unchanged.
    pub fn realign(&self, evidence: Evidence) -> Evidence {
        let alignment = match self.get(&RealignmentKey::of(&evidence)) {
            Some(alignment) => *alignment,
            None => return evidence,
        };
        let local = evidence.locus().direction();
        let (remote, n) = alignment.remote_breakend(local);
        match evidence {
            Evidence::SoftClip(sc) if !sc.is_realigned() => {
                let untemplated = adjacent_bases(sc.breakend_sequence(), local, n).to_vec();
                sc.with_realignment(Realignment::new(remote, alignment.mapq(), untemplated))
                    .into()
            }
            Evidence::Assembly(asm) if !asm.locus().is_breakpoint() => {
                let untemplated = adjacent_bases(asm.breakend_sequence(), local, n).to_vec();
                asm.with_realignment(remote, alignment.mapq(), &untemplated)
                    .into()
            }
            other => other,
        }
    }
}

/// Evidence of another source, resolved with the given realignments.
#[derive(new)]
pub struct RealignedEvidenceSource<'a> {
    source: &'a dyn ReadEvidenceSource,
    realignments: &'a RealignmentLookup,
}

impl<'a> ReadEvidenceSource for RealignedEvidenceSource<'a> {
    fn partition_count(&self) -> usize {
        self.source.partition_count()
    }

    fn partition(&self, index: usize) -> Result<EvidenceIter<'_>> {
        let realignments = self.realignments;
        Ok(Box::new(
            self.source
                .partition(index)?
                .map(move |evidence| evidence.map(|e| realignments.realign(e))),
        ))
    }

    fn all(&self) -> Result<EvidenceIter<'_>> {
        let realignments = self.realignments;
        Ok(Box::new(
            self.source
                .all()?
                .map(move |evidence| evidence.map(|e| realignments.realign(e))),
        ))
    }
}
