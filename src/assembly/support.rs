// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Positional k-mer support of raw evidence.

use std::hash::{Hash, Hasher};
use std::ptr;

use anyhow::Result;
use bv::{BitVec, Bits};

use crate::assembly::kmer::{self, Kmer};
use crate::errors::malformed_evidence;
use crate::evidence::{Evidence, EvidenceRef};
use crate::locus::Direction;
use crate::parameters::AssemblyParameters;

/// Weight of a k-mer given the qualities of the bases it spans. Must be monotone in the base
/// qualities.
pub trait KmerWeighting: Send + Sync {
    fn weight(&self, qualities: &[u8]) -> u32;
}

/// Weight a k-mer by its lowest base quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinBaseQuality;

impl KmerWeighting for MinBaseQuality {
    fn weight(&self, qualities: &[u8]) -> u32 {
        qualities.iter().min().copied().unwrap_or(0) as u32
    }
}

/// The bases of one piece of evidence placed on the reference, decomposed into k-mers.
///
/// Offset `i` covers bases `i..i + k`. Its possible positions are
/// `start + i - error_width ..= start + i + error_width`.
#[derive(Debug, Getters, CopyGetters)]
pub struct KmerEvidence {
    #[getset(get = "pub")]
    evidence: EvidenceRef,
    #[getset(get_copy = "pub")]
    k: usize,
    #[getset(get_copy = "pub")]
    reference_index: usize,
    #[getset(get_copy = "pub")]
    direction: Direction,
    /// Position of the first base.
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get_copy = "pub")]
    error_width: i64,
    kmers: Vec<Option<Kmer>>,
    weights: Vec<u32>,
    anchored: BitVec<u8>,
}

impl KmerEvidence {
    /// Decompose the given evidence. Assemblies and remote soft clips do not take part in
    /// assembly, hence `Ok(None)`. Malformed evidence, evidence that is too short or without
    /// breakend sequence yields an error.
    pub fn from_evidence(
        evidence: EvidenceRef,
        parameters: &AssemblyParameters,
        weighting: &dyn KmerWeighting,
    ) -> Result<Option<Self>> {
        if let Evidence::Assembly(_) | Evidence::RemoteSoftClip(_) = evidence.as_ref() {
            return Ok(None);
        }
        evidence.validate()?;
        let k = parameters.k();
        let id = evidence.id();
        if evidence.breakend_sequence().is_empty() {
            return Err(malformed_evidence(id, "empty breakend sequence").into());
        }

        let (bases, qualities, start, error_width, anchored_range) = match evidence.as_ref() {
            Evidence::SoftClip(sc) => {
                let aligned = sc.aligned_range();
                match sc.direction() {
                    Direction::Forward => {
                        // the other end of the read is not part of this breakend
                        let bases = &sc.sequence()[aligned.start..];
                        (
                            bases,
                            slice_or_empty(sc.qualities(), aligned.start..sc.sequence().len()),
                            sc.alignment_start(),
                            0,
                            0..aligned.len(),
                        )
                    }
                    Direction::Backward => {
                        let bases = &sc.sequence()[..aligned.end];
                        (
                            bases,
                            slice_or_empty(sc.qualities(), 0..aligned.end),
                            sc.alignment_start() - aligned.start as i64,
                            0,
                            aligned.start..aligned.end,
                        )
                    }
                }
            }
            Evidence::ReadPair(rp) => {
                let bases = rp.mate_sequence().as_slice();
                let start = match rp.local().direction() {
                    Direction::Forward => rp.centre() + 1,
                    Direction::Backward => rp.centre() - bases.len() as i64,
                };
                (
                    bases,
                    rp.mate_qualities().as_slice(),
                    start,
                    rp.error_width(),
                    0..0,
                )
            }
            Evidence::Assembly(_) | Evidence::RemoteSoftClip(_) => return Ok(None),
        };

        if bases.len() < k {
            return Err(malformed_evidence(
                id,
                &format!("sequence of {} bases is shorter than k = {}", bases.len(), k),
            )
            .into());
        }

        let fallback = [parameters.fallback_base_quality()];
        let n = bases.len() - k + 1;
        let mut kmers = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);
        let mut anchored: BitVec<u8> = BitVec::with_capacity(n as u64);
        for (offset, kmer) in kmer::kmers(bases, k).enumerate() {
            kmers.push(kmer);
            weights.push(if qualities.len() == bases.len() {
                weighting.weight(&qualities[offset..offset + k])
            } else {
                weighting.weight(&fallback)
            });
            anchored.push(offset < anchored_range.end && anchored_range.start < offset + k);
        }

        let (reference_index, direction) = {
            let local = evidence.locus().local();
            (local.reference_index(), local.direction())
        };

        Ok(Some(KmerEvidence {
            evidence,
            k,
            reference_index,
            direction,
            start,
            error_width,
            kmers,
            weights,
            anchored,
        }))
    }

    pub fn id(&self) -> &str {
        self.evidence.id()
    }

    /// Number of k-mer offsets, including those skipped due to ambiguous bases.
    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Closed range of all positions any k-mer of this evidence can take.
    pub fn extent(&self) -> (i64, i64) {
        (
            self.start - self.error_width,
            self.start + self.error_width + self.kmers.len() as i64 - 1,
        )
    }

    /// Support nodes of all valid offsets. The iterator is lazy and can be recreated any time.
    pub fn support_nodes(&self) -> impl Iterator<Item = KmerSupportNode<'_>> + '_ {
        self.kmers
            .iter()
            .enumerate()
            .filter(|(_, kmer)| kmer.is_some())
            .map(move |(offset, _)| KmerSupportNode {
                evidence: self,
                offset,
            })
    }
}

fn slice_or_empty(qualities: &[u8], range: std::ops::Range<usize>) -> &[u8] {
    qualities.get(range).unwrap_or(&[])
}

/// Contribution of one k-mer of one piece of evidence. Identity is given by the evidence and
/// the offset, not by the k-mer.
#[derive(Debug, Clone, Copy)]
pub struct KmerSupportNode<'a> {
    evidence: &'a KmerEvidence,
    offset: usize,
}

impl<'a> KmerSupportNode<'a> {
    pub fn evidence(&self) -> &'a KmerEvidence {
        self.evidence
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kmer(&self) -> Kmer {
        // support nodes are only created for valid k-mers
        self.evidence.kmers[self.offset].unwrap_or_default()
    }

    pub fn start(&self) -> i64 {
        self.evidence.start + self.offset as i64 - self.evidence.error_width
    }

    pub fn end(&self) -> i64 {
        self.evidence.start + self.offset as i64 + self.evidence.error_width
    }

    pub fn weight(&self) -> u32 {
        self.evidence.weights[self.offset]
    }

    pub fn is_reference(&self) -> bool {
        self.evidence.anchored.get_bit(self.offset as u64)
    }
}

impl<'a> PartialEq for KmerSupportNode<'a> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.evidence, other.evidence) && self.offset == other.offset
    }
}

impl<'a> Eq for KmerSupportNode<'a> {}

impl<'a> Hash for KmerSupportNode<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.evidence, state);
        self.offset.hash(state);
    }
}
