// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use strum_macros::{Display, EnumString};

use crate::calling::aggregate::{sum_or_max, Combinator, Tally};
use crate::errors::{malformed_evidence, Error};
use crate::evidence::{Evidence, EvidenceRef, EvidenceSource};
use crate::locus::{BreakendLocus, BreakendSummary, BreakpointSummary, Direction};

/// Name of the evidence source of assembled breakends.
pub const ASSEMBLY_SOURCE: &str = "assembly";

lazy_static! {
    static ref ASSEMBLER: Arc<EvidenceSource> = Arc::new(EvidenceSource::new(ASSEMBLY_SOURCE, None));
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssemblyFilter {
    TooFewReads,
    LowWeight,
    TooShort,
}

/// Aggregate statistics over the evidence an assembly was built from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct AssemblyAttributes {
    evidence_count: Tally,
    mapped: Tally,
    mapq_remote_max: Tally,
    mapq_remote_total: Tally,
    length_local_max: Tally,
    length_remote_max: Tally,
    base_count: Tally,
    readpair_count: Tally,
    readpair_length_max: Tally,
    softclip_count: Tally,
    softclip_cliplength_total: Tally,
    softclip_cliplength_max: Tally,
    consensus: Vec<String>,
    program: Vec<String>,
}

fn is_softclip(e: &Evidence) -> i64 {
    matches!(e, Evidence::SoftClip(_) | Evidence::RemoteSoftClip(_)) as i64
}

fn is_readpair(e: &Evidence) -> i64 {
    matches!(e, Evidence::ReadPair(_)) as i64
}

/// Number of bases aligned to the local side. Reads of a pair are assumed to be of equal
/// length, so pairs contribute their mate length.
fn local_length(e: &Evidence) -> i64 {
    match e {
        Evidence::SoftClip(sc) => sc.aligned_range().len() as i64,
        Evidence::RemoteSoftClip(remote) => remote.softclip().clip_length() as i64,
        Evidence::ReadPair(rp) => rp.mate_sequence().len() as i64,
        Evidence::Assembly(asm) => asm.anchor_sequence().len() as i64,
    }
}

impl AssemblyAttributes {
    pub fn from_evidence(supporting: &[EvidenceRef], consensus: &str, program: &str) -> Self {
        let evidence = || supporting.iter().map(|e| e.as_ref());
        let clip_length = |e: &Evidence| match e {
            Evidence::SoftClip(sc) => sc.clip_length() as i64,
            _ => 0,
        };
        let readpair_length = |e: &Evidence| match e {
            Evidence::ReadPair(rp) => rp.mate_sequence().len() as i64,
            _ => 0,
        };
        AssemblyAttributes {
            evidence_count: sum_or_max(evidence(), |_| 1, Combinator::Sum),
            mapped: sum_or_max(evidence(), |e| e.is_breakpoint() as i64, Combinator::Sum),
            mapq_remote_max: sum_or_max(
                evidence(),
                |e| e.remote_mapq().unwrap_or(0) as i64,
                Combinator::Max,
            ),
            mapq_remote_total: sum_or_max(
                evidence(),
                |e| e.remote_mapq().unwrap_or(0) as i64,
                Combinator::Sum,
            ),
            length_local_max: sum_or_max(evidence(), local_length, Combinator::Max),
            length_remote_max: sum_or_max(
                evidence(),
                |e| e.breakend_sequence().len() as i64,
                Combinator::Max,
            ),
            base_count: sum_or_max(
                evidence(),
                |e| e.breakend_sequence().len() as i64,
                Combinator::Sum,
            ),
            readpair_count: sum_or_max(evidence(), is_readpair, Combinator::Sum),
            readpair_length_max: sum_or_max(evidence(), readpair_length, Combinator::Max),
            softclip_count: sum_or_max(evidence(), is_softclip, Combinator::Sum),
            softclip_cliplength_total: sum_or_max(evidence(), clip_length, Combinator::Sum),
            softclip_cliplength_max: sum_or_max(evidence(), clip_length, Combinator::Max),
            consensus: vec![consensus.to_owned()],
            program: vec![program.to_owned()],
        }
    }

    /// Combine the statistics of two assemblies supporting the same call.
    pub fn merge(&self, other: &AssemblyAttributes) -> Self {
        let concat = |a: &[String], b: &[String]| a.iter().chain(b).cloned().collect();
        AssemblyAttributes {
            evidence_count: self.evidence_count.merge(&other.evidence_count, Combinator::Sum),
            mapped: self.mapped.merge(&other.mapped, Combinator::Sum),
            mapq_remote_max: self.mapq_remote_max.merge(&other.mapq_remote_max, Combinator::Max),
            mapq_remote_total: self
                .mapq_remote_total
                .merge(&other.mapq_remote_total, Combinator::Sum),
            length_local_max: self
                .length_local_max
                .merge(&other.length_local_max, Combinator::Max),
            length_remote_max: self
                .length_remote_max
                .merge(&other.length_remote_max, Combinator::Max),
            base_count: self.base_count.merge(&other.base_count, Combinator::Sum),
            readpair_count: self.readpair_count.merge(&other.readpair_count, Combinator::Sum),
            readpair_length_max: self
                .readpair_length_max
                .merge(&other.readpair_length_max, Combinator::Max),
            softclip_count: self.softclip_count.merge(&other.softclip_count, Combinator::Sum),
            softclip_cliplength_total: self
                .softclip_cliplength_total
                .merge(&other.softclip_cliplength_total, Combinator::Sum),
            softclip_cliplength_max: self
                .softclip_cliplength_max
                .merge(&other.softclip_cliplength_max, Combinator::Max),
            consensus: concat(&self.consensus, &other.consensus),
            program: concat(&self.program, &other.program),
        }
    }
}

/// A breakend assembled from soft clips and read pairs.
#[derive(Clone, Debug, Serialize, Deserialize, Builder, Getters, CopyGetters)]
#[builder(pattern = "owned")]
pub struct AssemblyEvidence {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    id: String,
    #[builder(default = "ASSEMBLER.clone()")]
    #[getset(get = "pub")]
    source: Arc<EvidenceSource>,
    #[getset(get = "pub")]
    locus: BreakendLocus,
    /// Consensus bases aligned to the reference.
    #[builder(default)]
    #[getset(get = "pub")]
    anchor_sequence: Vec<u8>,
    /// Consensus bases beyond the anchor. For breakpoints, the untemplated bases.
    #[getset(get = "pub")]
    breakend_sequence: Vec<u8>,
    #[getset(get = "pub")]
    breakend_quality: Vec<u8>,
    #[getset(get_copy = "pub")]
    mapq: u8,
    #[builder(default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    remote_mapq: Option<u8>,
    #[getset(get_copy = "pub")]
    llr: f64,
    #[builder(default)]
    #[getset(get = "pub")]
    attributes: AssemblyAttributes,
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    filters: Vec<AssemblyFilter>,
    #[builder(default)]
    #[getset(get = "pub")]
    evidence_ids: Vec<String>,
    #[builder(default)]
    #[serde(skip)]
    #[getset(get = "pub")]
    supporting: Vec<EvidenceRef>,
}

impl AssemblyEvidence {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.breakend_quality.is_empty()
            && self.breakend_quality.len() != self.breakend_sequence.len()
        {
            return Err(malformed_evidence(
                &self.id,
                "breakend qualities must match the breakend sequence",
            ));
        }
        Ok(())
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn untemplated_sequence(&self) -> Option<&[u8]> {
        if self.locus.is_breakpoint() {
            Some(&self.breakend_sequence)
        } else {
            None
        }
    }

    /// Resolve the breakend into a breakpoint, given the alignment of the breakend sequence.
    ///
    /// The untemplated bases are the ones adjacent to the anchor, their qualities are kept.
    pub fn with_realignment(mut self, remote: BreakendSummary, mapq: u8, untemplated: &[u8]) -> Self {
        let local = self.locus.local();
        let n = untemplated.len().min(self.breakend_sequence.len());
        let qualities = match local.direction() {
            Direction::Forward => self.breakend_quality.get(..n),
            Direction::Backward => self
                .breakend_quality
                .get(self.breakend_quality.len().saturating_sub(n)..),
        };
        self.breakend_quality = qualities.unwrap_or(&[]).to_vec();
        self.breakend_sequence = untemplated.to_vec();
        self.locus = BreakpointSummary::new(local, remote).into();
        self.remote_mapq = Some(mapq);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{ReadPairEvidenceBuilder, SoftClipEvidenceBuilder};

    fn supporting() -> Vec<EvidenceRef> {
        let sc = SoftClipEvidenceBuilder::default()
            .id("sc")
            .source(EvidenceSource::tumour("tumour"))
            .reference_index(0)
            .direction(Direction::Forward)
            .alignment_start(10)
            .mapq(60)
            .sequence(b"ACGTACGT".to_vec())
            .trailing_clip(3)
            .build()
            .unwrap();
        let rp = ReadPairEvidenceBuilder::default()
            .id("rp")
            .source(EvidenceSource::normal("normal"))
            .local(BreakendSummary::new(0, Direction::Forward, 1, 20))
            .mapq(30)
            .mate_sequence(b"ACGTAC".to_vec())
            .build()
            .unwrap();
        vec![Arc::new(sc.into()), Arc::new(rp.into())]
    }

    #[test]
    fn test_attributes() {
        let attributes = AssemblyAttributes::from_evidence(&supporting(), "positional", "test");
        assert_eq!(attributes.evidence_count().values(Combinator::Sum), vec![1, 1]);
        assert_eq!(attributes.softclip_cliplength_max().values(Combinator::Max), vec![0, 3]);
        assert_eq!(attributes.readpair_length_max().values(Combinator::Max), vec![6, 0]);
        assert_eq!(attributes.base_count().values(Combinator::Sum), vec![6, 3]);
    }

    #[test]
    fn test_merge_concatenates_programs() {
        let a = AssemblyAttributes::from_evidence(&supporting(), "positional", "a");
        let b = AssemblyAttributes::from_evidence(&supporting(), "positional", "b");
        let merged = a.merge(&b);
        assert_eq!(merged.program(), &vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(merged.evidence_count().values(Combinator::Sum), vec![2, 2]);
    }

    #[test]
    fn test_realignment() {
        let asm = AssemblyEvidenceBuilder::default()
            .id("asm")
            .locus(BreakendSummary::exact(0, Direction::Forward, 10).into())
            .breakend_sequence(b"ACGTT".to_vec())
            .breakend_quality(vec![10, 20, 30, 40, 50])
            .mapq(60)
            .llr(3.0)
            .build()
            .unwrap();
        assert!(asm.untemplated_sequence().is_none());
        let asm = asm.with_realignment(BreakendSummary::exact(1, Direction::Backward, 500), 40, b"AC");
        assert_eq!(asm.untemplated_sequence(), Some(&b"AC"[..]));
        assert_eq!(asm.breakend_quality(), &vec![10, 20]);
        assert_eq!(asm.remote_mapq(), Some(40));
        assert_eq!(asm.source().category(), None);
    }
}
