// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Evidence for breakends and breakpoints.
//!
//! Evidence is a closed set of kinds: soft clipped reads, the remote view of realigned soft
//! clips, discordant read pairs and assembled contigs. Every kind exposes the same capabilities (locus, breakend sequence and
//! quality, source, mapping quality), kind specific information is reached by pattern matching.

pub mod assembly;
pub mod fastq;
pub mod readpair;
pub mod realignment;
pub mod remote;
pub mod softclip;
pub mod source;

use std::sync::Arc;

use strum_macros::{Display, EnumString};

use crate::errors::{malformed_evidence, Error};
use crate::locus::{BreakendLocus, BreakendSummary};

pub use assembly::{AssemblyAttributes, AssemblyEvidence, AssemblyEvidenceBuilder, AssemblyFilter};
pub use readpair::{MateAlignment, ReadPairEvidence, ReadPairEvidenceBuilder};
pub use realignment::{BreakendAlignment, RealignedEvidenceSource, RealignmentLookup};
pub use remote::RemoteSoftClipEvidence;
pub use softclip::{Realignment, SoftClipEvidence, SoftClipEvidenceBuilder};
pub use source::{InMemoryEvidenceSource, JsonLinesEvidenceSource, ReadEvidenceSource};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SampleCategory {
    Normal,
    Tumour,
}

/// Origin of a piece of evidence. Assemblies and other derived evidence carry no category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, CopyGetters)]
pub struct EvidenceSource {
    #[getset(get = "pub")]
    name: String,
    #[getset(get_copy = "pub")]
    category: Option<SampleCategory>,
}

impl EvidenceSource {
    pub fn new(name: &str, category: Option<SampleCategory>) -> Self {
        EvidenceSource {
            name: name.to_owned(),
            category,
        }
    }

    pub fn normal(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, Some(SampleCategory::Normal)))
    }

    pub fn tumour(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name, Some(SampleCategory::Tumour)))
    }

    pub fn is_tumour(&self) -> bool {
        self.category == Some(SampleCategory::Tumour)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    SoftClip(SoftClipEvidence),
    RemoteSoftClip(RemoteSoftClipEvidence),
    ReadPair(ReadPairEvidence),
    Assembly(AssemblyEvidence),
}

impl Evidence {
    /// Check evidence that bypassed its builder, e.g. when deserialized.
    pub fn validate(&self) -> Result<(), Error> {
        let locus = self.locus();
        let ordered = |breakend: BreakendSummary| breakend.start() <= breakend.end();
        if !ordered(locus.local()) || !locus.remote().map_or(true, ordered) {
            return Err(malformed_evidence(self.id(), "breakend start exceeds its end"));
        }
        match self {
            Evidence::SoftClip(e) => e.validate(),
            Evidence::RemoteSoftClip(e) => e.validate(),
            Evidence::ReadPair(e) => e.validate(),
            Evidence::Assembly(e) => e.validate(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Evidence::SoftClip(e) => e.id(),
            Evidence::RemoteSoftClip(e) => e.id(),
            Evidence::ReadPair(e) => e.id(),
            Evidence::Assembly(e) => e.id(),
        }
    }

    pub fn source(&self) -> &EvidenceSource {
        match self {
            Evidence::SoftClip(e) => e.source(),
            Evidence::RemoteSoftClip(e) => e.source(),
            Evidence::ReadPair(e) => e.source(),
            Evidence::Assembly(e) => e.source(),
        }
    }

    pub fn locus(&self) -> BreakendLocus {
        match self {
            Evidence::SoftClip(e) => e.locus(),
            Evidence::RemoteSoftClip(e) => e.locus(),
            Evidence::ReadPair(e) => e.locus(),
            Evidence::Assembly(e) => *e.locus(),
        }
    }

    pub fn is_breakpoint(&self) -> bool {
        self.locus().is_breakpoint()
    }

    pub fn local_mapq(&self) -> u8 {
        match self {
            Evidence::SoftClip(e) => e.mapq(),
            Evidence::RemoteSoftClip(e) => e.mapq(),
            Evidence::ReadPair(e) => e.mapq(),
            Evidence::Assembly(e) => e.mapq(),
        }
    }

    /// Mapping quality of the remote side, if the evidence has been resolved to a breakpoint.
    pub fn remote_mapq(&self) -> Option<u8> {
        match self {
            Evidence::SoftClip(e) => e.realignment().as_ref().map(|r| r.mapq()),
            Evidence::RemoteSoftClip(e) => Some(e.remote_mapq()),
            Evidence::ReadPair(e) => e.mate().as_ref().map(|m| m.mapq()),
            Evidence::Assembly(e) => e.remote_mapq(),
        }
    }

    /// Bases of the novel side of the breakend.
    pub fn breakend_sequence(&self) -> &[u8] {
        match self {
            Evidence::SoftClip(e) => e.breakend_sequence(),
            Evidence::RemoteSoftClip(e) => e.untemplated(),
            Evidence::ReadPair(e) => e.mate_sequence(),
            Evidence::Assembly(e) => e.breakend_sequence(),
        }
    }

    pub fn breakend_quality(&self) -> &[u8] {
        match self {
            Evidence::SoftClip(e) => e.breakend_quality(),
            Evidence::RemoteSoftClip(_) => &[],
            Evidence::ReadPair(e) => e.mate_qualities(),
            Evidence::Assembly(e) => e.breakend_quality(),
        }
    }
}

impl From<SoftClipEvidence> for Evidence {
    fn from(e: SoftClipEvidence) -> Self {
        Evidence::SoftClip(e)
    }
}

impl From<RemoteSoftClipEvidence> for Evidence {
    fn from(e: RemoteSoftClipEvidence) -> Self {
        Evidence::RemoteSoftClip(e)
    }
}

impl From<ReadPairEvidence> for Evidence {
    fn from(e: ReadPairEvidence) -> Self {
        Evidence::ReadPair(e)
    }
}

impl From<AssemblyEvidence> for Evidence {
    fn from(e: AssemblyEvidence) -> Self {
        Evidence::Assembly(e)
    }
}

/// Shared handle to a piece of evidence. Assemblies refer to their contributing evidence
/// through these handles instead of copying it.
pub type EvidenceRef = Arc<Evidence>;
