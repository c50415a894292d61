// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use bio::alphabets::dna;

use crate::errors::Error;
use crate::evidence::{EvidenceSource, SoftClipEvidence};
use crate::locus::{BreakendLocus, BreakpointSummary};

/// Prefix distinguishing the remote view of a soft clip from the soft clip itself.
pub const REMOTE_ID_PREFIX: &str = "R";

/// A realigned soft clip seen from the alignment of its clipped bases.
///
/// The breakpoint sides are swapped, so the evidence supports calls at the remote breakend.
/// Untemplated bases are given in remote breakend orientation.
#[derive(Clone, Debug, Serialize, Deserialize, Getters, CopyGetters)]
pub struct RemoteSoftClipEvidence {
    #[getset(get = "pub")]
    id: String,
    #[getset(get = "pub")]
    softclip: SoftClipEvidence,
    #[getset(get_copy = "pub")]
    breakpoint: BreakpointSummary,
    #[getset(get = "pub")]
    untemplated: Vec<u8>,
}

impl RemoteSoftClipEvidence {
    /// The remote view of the given soft clip, if its clipped bases have been realigned.
    pub fn from_softclip(softclip: &SoftClipEvidence) -> Option<Self> {
        let realignment = softclip.realignment().as_ref()?;
        let breakpoint =
            BreakpointSummary::new(softclip.breakend(), realignment.remote()).remote_breakpoint();
        let untemplated = if breakpoint.local().direction() == breakpoint.remote().direction() {
            dna::revcomp(realignment.untemplated())
        } else {
            realignment.untemplated().clone()
        };
        Some(RemoteSoftClipEvidence {
            id: format!("{}{}", REMOTE_ID_PREFIX, softclip.id()),
            softclip: softclip.clone(),
            breakpoint,
            untemplated,
        })
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.softclip.validate()
    }

    pub fn source(&self) -> &Arc<EvidenceSource> {
        self.softclip.source()
    }

    pub fn locus(&self) -> BreakendLocus {
        self.breakpoint.into()
    }

    /// Mapping quality of the clipped bases, which are aligned locally from this side.
    pub fn mapq(&self) -> u8 {
        self.softclip
            .realignment()
            .as_ref()
            .map_or(0, |r| r.mapq())
    }

    pub fn remote_mapq(&self) -> u8 {
        self.softclip.mapq()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{Realignment, SoftClipEvidenceBuilder};
    use crate::locus::{BreakendSummary, Direction};

    fn softclip(remote_direction: Direction) -> SoftClipEvidence {
        SoftClipEvidenceBuilder::default()
            .id("read1")
            .source(EvidenceSource::tumour("tumour"))
            .reference_index(0)
            .direction(Direction::Forward)
            .alignment_start(100)
            .mapq(50)
            .sequence(b"ACGTACGTAACCGG".to_vec())
            .trailing_clip(6)
            .realignment(Some(Realignment::new(
                BreakendSummary::exact(1, remote_direction, 500),
                20,
                b"AAC".to_vec(),
            )))
            .build()
            .unwrap()
    }

    #[test]
    fn test_sides_are_swapped() {
        let remote = RemoteSoftClipEvidence::from_softclip(&softclip(Direction::Backward)).unwrap();
        assert_eq!(remote.id(), "Rread1");
        assert_eq!(remote.locus().local(), BreakendSummary::exact(1, Direction::Backward, 500));
        assert_eq!(remote.locus().remote(), Some(BreakendSummary::exact(0, Direction::Forward, 107)));
        assert_eq!(remote.untemplated(), b"AAC");
        assert_eq!(remote.mapq(), 20);
        assert_eq!(remote.remote_mapq(), 50);
        assert!(remote.source().is_tumour());
    }

    #[test]
    fn test_inversion_untemplated_is_reverse_complemented() {
        let remote = RemoteSoftClipEvidence::from_softclip(&softclip(Direction::Forward)).unwrap();
        assert_eq!(remote.untemplated(), b"GTT");
    }

    #[test]
    fn test_unrealigned_has_no_remote_view() {
        let sc = SoftClipEvidenceBuilder::default()
            .id("read2")
            .source(EvidenceSource::normal("normal"))
            .reference_index(0)
            .direction(Direction::Backward)
            .alignment_start(100)
            .mapq(50)
            .sequence(b"ACGTACGT".to_vec())
            .leading_clip(3)
            .build()
            .unwrap();
        assert!(RemoteSoftClipEvidence::from_softclip(&sc).is_none());
    }
}
