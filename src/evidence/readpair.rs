// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use crate::errors::{malformed_evidence, Error};
use crate::evidence::EvidenceSource;
use crate::locus::{BreakendLocus, BreakendSummary, BreakpointSummary};

/// Alignment of the mate of a discordant pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, CopyGetters, new)]
#[getset(get_copy = "pub")]
pub struct MateAlignment {
    remote: BreakendSummary,
    mapq: u8,
}

/// A discordantly aligned read pair, or a read whose mate is unmapped.
///
/// The local breakend interval covers all positions compatible with the expected fragment size.
/// Mate bases are given in breakend orientation, i.e. already reverse complemented if
/// necessary.
#[derive(Clone, Debug, Serialize, Deserialize, Builder, Getters, CopyGetters)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct ReadPairEvidence {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    id: String,
    #[getset(get = "pub")]
    source: Arc<EvidenceSource>,
    #[getset(get_copy = "pub")]
    local: BreakendSummary,
    #[getset(get_copy = "pub")]
    mapq: u8,
    #[getset(get = "pub")]
    mate_sequence: Vec<u8>,
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    mate_qualities: Vec<u8>,
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    mate: Option<MateAlignment>,
}

fn check_mate(length: usize, quality_length: usize) -> Result<(), String> {
    if quality_length != 0 && quality_length != length {
        return Err("mate base qualities must match mate length".to_owned());
    }
    Ok(())
}

impl ReadPairEvidenceBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(sequence), Some(qualities)) = (&self.mate_sequence, &self.mate_qualities) {
            check_mate(sequence.len(), qualities.len())?;
        }
        Ok(())
    }
}

impl ReadPairEvidence {
    pub fn validate(&self) -> Result<(), Error> {
        check_mate(self.mate_sequence.len(), self.mate_qualities.len())
            .map_err(|msg| malformed_evidence(&self.id, &msg))
    }

    pub fn locus(&self) -> BreakendLocus {
        match self.mate {
            Some(mate) => BreakpointSummary::new(self.local, mate.remote()).into(),
            None => self.local.into(),
        }
    }

    /// Half width of the local breakend interval, used as positional uncertainty of the mate
    /// bases.
    pub fn error_width(&self) -> i64 {
        (self.local.end() - self.local.start()) / 2
    }

    /// Centre of the local breakend interval.
    pub fn centre(&self) -> i64 {
        self.local.start() + self.error_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locus::Direction;

    #[test]
    fn test_directed_pair_is_breakpoint() {
        let rp = ReadPairEvidenceBuilder::default()
            .id("pair1")
            .source(EvidenceSource::tumour("tumour"))
            .local(BreakendSummary::new(0, Direction::Forward, 100, 300))
            .mapq(40)
            .mate_sequence(b"ACGT".to_vec())
            .mate(Some(MateAlignment::new(
                BreakendSummary::new(1, Direction::Backward, 1000, 1200),
                30,
            )))
            .build()
            .unwrap();
        assert!(rp.mate().is_some());
        assert!(rp.locus().is_breakpoint());
        assert_eq!(rp.error_width(), 100);
        assert_eq!(rp.centre(), 200);
    }

    #[test]
    fn test_mismatched_qualities_are_rejected() {
        let result = ReadPairEvidenceBuilder::default()
            .id("pair1")
            .source(EvidenceSource::normal("normal"))
            .local(BreakendSummary::new(0, Direction::Forward, 100, 300))
            .mapq(40)
            .mate_sequence(b"ACGT".to_vec())
            .mate_qualities(vec![30, 30])
            .build();
        assert!(result.is_err());
    }
}
