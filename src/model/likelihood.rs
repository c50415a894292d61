// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use crate::evidence::{Evidence, SoftClipEvidence};
use crate::model::{phred_to_llr, LikelihoodScorer};
use crate::parameters::CallingParameters;

/// Scores evidence by the mapping qualities of its alignments.
///
/// Each aligned side contributes the log-likelihood ratio of a correct versus an incorrect
/// mapping. Soft clips shorter than `full_weight_clip_length` are down-weighted linearly.
/// Assemblies carry the score computed by the assembler.
#[derive(Debug, Clone, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PhredLikelihoodScorer {
    max_mapq: u8,
    full_weight_clip_length: usize,
}

impl PhredLikelihoodScorer {
    pub fn new(parameters: &CallingParameters) -> Self {
        PhredLikelihoodScorer {
            max_mapq: parameters.max_mapq(),
            full_weight_clip_length: parameters.full_weight_clip_length().max(1),
        }
    }

    fn mapq_llr(&self, mapq: u8) -> f64 {
        phred_to_llr(mapq.min(self.max_mapq) as f64)
    }

    fn softclip_llr(&self, sc: &SoftClipEvidence) -> f64 {
        let scale = (sc.clip_length() as f64 / self.full_weight_clip_length as f64).min(1.0);
        let remote = sc
            .realignment()
            .as_ref()
            .map_or(0.0, |r| self.mapq_llr(r.mapq()));
        self.mapq_llr(sc.mapq()) * scale + remote
    }
}

impl Default for PhredLikelihoodScorer {
    fn default() -> Self {
        Self::new(&CallingParameters::default())
    }
}

impl LikelihoodScorer for PhredLikelihoodScorer {
    fn llr(&self, evidence: &Evidence) -> f64 {
        match evidence {
            Evidence::SoftClip(sc) => self.softclip_llr(sc),
            // both sides of the same read, hence the same score
            Evidence::RemoteSoftClip(remote) => self.softclip_llr(remote.softclip()),
            Evidence::ReadPair(rp) => {
                self.mapq_llr(rp.mapq()) + rp.mate().map_or(0.0, |m| self.mapq_llr(m.mapq()))
            }
            Evidence::Assembly(asm) => asm.llr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{
        EvidenceSource, MateAlignment, ReadPairEvidenceBuilder, Realignment,
        RemoteSoftClipEvidence, SoftClipEvidenceBuilder,
    };
    use crate::locus::{BreakendSummary, Direction};

    #[test]
    fn test_short_softclips_are_downweighted() {
        let scorer = PhredLikelihoodScorer::default();
        let softclip = |trailing: usize| -> Evidence {
            SoftClipEvidenceBuilder::default()
                .id("sc")
                .source(EvidenceSource::normal("normal"))
                .reference_index(0)
                .direction(Direction::Forward)
                .alignment_start(1)
                .mapq(60)
                .sequence(vec![b'A'; 60])
                .trailing_clip(trailing)
                .build()
                .unwrap()
                .into()
        };
        let full = scorer.llr(&softclip(30));
        assert_relative_eq!(scorer.llr(&softclip(25)), full);
        assert_relative_eq!(scorer.llr(&softclip(5)), full / 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_remote_softclip_scores_like_local_side() {
        let scorer = PhredLikelihoodScorer::default();
        let sc = SoftClipEvidenceBuilder::default()
            .id("sc")
            .source(EvidenceSource::normal("normal"))
            .reference_index(0)
            .direction(Direction::Forward)
            .alignment_start(1)
            .mapq(60)
            .sequence(vec![b'A'; 40])
            .trailing_clip(10)
            .realignment(Some(Realignment::new(
                BreakendSummary::exact(1, Direction::Backward, 300),
                30,
                Vec::new(),
            )))
            .build()
            .unwrap();
        let remote = RemoteSoftClipEvidence::from_softclip(&sc).unwrap();
        assert_relative_eq!(scorer.llr(&remote.into()), scorer.llr(&sc.into()));
    }

    #[test]
    fn test_readpair_adds_remote_side() {
        let scorer = PhredLikelihoodScorer::default();
        let builder = || {
            ReadPairEvidenceBuilder::default()
                .id("rp")
                .source(EvidenceSource::normal("normal"))
                .local(BreakendSummary::new(0, Direction::Forward, 1, 100))
                .mapq(20)
                .mate_sequence(b"ACGT".to_vec())
        };
        let oea: Evidence = builder().build().unwrap().into();
        let dp: Evidence = builder()
            .mate(Some(MateAlignment::new(
                BreakendSummary::new(1, Direction::Backward, 1, 100),
                20,
            )))
            .build()
            .unwrap()
            .into();
        assert_relative_eq!(scorer.llr(&dp), 2.0 * scorer.llr(&oea), epsilon = 1e-9);
        assert_relative_eq!(scorer.llr(&oea), phred_to_llr(20.0), epsilon = 1e-9);
    }
}
