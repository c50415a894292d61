// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use breakend_caller::evidence::{
    Evidence, EvidenceRef, EvidenceSource, ReadPairEvidenceBuilder, SoftClipEvidenceBuilder,
};
use breakend_caller::locus::{BreakendSummary, Direction};
use breakend_caller::reference::SequenceDictionary;

/// A forward soft clip with `aligned` aligned bases starting at `position`, the rest clipped.
pub(crate) fn softclip(
    id: &str,
    reference_index: usize,
    position: i64,
    sequence: &str,
    aligned: usize,
) -> Evidence {
    SoftClipEvidenceBuilder::default()
        .id(id)
        .source(EvidenceSource::normal("normal"))
        .reference_index(reference_index)
        .direction(Direction::Forward)
        .alignment_start(position)
        .mapq(60)
        .sequence(sequence.as_bytes().to_vec())
        .trailing_clip(sequence.len() - aligned)
        .build()
        .unwrap()
        .into()
}

/// A read aligned at `position` whose mate is unmapped.
pub(crate) fn one_end_anchored(
    id: &str,
    position: i64,
    mate_sequence: &str,
    max_fragment_size: i64,
) -> Evidence {
    let length = mate_sequence.len() as i64;
    ReadPairEvidenceBuilder::default()
        .id(id)
        .source(EvidenceSource::normal("normal"))
        .local(BreakendSummary::new(
            0,
            Direction::Forward,
            position + length - 1,
            position + max_fragment_size,
        ))
        .mapq(60)
        .mate_sequence(mate_sequence.as_bytes().to_vec())
        .build()
        .unwrap()
        .into()
}

pub(crate) fn shared(evidence: Vec<Evidence>) -> Vec<EvidenceRef> {
    evidence.into_iter().map(Arc::new).collect()
}

pub(crate) fn dictionary(n: usize) -> SequenceDictionary {
    SequenceDictionary::new((0..n).map(|i| (format!("chr{}", i + 1), 10_000)))
}

pub(crate) const READ_99: &str = "AATTAATCGCAAGAGCGGGTTGTATTCGACGCCAAGTCAGCTGAAGCACCATTACCCGATCAAAACATATCAGAAATGATTGACGTATCACAAGCCGGA";
pub(crate) const READ_100: &str = "AATTAATCGCAAGAGCGGGTTGTATTCGACGCCAAGTCAGCTGAAGCACCATTACCCGATCAAAACATATCAGAAATGATTGACGTATCACAAGCCGGAT";
pub(crate) const MUTATED_99: &str = "AATTAATCGCAAtAGCGGGAAGTATTCGACGCCCAGTCAGCTGGAGCACCATTACcCGATCAAtACATATCAGAtATGATTGACGTcTCACAAGCgGGA";
pub(crate) const MUTATED_100: &str = "AATTAATCGCAAtAGCGGGAAGTATTCGACGCCCAGTCAGCTGGAGCACCATTACcCGATCAAtACATATCAGAtATGATTGACGTcTCACAAGCgGGAT";
