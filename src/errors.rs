// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use bio_types::genome::Locus;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("sanity check failure: evidence {evidence} at {locus} does not provide support for call at {call}")]
    EvidenceDoesNotSupportCall {
        evidence: String,
        locus: String,
        call: String,
    },
    #[error("assembly of {region} abandoned: subgraph width {width} exceeds the limit of {limit} bases")]
    AssemblySubgraphTooWide {
        region: String,
        width: i64,
        limit: i64,
    },
    #[error("assembly of {region} abandoned: graph contains {nodes} nodes, the limit is {limit}")]
    AssemblyGraphTooLarge {
        region: String,
        nodes: usize,
        limit: usize,
    },
    #[error("malformed evidence {id}: {msg}")]
    MalformedEvidence { id: String, msg: String },
    #[error("the evidence input is not sorted: {previous_locus:?} > {current_locus:?}")]
    UnsortedEvidence {
        previous_locus: Locus,
        current_locus: Locus,
    },
    #[error("evidence {id} refers to partition {found} but was read from partition {expected}")]
    EvidenceInWrongPartition {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("reference sequence index {index} is not defined in the sequence dictionary")]
    UnknownReferenceIndex { index: usize },
    #[error("invalid k-mer size {k}: must be between 2 and 32")]
    InvalidKmerSize { k: usize },
    #[error("invalid parameters: {msg}")]
    InvalidParameters { msg: String },
    #[error("invalid realignment FASTQ header {header}: expected REFINDEX#START#ID")]
    InvalidRealignmentHeader { header: String },
    #[error("unable to compute somatic p-value for normal {normal_support}/{normal_total} and tumour {tumour_support}/{tumour_total}")]
    SomaticModelFailure {
        normal_support: u64,
        normal_total: u64,
        tumour_support: u64,
        tumour_total: u64,
    },
}

pub(crate) fn malformed_evidence(id: &str, msg: &str) -> Error {
    Error::MalformedEvidence {
        id: id.to_owned(),
        msg: msg.to_owned(),
    }
}
