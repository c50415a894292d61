// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! FASTQ encoding of breakend sequences for realignment by an external aligner.
//!
//! The read name encodes reference index, start position and evidence id, separated by `#`,
//! so that realigned records can be matched back to their evidence. Records written in
//! evidence order are thereby sorted by their encoded position.

use std::io;

use anyhow::Result;
use bio::io::fastq;

use crate::errors::Error;
use crate::evidence::Evidence;

const SEPARATOR: char = '#';

/// Key of a piece of evidence as encoded into a FASTQ read name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Getters, CopyGetters, new)]
pub struct RealignmentKey {
    #[getset(get_copy = "pub")]
    reference_index: usize,
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get = "pub")]
    evidence_id: String,
}

impl RealignmentKey {
    /// Key of the given evidence. Soft clips are keyed by the start of their alignment, all
    /// other evidence by the start of its local breakend.
    pub fn of(evidence: &Evidence) -> Self {
        let start = match evidence {
            Evidence::SoftClip(sc) => sc.alignment_start(),
            _ => evidence.locus().start(),
        };
        RealignmentKey::new(
            evidence.locus().reference_index(),
            start,
            evidence.id().to_owned(),
        )
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.reference_index,
            self.start,
            self.evidence_id,
            sep = SEPARATOR
        )
    }

    pub fn decode(header: &str) -> Result<Self> {
        let invalid = || Error::InvalidRealignmentHeader {
            header: header.to_owned(),
        };
        // the evidence id may itself contain the separator
        let mut fields = header.splitn(3, SEPARATOR);
        let reference_index = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(invalid)?;
        let start = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(invalid)?;
        let evidence_id = fields.next().ok_or_else(invalid)?;
        Ok(RealignmentKey::new(
            reference_index,
            start,
            evidence_id.to_owned(),
        ))
    }
}

/// FASTQ record of the breakend sequence of the given evidence, `None` if there is no
/// breakend sequence to realign. Missing base qualities are replaced by `fallback_quality`.
pub fn realignment_record(evidence: &Evidence, fallback_quality: u8) -> Option<fastq::Record> {
    let sequence = evidence.breakend_sequence();
    if sequence.is_empty() {
        return None;
    }
    let quality = evidence.breakend_quality();
    let qual: Vec<u8> = if quality.len() == sequence.len() {
        quality.iter().map(|q| q.min(&93) + 33).collect()
    } else {
        vec![fallback_quality.min(93) + 33; sequence.len()]
    };
    Some(fastq::Record::with_attrs(
        &RealignmentKey::of(evidence).encode(),
        None,
        sequence,
        &qual,
    ))
}

/// Write realignment records of all given evidence. Returns the number of written records.
pub fn write_realignment_fastq<'a, I, W>(
    evidence: I,
    writer: &mut fastq::Writer<W>,
    fallback_quality: u8,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a Evidence>,
    W: io::Write,
{
    let mut written = 0;
    for e in evidence {
        if let Some(record) = realignment_record(e, fallback_quality) {
            writer.write_record(&record)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}
