// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::ops::Range;
use std::sync::Arc;

use crate::errors::{malformed_evidence, Error};
use crate::evidence::EvidenceSource;
use crate::locus::{BreakendLocus, BreakendSummary, BreakpointSummary, Direction};

/// Alignment of the clipped bases of a soft clip to its remote location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Getters, CopyGetters, new)]
pub struct Realignment {
    #[getset(get_copy = "pub")]
    remote: BreakendSummary,
    #[getset(get_copy = "pub")]
    mapq: u8,
    /// Clipped bases that are neither part of the local nor of the remote alignment.
    #[getset(get = "pub")]
    #[serde(default)]
    untemplated: Vec<u8>,
}

/// The clipped end of a single aligned read.
///
/// The whole read is retained, since the aligned bases anchor the breakend during assembly.
/// Aligned bases are assumed to be gapless unless `reference_end` is given.
#[derive(Clone, Debug, Serialize, Deserialize, Builder, Getters, CopyGetters)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct SoftClipEvidence {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    id: String,
    #[getset(get = "pub")]
    source: Arc<EvidenceSource>,
    #[getset(get_copy = "pub")]
    reference_index: usize,
    #[getset(get_copy = "pub")]
    direction: Direction,
    /// 1-based position of the first aligned base.
    #[getset(get_copy = "pub")]
    alignment_start: i64,
    #[builder(default)]
    #[serde(default)]
    reference_end: Option<i64>,
    #[getset(get_copy = "pub")]
    mapq: u8,
    #[getset(get = "pub")]
    sequence: Vec<u8>,
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    qualities: Vec<u8>,
    #[builder(default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    leading_clip: usize,
    #[builder(default)]
    #[serde(default)]
    #[getset(get_copy = "pub")]
    trailing_clip: usize,
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    realignment: Option<Realignment>,
}

/// Consistency of clip lengths and base qualities with the read length.
fn check_read(
    length: usize,
    quality_length: usize,
    leading_clip: usize,
    trailing_clip: usize,
) -> Result<(), String> {
    let clipped = leading_clip.saturating_add(trailing_clip);
    if clipped > length {
        return Err(format!(
            "clipped bases ({}) exceed read length ({})",
            clipped, length
        ));
    }
    if quality_length != 0 && quality_length != length {
        return Err(format!(
            "{} base qualities given for a read of length {}",
            quality_length, length
        ));
    }
    Ok(())
}

impl SoftClipEvidenceBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref sequence) = self.sequence {
            check_read(
                sequence.len(),
                self.qualities.as_ref().map_or(0, |q| q.len()),
                self.leading_clip.unwrap_or(0),
                self.trailing_clip.unwrap_or(0),
            )?;
        }
        Ok(())
    }
}

impl SoftClipEvidence {
    /// Check evidence that bypassed the builder, e.g. when deserialized.
    pub fn validate(&self) -> Result<(), Error> {
        check_read(
            self.sequence.len(),
            self.qualities.len(),
            self.leading_clip,
            self.trailing_clip,
        )
        .map_err(|msg| malformed_evidence(&self.id, &msg))
    }

    /// Attach the alignment of the clipped bases.
    pub fn with_realignment(mut self, realignment: Realignment) -> Self {
        self.realignment = Some(realignment);
        self
    }

    /// Range of read offsets that are aligned to the reference.
    pub fn aligned_range(&self) -> Range<usize> {
        let end = self.sequence.len().saturating_sub(self.trailing_clip);
        self.leading_clip.min(end)..end
    }

    pub fn alignment_end(&self) -> i64 {
        self.reference_end.unwrap_or_else(|| {
            self.alignment_start + self.aligned_range().len() as i64 - 1
        })
    }

    pub fn clip_length(&self) -> usize {
        match self.direction {
            Direction::Forward => self.trailing_clip,
            Direction::Backward => self.leading_clip,
        }
    }

    pub fn is_realigned(&self) -> bool {
        self.realignment.is_some()
    }

    pub fn breakend(&self) -> BreakendSummary {
        match self.direction {
            Direction::Forward => {
                BreakendSummary::exact(self.reference_index, Direction::Forward, self.alignment_end())
            }
            Direction::Backward => BreakendSummary::exact(
                self.reference_index,
                Direction::Backward,
                self.alignment_start,
            ),
        }
    }

    pub fn locus(&self) -> BreakendLocus {
        match self.realignment {
            Some(ref realignment) => {
                BreakpointSummary::new(self.breakend(), realignment.remote()).into()
            }
            None => self.breakend().into(),
        }
    }

    fn clip_range(&self) -> Range<usize> {
        match self.direction {
            Direction::Forward => {
                self.sequence.len().saturating_sub(self.trailing_clip)..self.sequence.len()
            }
            Direction::Backward => 0..self.leading_clip.min(self.sequence.len()),
        }
    }

    pub fn breakend_sequence(&self) -> &[u8] {
        &self.sequence[self.clip_range()]
    }

    /// Base qualities of the clipped bases, empty if the read carries none.
    pub fn breakend_quality(&self) -> &[u8] {
        self.qualities.get(self.clip_range()).unwrap_or(&[])
    }

    /// Untemplated bases between the local and the remote alignment.
    pub fn untemplated_sequence(&self) -> Option<&[u8]> {
        self.realignment.as_ref().map(|r| r.untemplated().as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn softclip(direction: Direction, leading: usize, trailing: usize) -> SoftClipEvidence {
        SoftClipEvidenceBuilder::default()
            .id("read1")
            .source(EvidenceSource::normal("normal"))
            .reference_index(0)
            .direction(direction)
            .alignment_start(100)
            .mapq(60)
            .sequence(b"AACCGGTTAC".to_vec())
            .leading_clip(leading)
            .trailing_clip(trailing)
            .build()
            .unwrap()
    }

    #[test]
    fn test_forward_softclip() {
        let sc = softclip(Direction::Forward, 0, 4);
        assert_eq!(sc.breakend_sequence(), b"TTAC");
        assert_eq!(sc.alignment_end(), 105);
        assert_eq!(
            sc.locus(),
            BreakendSummary::exact(0, Direction::Forward, 105).into()
        );
    }

    #[test]
    fn test_backward_softclip() {
        let sc = softclip(Direction::Backward, 3, 0);
        assert_eq!(sc.breakend_sequence(), b"AAC");
        assert_eq!(sc.clip_length(), 3);
        assert_eq!(sc.locus().local().start(), 100);
    }

    #[test]
    fn test_invalid_clip_is_rejected() {
        let result = SoftClipEvidenceBuilder::default()
            .id("read1")
            .source(EvidenceSource::normal("normal"))
            .reference_index(0)
            .direction(Direction::Forward)
            .alignment_start(100)
            .mapq(60)
            .sequence(b"ACGT".to_vec())
            .trailing_clip(5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialized_clip_overflow() {
        let mut value = serde_json::to_value(softclip(Direction::Forward, 0, 4)).unwrap();
        value["trailing_clip"] = serde_json::json!(14);
        value["qualities"] = serde_json::json!([30, 30]);
        let sc: SoftClipEvidence = serde_json::from_value(value).unwrap();
        assert!(matches!(
            sc.validate(),
            Err(Error::MalformedEvidence { .. })
        ));
        // accessors stay within the read
        assert_eq!(sc.breakend_sequence(), b"AACCGGTTAC");
        assert!(sc.breakend_quality().is_empty());
        assert!(sc.aligned_range().is_empty());
    }
}
