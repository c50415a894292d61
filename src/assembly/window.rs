// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use itertools::Itertools;

use crate::assembly::support::KmerEvidence;
use crate::locus::Direction;

/// Evidence of one reference sequence and direction whose k-mer positions chain-overlap.
/// Windows are assembled independently of each other.
#[derive(Debug, Getters, CopyGetters)]
pub struct AssemblyWindow {
    #[getset(get_copy = "pub")]
    reference_index: usize,
    #[getset(get_copy = "pub")]
    direction: Direction,
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get_copy = "pub")]
    end: i64,
    #[getset(get = "pub")]
    evidence: Vec<KmerEvidence>,
}

impl fmt::Display for AssemblyWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}{}",
            self.reference_index,
            self.start,
            self.end,
            self.direction.as_char()
        )
    }
}

/// Order in which evidence enters a window: extent start, then evidence id.
pub fn by_extent_start(a: &KmerEvidence, b: &KmerEvidence) -> std::cmp::Ordering {
    a.extent()
        .0
        .cmp(&b.extent().0)
        .then_with(|| a.id().cmp(b.id()))
}

/// Split evidence into windows, ordered by reference index, direction and start.
pub fn windows(evidence: Vec<KmerEvidence>) -> Vec<AssemblyWindow> {
    let groups = evidence
        .into_iter()
        .map(|e| ((e.reference_index(), e.direction()), e))
        .into_group_map();

    let mut windows = Vec::new();
    for ((reference_index, direction), mut group) in groups.into_iter().sorted_by_key(|(key, _)| *key) {
        group.sort_by(by_extent_start);

        let mut current: Vec<KmerEvidence> = Vec::new();
        let (mut start, mut end) = (0, 0);
        for e in group {
            let (s, t) = e.extent();
            if !current.is_empty() && s > end + 1 {
                windows.push(AssemblyWindow {
                    reference_index,
                    direction,
                    start,
                    end,
                    evidence: std::mem::take(&mut current),
                });
            }
            if current.is_empty() {
                start = s;
                end = t;
            } else {
                end = end.max(t);
            }
            current.push(e);
        }
        if !current.is_empty() {
            windows.push(AssemblyWindow {
                reference_index,
                direction,
                start,
                end,
                evidence: current,
            });
        }
    }
    windows
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assembly::support::MinBaseQuality;
    use crate::evidence::{EvidenceSource, SoftClipEvidenceBuilder};
    use crate::parameters::AssemblyParametersBuilder;

    fn kmer_evidence(id: &str, direction: Direction, start: i64) -> KmerEvidence {
        let parameters = AssemblyParametersBuilder::default().k(3).build().unwrap();
        let sc = SoftClipEvidenceBuilder::default()
            .id(id)
            .source(EvidenceSource::normal("normal"))
            .reference_index(0)
            .direction(direction)
            .alignment_start(start)
            .mapq(60)
            .sequence(b"ACGTACGT".to_vec())
            .leading_clip(if direction == Direction::Backward { 4 } else { 0 })
            .trailing_clip(if direction == Direction::Forward { 4 } else { 0 })
            .build()
            .unwrap();
        KmerEvidence::from_evidence(Arc::new(sc.into()), &parameters, &MinBaseQuality)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_chain_overlap() {
        // extents: 1-6, 5-10, 11-16 (adjacent), 30-35
        let windows = windows(vec![
            kmer_evidence("d", Direction::Forward, 30),
            kmer_evidence("b", Direction::Forward, 5),
            kmer_evidence("a", Direction::Forward, 1),
            kmer_evidence("c", Direction::Forward, 11),
        ]);
        assert_eq!(windows.len(), 2);
        assert_eq!((windows[0].start(), windows[0].end()), (1, 16));
        let ids: Vec<_> = windows[0].evidence().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(windows[1].to_string(), "0:30-35f");
    }

    #[test]
    fn test_directions_are_separated() {
        let windows = windows(vec![
            kmer_evidence("b", Direction::Backward, 5),
            kmer_evidence("a", Direction::Forward, 1),
        ]);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].direction(), Direction::Forward);
        assert_eq!(windows[1].direction(), Direction::Backward);
    }
}
