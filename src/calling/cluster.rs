// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Grouping of the evidence of a partition into calls.

use std::cmp::Ordering;

use anyhow::Result;
use itertools::Itertools;

use crate::calling::builder::{AnchorCall, CallBuilder};
use crate::evidence::EvidenceRef;
use crate::model::LikelihoodScorer;
use crate::utils::descending;

/// Anchor rank: breakpoints first, then decreasing LLR, then identifier.
fn by_anchor_rank(a: &(EvidenceRef, f64), b: &(EvidenceRef, f64)) -> Ordering {
    b.0.is_breakpoint()
        .cmp(&a.0.is_breakpoint())
        .then_with(|| descending(a.1, b.1))
        .then_with(|| a.0.id().cmp(b.0.id()))
}

/// Greedily group evidence into call builders.
///
/// The best evidence not yet assigned anchors a call and absorbs every unassigned evidence
/// whose locus overlaps the anchor locus. Evidence is assigned to exactly one call.
/// Candidates are looked up by local start, bounded by the widest local interval.
pub fn cluster(
    evidence: Vec<EvidenceRef>,
    scorer: &dyn LikelihoodScorer,
) -> Result<Vec<CallBuilder>> {
    let ranked = evidence
        .into_iter()
        .map(|e| {
            let llr = scorer.llr(&e);
            (e, llr)
        })
        .sorted_by(by_anchor_rank)
        .map(|(e, _)| e)
        .collect_vec();
    let loci = ranked.iter().map(|e| e.locus()).collect_vec();
    let max_width = loci
        .iter()
        .map(|locus| locus.local().end() - locus.local().start())
        .max()
        .unwrap_or(0);
    let by_start = loci
        .iter()
        .enumerate()
        .map(|(rank, locus)| (locus.reference_index(), locus.start(), rank))
        .sorted()
        .collect_vec();

    let mut assigned = vec![false; ranked.len()];
    let mut builders = Vec::new();
    for i in 0..ranked.len() {
        if assigned[i] {
            continue;
        }
        let locus = loci[i];
        let local = locus.local();
        let lower = (local.reference_index(), local.start() - max_width);
        let upper = (local.reference_index(), local.end());
        let first = by_start.partition_point(|&(r, s, _)| (r, s) < lower);
        let last = by_start.partition_point(|&(r, s, _)| (r, s) <= upper);
        let members = by_start[first..last]
            .iter()
            .map(|&(_, _, rank)| rank)
            .filter(|&rank| !assigned[rank] && locus.overlaps(&loci[rank]))
            .sorted()
            .collect_vec();

        let mut builder = CallBuilder::new(AnchorCall::at(locus));
        for rank in members {
            assigned[rank] = true;
            builder = builder.add_evidence(ranked[rank].clone())?;
        }
        builders.push(builder);
    }
    Ok(builders)
}
