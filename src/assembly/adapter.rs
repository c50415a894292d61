// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Conversion of contigs into assembly evidence.

use std::f64::consts::LN_10;

use anyhow::Result;
use itertools::Itertools;

use crate::assembly::contig::Contig;
use crate::evidence::{AssemblyAttributes, AssemblyEvidence, AssemblyEvidenceBuilder};
use crate::locus::{BreakendLocus, BreakendSummary, BreakpointSummary, Direction};
use crate::reference::ReferenceLookup;

pub const ASSEMBLY_PROGRAM: &str = "positional";

/// Locus of a contig given its anchors.
///
/// A leading anchor ends in a forward breakend at the last anchored base, a trailing anchor
/// starts a backward breakend at the first anchored base. Contigs anchored on both ends
/// become breakpoints whose local side follows the window direction. Unanchored contigs span
/// the breakends of their evidence.
pub fn contig_locus(contig: &Contig, reference: &dyn ReferenceLookup) -> Result<BreakendLocus> {
    let reference_index = contig.reference_index();
    let len = contig.sequence().len() as i64;
    let forward = || {
        BreakendSummary::exact(
            reference_index,
            Direction::Forward,
            contig.start() + contig.leading_anchor() as i64 - 1,
        )
    };
    let backward = || {
        BreakendSummary::exact(
            reference_index,
            Direction::Backward,
            contig.start() + len - contig.trailing_anchor() as i64,
        )
    };

    Ok(match (contig.leading_anchor(), contig.trailing_anchor()) {
        (0, 0) => {
            let reference_length = reference.length(reference_index)? as i64;
            let union = contig
                .evidence()
                .iter()
                .map(|e| e.locus().local())
                .filter(|b| {
                    b.reference_index() == reference_index && b.direction() == contig.direction()
                })
                .fold1(|a, b| a.union(&b))
                .unwrap_or_else(|| {
                    BreakendSummary::new(reference_index, contig.direction(), contig.start(), contig.end())
                });
            union.clamp(1, reference_length.max(1)).into()
        }
        (_, 0) => forward().into(),
        (0, _) => backward().into(),
        _ => match contig.direction() {
            Direction::Forward => BreakpointSummary::new(forward(), backward()).into(),
            Direction::Backward => BreakpointSummary::new(backward(), forward()).into(),
        },
    })
}

/// LLR of a contig: the weight per k-mer position, on a PHRED like scale, in natural log units.
pub fn contig_llr(contig: &Contig, k: usize) -> f64 {
    contig.weight() as f64 / k as f64 * LN_10 / 10.0
}

/// Build assembly evidence from a contig. `ordinal` makes the id unique within the partition.
pub fn to_assembly_evidence(
    contig: &Contig,
    k: usize,
    ordinal: usize,
    reference: &dyn ReferenceLookup,
) -> Result<AssemblyEvidence> {
    let locus = contig_locus(contig, reference)?;
    let len = contig.sequence().len();
    let (a, b) = (contig.leading_anchor(), contig.trailing_anchor());

    let (anchor_range, breakend_range) = match locus {
        BreakendLocus::Breakpoint(_) => (0..a, a..len - b),
        BreakendLocus::Breakend(_) if b > 0 => (len - b..len, 0..len - b),
        BreakendLocus::Breakend(_) => (0..a, a..len),
    };

    let local = locus.local();
    let id = format!(
        "asm{}-{}{}-{}",
        local.reference_index(),
        local.start(),
        local.direction().as_char(),
        ordinal
    );
    let consensus = String::from_utf8_lossy(contig.sequence()).into_owned();
    let mapq = contig
        .evidence()
        .iter()
        .map(|e| e.local_mapq())
        .max()
        .unwrap_or(0);

    let evidence = AssemblyEvidenceBuilder::default()
        .id(id)
        .locus(locus)
        .anchor_sequence(contig.sequence()[anchor_range].to_vec())
        .breakend_sequence(contig.sequence()[breakend_range.clone()].to_vec())
        .breakend_quality(contig.qualities()[breakend_range].to_vec())
        .mapq(mapq)
        .llr(contig_llr(contig, k))
        .attributes(AssemblyAttributes::from_evidence(
            contig.evidence(),
            &consensus,
            ASSEMBLY_PROGRAM,
        ))
        .filters(contig.filters().clone())
        .evidence_ids(contig.evidence().iter().map(|e| e.id().to_owned()).collect())
        .supporting(contig.evidence().clone())
        .build()?;
    Ok(evidence)
}
