// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Local assembly of breakend sequences from soft clips and read pairs.

pub mod adapter;
pub mod contig;
pub mod graph;
pub mod kmer;
pub mod support;
pub mod window;

use anyhow::Result;

use crate::evidence::{AssemblyEvidence, EvidenceRef};
use crate::locus::by_genomic_position;
use crate::parameters::AssemblyParameters;
use crate::reference::ReferenceLookup;

use self::contig::Contig;
use self::graph::AssemblyGraph;
use self::support::{KmerEvidence, KmerWeighting};

pub use self::support::MinBaseQuality;

/// Assembler for the evidence of a single partition.
#[derive(new)]
pub struct Assembler<'a> {
    parameters: &'a AssemblyParameters,
    weighting: &'a dyn KmerWeighting,
    reference: &'a dyn ReferenceLookup,
}

impl<'a> Assembler<'a> {
    /// Contigs of all windows, in window order. Malformed evidence is skipped, windows
    /// exceeding the graph bounds yield no contigs.
    pub fn contigs(&self, evidence: &[EvidenceRef]) -> Result<Vec<Contig>> {
        kmer::check_kmer_size(self.parameters.k())?;

        let mut kmer_evidence = Vec::with_capacity(evidence.len());
        for e in evidence {
            match KmerEvidence::from_evidence(e.clone(), self.parameters, self.weighting) {
                Ok(Some(ke)) => kmer_evidence.push(ke),
                Ok(None) => (),
                Err(err) => warn!("skipping evidence for assembly: {}", err),
            }
        }

        let mut contigs = Vec::new();
        for window in window::windows(kmer_evidence) {
            let graph = match AssemblyGraph::build(&window, self.parameters) {
                Ok(graph) => graph,
                Err(err) => {
                    warn!("{}", err);
                    continue;
                }
            };
            debug!(
                "window {}: {} evidence, {} nodes, {} edges",
                window,
                window.evidence().len(),
                graph.node_count(),
                graph.edge_count()
            );
            contigs.extend(contig::extract_contigs(&graph, self.parameters));
        }
        Ok(contigs)
    }

    /// Assemble the given evidence of one partition into assembly evidence, ordered by
    /// genomic position.
    pub fn assemble(&self, evidence: &[EvidenceRef]) -> Result<Vec<AssemblyEvidence>> {
        let mut assemblies = self
            .contigs(evidence)?
            .iter()
            .enumerate()
            .map(|(ordinal, contig)| {
                adapter::to_assembly_evidence(contig, self.parameters.k(), ordinal, self.reference)
            })
            .collect::<Result<Vec<_>>>()?;
        assemblies.sort_by(|a, b| {
            by_genomic_position(a.locus(), b.locus()).then_with(|| a.id().cmp(b.id()))
        });
        Ok(assemblies)
    }
}
