// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Positional de Bruijn graph of a single window.
//!
//! A node is a k-mer together with an interval of positions on which the set of supporting
//! evidence is constant. Nodes and edges are kept in flat tables, adjacency is stored in
//! compressed sparse row form in both directions.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::Result;
use itertools::Itertools;

use crate::assembly::kmer::{self, Kmer};
use crate::assembly::window::AssemblyWindow;
use crate::errors::Error;
use crate::parameters::AssemblyParameters;

pub type NodeIndex = u32;

#[derive(Debug, Clone, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PositionalNode {
    kmer: Kmer,
    start: i64,
    end: i64,
    weight: u64,
    evidence_count: u32,
    /// Whether any supporting k-mer overlaps a reference anchored base.
    reference: bool,
    #[getset(skip)]
    evidence: Range<u32>,
}

impl PositionalNode {
    pub fn contains(&self, position: i64) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn width(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Adjacency in compressed sparse row form.
#[derive(Debug, Default)]
struct Adjacency {
    offsets: Vec<u32>,
    targets: Vec<NodeIndex>,
}

impl Adjacency {
    fn new(node_count: usize, mut edges: Vec<(NodeIndex, NodeIndex)>) -> Self {
        edges.sort_unstable();
        edges.dedup();
        let mut offsets = vec![0; node_count + 1];
        for (from, _) in &edges {
            offsets[*from as usize + 1] += 1;
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }
        Adjacency {
            offsets,
            targets: edges.into_iter().map(|(_, to)| to).collect(),
        }
    }

    fn neighbours(&self, node: NodeIndex) -> &[NodeIndex] {
        let node = node as usize;
        &self.targets[self.offsets[node] as usize..self.offsets[node + 1] as usize]
    }
}

#[derive(Debug, Getters, CopyGetters)]
pub struct AssemblyGraph<'a> {
    #[getset(get_copy = "pub")]
    window: &'a AssemblyWindow,
    #[getset(get_copy = "pub")]
    k: usize,
    #[getset(get = "pub")]
    nodes: Vec<PositionalNode>,
    /// Indices into the window evidence, referenced by node evidence ranges.
    node_evidence: Vec<u32>,
    successors: Adjacency,
    predecessors: Adjacency,
}

struct Support {
    start: i64,
    end: i64,
    weight: u32,
    reference: bool,
    evidence: u32,
}

impl<'a> AssemblyGraph<'a> {
    /// Build the graph of the given window. Fails if the graph exceeds the node limit or any
    /// connected subgraph exceeds the width limit.
    pub fn build(window: &'a AssemblyWindow, parameters: &AssemblyParameters) -> Result<Self> {
        let k = parameters.k();
        let mut supports: Vec<(Kmer, Support)> = Vec::new();
        for (i, e) in window.evidence().iter().enumerate() {
            supports.extend(e.support_nodes().map(|node| {
                (
                    node.kmer(),
                    Support {
                        start: node.start(),
                        end: node.end(),
                        weight: node.weight(),
                        reference: node.is_reference(),
                        evidence: i as u32,
                    },
                )
            }));
        }
        supports.sort_by_key(|(kmer, s)| (*kmer, s.start, s.end, s.evidence));

        let limit = parameters.max_graph_nodes().unwrap_or(usize::MAX);
        let mut nodes = Vec::new();
        let mut node_evidence = Vec::new();
        for (kmer, group) in &supports.iter().group_by(|(kmer, _)| *kmer) {
            let group: Vec<&Support> = group.map(|(_, s)| s).collect();
            if !sweep(kmer, &group, limit, &mut nodes, &mut node_evidence) {
                return Err(Error::AssemblyGraphTooLarge {
                    region: window.to_string(),
                    nodes: nodes.len(),
                    limit,
                }
                .into());
            }
        }

        let edges = edges(&nodes, k);
        let successors = Adjacency::new(nodes.len(), edges.clone());
        let predecessors =
            Adjacency::new(nodes.len(), edges.into_iter().map(|(a, b)| (b, a)).collect());

        let graph = AssemblyGraph {
            window,
            k,
            nodes,
            node_evidence,
            successors,
            predecessors,
        };

        if let Some(limit) = parameters.max_subgraph_width() {
            for (start, end) in graph.component_spans() {
                let width = end - start + 1;
                if width > limit {
                    return Err(Error::AssemblySubgraphTooWide {
                        region: window.to_string(),
                        width,
                        limit,
                    }
                    .into());
                }
            }
        }

        Ok(graph)
    }

    pub fn node(&self, index: NodeIndex) -> &PositionalNode {
        &self.nodes[index as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn successors(&self, index: NodeIndex) -> &[NodeIndex] {
        self.successors.neighbours(index)
    }

    pub fn predecessors(&self, index: NodeIndex) -> &[NodeIndex] {
        self.predecessors.neighbours(index)
    }

    /// Indices into the window evidence supporting the given node.
    pub fn node_evidence(&self, index: NodeIndex) -> &[u32] {
        let range = &self.nodes[index as usize].evidence;
        &self.node_evidence[range.start as usize..range.end as usize]
    }

    pub fn edge_count(&self) -> usize {
        self.successors.targets.len()
    }

    /// Node indices of each connected subgraph, ordered by their smallest node index.
    pub fn components(&self) -> Vec<Vec<NodeIndex>> {
        let n = self.nodes.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut Vec<usize>, mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for from in 0..n {
            for &to in self.successors(from as NodeIndex) {
                let (a, b) = (find(&mut parent, from), find(&mut parent, to as usize));
                if a != b {
                    // the root is always the smallest index of its subgraph
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
        let mut components: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            components.entry(root).or_default().push(i as NodeIndex);
        }
        components.into_iter().map(|(_, nodes)| nodes).collect()
    }

    /// Positional span of each connected subgraph.
    fn component_spans(&self) -> Vec<(i64, i64)> {
        self.components()
            .iter()
            .map(|component| {
                component.iter().fold((i64::MAX, i64::MIN), |(start, end), &i| {
                    let node = self.node(i);
                    (start.min(node.start), end.max(node.end))
                })
            })
            .collect()
    }
}

/// Split the supports of one k-mer into nodes of constant supporting set by sweeping over the
/// sorted interval boundaries. Returns false as soon as there are more than `limit` nodes.
fn sweep(
    kmer: Kmer,
    supports: &[&Support],
    limit: usize,
    nodes: &mut Vec<PositionalNode>,
    node_evidence: &mut Vec<u32>,
) -> bool {
    // (position, is start, support)
    let mut events: Vec<(i64, bool, usize)> = supports
        .iter()
        .enumerate()
        .map(|(i, s)| (s.start, true, i))
        .chain(supports.iter().enumerate().map(|(i, s)| (s.end + 1, false, i)))
        .collect();
    events.sort_unstable();

    let mut active: BTreeMap<u32, u32> = BTreeMap::new();
    let mut weight = 0u64;
    let mut reference = 0u32;
    let mut i = 0;
    while i < events.len() {
        let start = events[i].0;
        while i < events.len() && events[i].0 == start {
            let (_, is_start, index) = events[i];
            let support = supports[index];
            if is_start {
                *active.entry(support.evidence).or_insert(0) += 1;
                weight += support.weight as u64;
                reference += support.reference as u32;
            } else {
                if let Entry::Occupied(mut entry) = active.entry(support.evidence) {
                    *entry.get_mut() -= 1;
                    if *entry.get() == 0 {
                        entry.remove();
                    }
                }
                weight -= support.weight as u64;
                reference -= support.reference as u32;
            }
            i += 1;
        }
        // active supports always end at a later event
        if active.is_empty() || i == events.len() {
            continue;
        }
        let first = node_evidence.len() as u32;
        node_evidence.extend(active.keys().copied());
        let last = node_evidence.len() as u32;
        nodes.push(PositionalNode {
            kmer,
            start,
            end: events[i].0 - 1,
            weight,
            evidence_count: last - first,
            reference: reference > 0,
            evidence: first..last,
        });
        if nodes.len() > limit {
            return false;
        }
    }
    true
}

/// Edges A -> B where the last k-1 bases of A are the first k-1 bases of B and B can follow
/// A at the next position. Nodes must be sorted by k-mer and start.
fn edges(nodes: &[PositionalNode], k: usize) -> Vec<(NodeIndex, NodeIndex)> {
    let mut edges = Vec::new();
    for (a, node) in nodes.iter().enumerate() {
        let prefix = kmer::suffix(node.kmer, k) << 2;
        for base in 0..4 {
            let next = prefix | base;
            // nodes of one k-mer are disjoint and sorted, hence sorted by end as well
            let first = nodes.partition_point(|n| (n.kmer, n.end) < (next, node.start + 1));
            for (b, candidate) in nodes.iter().enumerate().skip(first) {
                if candidate.kmer != next || candidate.start > node.end + 1 {
                    break;
                }
                edges.push((a as NodeIndex, b as NodeIndex));
            }
        }
    }
    edges
}
