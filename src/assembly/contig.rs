// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Greedy contig extraction from a positional assembly graph.
//!
//! Repeatedly, the best path over the not yet visited nodes is determined by dynamic
//! programming over (node, position) states: a path takes exactly one position per k-mer, and
//! consecutive k-mers occupy consecutive positions. The nodes of the chosen path are marked as
//! visited. Paths consisting of reference k-mers only are discarded. The best path of each
//! connected subgraph is cached until a path is taken from it.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::assembly::graph::{AssemblyGraph, NodeIndex};
use crate::assembly::kmer::{self, Kmer};
use crate::evidence::{AssemblyFilter, EvidenceRef};
use crate::locus::Direction;
use crate::parameters::AssemblyParameters;

const MAX_BASE_QUALITY: u64 = 93;

/// A contig assembled from a window.
#[derive(Debug, Clone, Getters, CopyGetters, new)]
pub struct Contig {
    #[getset(get_copy = "pub")]
    reference_index: usize,
    /// Direction of the window the contig was assembled from.
    #[getset(get_copy = "pub")]
    direction: Direction,
    /// Position of the first base.
    #[getset(get_copy = "pub")]
    start: i64,
    #[getset(get = "pub")]
    sequence: Vec<u8>,
    #[getset(get = "pub")]
    qualities: Vec<u8>,
    #[getset(get_copy = "pub")]
    weight: u64,
    /// Number of leading bases anchored to the reference.
    #[getset(get_copy = "pub")]
    leading_anchor: usize,
    /// Number of trailing bases anchored to the reference.
    #[getset(get_copy = "pub")]
    trailing_anchor: usize,
    /// Contributing evidence, ordered by id.
    #[getset(get = "pub")]
    evidence: Vec<EvidenceRef>,
    #[getset(get = "pub")]
    filters: Vec<AssemblyFilter>,
}

impl Contig {
    pub fn end(&self) -> i64 {
        self.start + self.sequence.len() as i64 - 1
    }

    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// Score of the best path ending in a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathScore {
    weight: u64,
    length: u32,
    first_position: i64,
}

/// Path ranking: weight descending, then length descending, then leftmost start.
fn by_path_rank(a: &PathScore, b: &PathScore) -> Ordering {
    b.weight
        .cmp(&a.weight)
        .then(b.length.cmp(&a.length))
        .then(a.first_position.cmp(&b.first_position))
}

#[derive(Debug, Clone, Copy)]
struct State {
    score: PathScore,
    predecessor: Option<(NodeIndex, i64)>,
}

/// A path as (node, position) states, with its score and k-mers for tie-breaking.
#[derive(Debug, Clone)]
struct ScoredPath {
    score: PathScore,
    kmers: Vec<Kmer>,
    states: Vec<(NodeIndex, i64)>,
}

/// Path ranking across subgraphs: score, then k-mer sequence.
fn by_scored_path_rank(a: &ScoredPath, b: &ScoredPath) -> Ordering {
    by_path_rank(&a.score, &b.score).then_with(|| a.kmers.cmp(&b.kmers))
}

/// A connected subgraph together with its best path over unvisited nodes. Paths never leave
/// their subgraph, so only the subgraph a path was taken from needs to be searched again.
struct Component {
    /// Nodes ordered by start position.
    nodes: Vec<NodeIndex>,
    state_count: usize,
    best: Option<ScoredPath>,
}

struct PathFinder<'g, 'a> {
    graph: &'g AssemblyGraph<'a>,
    visited: Vec<bool>,
    /// Offset of the first state of each node within its subgraph.
    state_offsets: Vec<usize>,
    components: Vec<Component>,
}

impl<'g, 'a> PathFinder<'g, 'a> {
    fn new(graph: &'g AssemblyGraph<'a>) -> Self {
        let mut state_offsets = vec![0; graph.node_count()];
        let mut components = Vec::new();
        for mut nodes in graph.components() {
            nodes.sort_by_key(|n| (graph.node(*n).start(), *n));
            let mut offset = 0;
            for &node in &nodes {
                state_offsets[node as usize] = offset;
                offset += graph.node(node).width() as usize;
            }
            components.push(Component {
                nodes,
                state_count: offset,
                best: None,
            });
        }
        // nodes without weight never extend a path
        let visited = graph.nodes().iter().map(|n| n.weight() == 0).collect();
        let mut finder = PathFinder {
            graph,
            visited,
            state_offsets,
            components,
        };
        for i in 0..finder.components.len() {
            let best = finder.best_path(i);
            finder.components[i].best = best;
        }
        finder
    }

    fn state_index(&self, node: NodeIndex, position: i64) -> usize {
        self.state_offsets[node as usize] + (position - self.graph.node(node).start()) as usize
    }

    /// Tie-break between predecessors of equal score: smaller k-mer, then smaller node index.
    fn predecessor_key(&self, node: NodeIndex) -> (Kmer, NodeIndex) {
        (self.graph.node(node).kmer(), node)
    }

    /// Take the best remaining path of the whole graph and mark its nodes as visited.
    fn next_path(&mut self) -> Option<Vec<(NodeIndex, i64)>> {
        let (best, _) = self
            .components
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.best.as_ref().map(|path| (i, path)))
            .min_by(|(i, a), (j, b)| by_scored_path_rank(a, b).then(i.cmp(j)))?;
        let path = self.components[best].best.take()?;
        for (node, _) in &path.states {
            self.visited[*node as usize] = true;
        }
        let next = self.best_path(best);
        self.components[best].best = next;
        Some(path.states)
    }

    /// Best path over the unvisited nodes of a subgraph.
    fn best_path(&self, component: usize) -> Option<ScoredPath> {
        let graph = self.graph;
        let component = &self.components[component];
        let order: Vec<NodeIndex> = component
            .nodes
            .iter()
            .copied()
            .filter(|n| !self.visited[*n as usize])
            .collect();
        let mut position = graph.node(*order.first()?).start();
        let mut states: Vec<Option<State>> = vec![None; component.state_count];

        let mut active: Vec<NodeIndex> = Vec::new();
        let mut pending = order.iter().copied().peekable();
        loop {
            active.retain(|n| graph.node(*n).end() >= position);
            if active.is_empty() {
                // skip positions without nodes
                match pending.peek() {
                    Some(n) => position = position.max(graph.node(*n).start()),
                    None => break,
                }
            }
            while let Some(n) = pending.peek() {
                if graph.node(*n).start() > position {
                    break;
                }
                active.push(*n);
                pending.next();
            }
            for &node in &active {
                let mut best: Option<State> = None;
                for &pred in graph.predecessors(node) {
                    if self.visited[pred as usize] || !graph.node(pred).contains(position - 1) {
                        continue;
                    }
                    if let Some(prev) = states[self.state_index(pred, position - 1)] {
                        let candidate = prev.score;
                        let better = match best {
                            None => true,
                            Some(current) => match by_path_rank(&candidate, &current.score) {
                                Ordering::Less => true,
                                Ordering::Greater => false,
                                Ordering::Equal => match current.predecessor {
                                    Some((current_pred, _)) => {
                                        self.predecessor_key(pred)
                                            < self.predecessor_key(current_pred)
                                    }
                                    None => true,
                                },
                            },
                        };
                        if better {
                            best = Some(State {
                                score: candidate,
                                predecessor: Some((pred, position - 1)),
                            });
                        }
                    }
                }
                let weight = graph.node(node).weight();
                let state = match best {
                    Some(prev) => State {
                        score: PathScore {
                            weight: prev.score.weight + weight,
                            length: prev.score.length + 1,
                            first_position: prev.score.first_position,
                        },
                        predecessor: prev.predecessor,
                    },
                    None => State {
                        score: PathScore {
                            weight,
                            length: 1,
                            first_position: position,
                        },
                        predecessor: None,
                    },
                };
                let index = self.state_index(node, position);
                states[index] = Some(state);
            }
            position += 1;
        }

        // collect all optimal end states, resolve ties by the k-mer sequence
        let mut best_score: Option<PathScore> = None;
        let mut ends = Vec::new();
        for &node in &order {
            let n = graph.node(node);
            for position in n.start()..=n.end() {
                if let Some(state) = states[self.state_index(node, position)] {
                    match best_score.map(|s| by_path_rank(&state.score, &s)) {
                        None | Some(Ordering::Less) => {
                            best_score = Some(state.score);
                            ends.clear();
                            ends.push((node, position));
                        }
                        Some(Ordering::Equal) => ends.push((node, position)),
                        Some(Ordering::Greater) => (),
                    }
                }
            }
        }

        let score = best_score?;
        ends.into_iter()
            .map(|end| {
                let states = self.traceback(&states, end);
                let kmers = states.iter().map(|(n, _)| graph.node(*n).kmer()).collect();
                ScoredPath {
                    score,
                    kmers,
                    states,
                }
            })
            .min_by(|a, b| a.kmers.cmp(&b.kmers))
    }

    fn traceback(&self, states: &[Option<State>], end: (NodeIndex, i64)) -> Vec<(NodeIndex, i64)> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(Some(state)) = states.get(self.state_index(current.0, current.1)) {
            match state.predecessor {
                Some(pred) => {
                    path.push(pred);
                    current = pred;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Extract all contigs of the graph, in extraction order. Filtered contigs are only returned
/// if `write_filtered_assemblies` is set.
pub fn extract_contigs(graph: &AssemblyGraph, parameters: &AssemblyParameters) -> Vec<Contig> {
    let mut finder = PathFinder::new(graph);
    let mut contigs = Vec::new();

    while let Some(path) = finder.next_path() {
        if path.iter().all(|(node, _)| graph.node(*node).reference()) {
            debug!("discarding reference-only path in window {}", graph.window());
            continue;
        }

        let contig = contig(graph, &path, parameters);
        if contig.is_filtered() && !parameters.write_filtered_assemblies() {
            debug!(
                "dropping filtered contig at {}:{} ({:?})",
                contig.reference_index(),
                contig.start(),
                contig.filters()
            );
            continue;
        }
        contigs.push(contig);
    }

    contigs
}

fn contig(graph: &AssemblyGraph, path: &[(NodeIndex, i64)], parameters: &AssemblyParameters) -> Contig {
    let k = graph.k();
    let window = graph.window();
    let nodes: Vec<_> = path.iter().map(|(n, _)| graph.node(*n)).collect();

    let mut sequence = kmer::decode(nodes[0].kmer(), k);
    sequence.extend(nodes[1..].iter().map(|n| kmer::last_base(n.kmer())));

    // base i is covered by k-mers max(0, i - k + 1)..=min(i, n - 1)
    let qualities = (0..sequence.len())
        .map(|i| {
            let covering = &nodes[(i + 1).saturating_sub(k)..=i.min(nodes.len() - 1)];
            let mean = covering.iter().map(|n| n.weight()).sum::<u64>() / covering.len() as u64;
            mean.min(MAX_BASE_QUALITY) as u8
        })
        .collect();

    let leading_anchor = nodes.iter().take_while(|n| n.reference()).count();
    let trailing_anchor = nodes.iter().rev().take_while(|n| n.reference()).count();

    let evidence: Vec<EvidenceRef> = path
        .iter()
        .flat_map(|(n, _)| graph.node_evidence(*n).iter().copied())
        .sorted()
        .dedup()
        .map(|i| window.evidence()[i as usize].evidence().clone())
        .sorted_by(|a, b| a.id().cmp(b.id()))
        .dedup_by(|a, b| a.id() == b.id())
        .collect();

    let weight = nodes.iter().map(|n| n.weight()).sum();

    let mut filters = Vec::new();
    if evidence.len() < parameters.min_evidence_count() {
        filters.push(AssemblyFilter::TooFewReads);
    }
    if weight < parameters.min_contig_weight() {
        filters.push(AssemblyFilter::LowWeight);
    }
    if sequence.len() < parameters.min_contig_length() {
        filters.push(AssemblyFilter::TooShort);
    }

    Contig {
        reference_index: window.reference_index(),
        direction: window.direction(),
        start: path[0].1,
        sequence,
        qualities,
        weight,
        leading_anchor,
        trailing_anchor,
        evidence,
        filters,
    }
}
