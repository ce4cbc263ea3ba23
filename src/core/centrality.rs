//! Weighted betweenness centrality over the co-occurrence graph.
//!
//! Edge length is `1 / weight`, so characters who share many scenes are
//! "close". Scores count each unordered pair of endpoints once.

use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::graph::CooccurrenceGraph;

/// Tolerance for treating two path lengths as equal.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Reversed so BinaryHeap pops the nearest node first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Betweenness score per vertex, in vertex order (Brandes' algorithm).
pub fn betweenness(graph: &CooccurrenceGraph) -> Vec<f64> {
    let inner = graph.inner();
    let n = inner.node_count();
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for edge in inner.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        let length = 1.0 / f64::from(*edge.weight());
        adjacency[a].push((b, length));
        adjacency[b].push((a, length));
    }

    let mut scores = vec![0.0; n];
    for source in 0..n {
        accumulate_from(source, &adjacency, &mut scores);
    }
    for score in &mut scores {
        *score /= 2.0;
    }
    scores
}

fn accumulate_from(source: usize, adjacency: &[Vec<(usize, f64)>], scores: &mut [f64]) {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut paths = vec![0.0_f64; n];
    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    paths[source] = 1.0;
    dist[source] = 0.0;
    heap.push(Frontier {
        dist: 0.0,
        node: source,
    });

    while let Some(Frontier { dist: d, node: v }) = heap.pop() {
        if settled[v] || d > dist[v] + EPSILON {
            continue;
        }
        settled[v] = true;
        order.push(v);

        for &(w, length) in &adjacency[v] {
            if settled[w] {
                continue;
            }
            let candidate = dist[v] + length;
            if candidate < dist[w] - EPSILON {
                dist[w] = candidate;
                paths[w] = paths[v];
                predecessors[w].clear();
                predecessors[w].push(v);
                heap.push(Frontier {
                    dist: candidate,
                    node: w,
                });
            } else if (candidate - dist[w]).abs() <= EPSILON {
                paths[w] += paths[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut dependency = vec![0.0_f64; n];
    while let Some(w) = order.pop() {
        for &v in &predecessors[w] {
            dependency[v] += paths[v] / paths[w] * (1.0 + dependency[w]);
        }
        if w != source {
            scores[w] += dependency[w];
        }
    }
}

/// Names of the characters with the highest betweenness.
///
/// Empty when no character lies on any shortest path.
pub fn most_central(graph: &CooccurrenceGraph) -> Vec<String> {
    let scores = betweenness(graph);
    let max = scores.iter().copied().fold(0.0_f64, f64::max);
    if max <= EPSILON {
        return Vec::new();
    }
    graph
        .characters()
        .zip(&scores)
        .filter(|(_, score)| (max - **score).abs() <= EPSILON)
        .map(|(character, _)| character.name.clone())
        .collect()
}
