//! Co-occurrence graph — incremental edge weighting from per-scene casts.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::trace;

use crate::schema::character::CharacterMeta;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),
    #[error("edge references unknown character {0:?}")]
    UnknownVertex(String),
    #[error("edge connects {0:?} to itself")]
    SelfLoop(String),
    #[error("more than one edge between {0:?} and {1:?}")]
    DuplicateEdge(String, String),
    #[error("edge between {0:?} and {1:?} has weight 0")]
    ZeroWeight(String, String),
}

/// When the builder hands a snapshot of the graph to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmitSchedule {
    /// Once, after every scene has been processed.
    #[default]
    Final,
    /// After every n-th scene, plus once after the last scene.
    EveryScenes(usize),
}

impl EmitSchedule {
    fn emits_after(&self, scenes_processed: usize) -> bool {
        match self {
            Self::Final => false,
            Self::EveryScenes(n) => *n > 0 && scenes_processed % n == 0,
        }
    }
}

/// Describes a snapshot handed to the emit callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    /// How many scenes have been folded into the graph so far.
    pub scenes_processed: usize,
    /// True for the snapshot taken after the last scene.
    pub is_final: bool,
}

impl Emission {
    /// 0-based index of the last scene included in this snapshot.
    pub fn scene_index(&self) -> usize {
        self.scenes_processed.saturating_sub(1)
    }
}

/// Weighted undirected character graph. Vertices are fixed at
/// construction; edge weight counts the scenes a pair shares.
#[derive(Debug, Clone)]
pub struct CooccurrenceGraph {
    graph: UnGraph<CharacterMeta, u32>,
    index: FxHashMap<String, NodeIndex>,
}

impl CooccurrenceGraph {
    /// One vertex per character, no edges.
    ///
    /// If two rows share a name, lookups resolve to the first one.
    pub fn new(characters: Vec<CharacterMeta>) -> Self {
        let mut graph = UnGraph::with_capacity(characters.len(), 0);
        let mut index = FxHashMap::default();
        for character in characters {
            let name = character.name.clone();
            let node = graph.add_node(character);
            index.entry(name).or_insert(node);
        }
        Self { graph, index }
    }

    /// Fold every scene into a fresh graph, calling `on_emit` according to
    /// `schedule`. An error from `on_emit` stops the build.
    pub fn build<F, E>(
        characters: Vec<CharacterMeta>,
        scenes: &[Vec<String>],
        schedule: EmitSchedule,
        mut on_emit: F,
    ) -> Result<Self, E>
    where
        F: FnMut(Emission, &CooccurrenceGraph) -> Result<(), E>,
    {
        let mut graph = Self::new(characters);
        let total = scenes.len();

        for (i, present) in scenes.iter().enumerate() {
            graph.add_scene(present);
            let processed = i + 1;
            if processed == total {
                break;
            }
            if schedule.emits_after(processed) {
                on_emit(
                    Emission {
                        scenes_processed: processed,
                        is_final: false,
                    },
                    &graph,
                )?;
            }
        }

        on_emit(
            Emission {
                scenes_processed: total,
                is_final: true,
            },
            &graph,
        )?;
        Ok(graph)
    }

    /// Add one scene's cast: every unordered pair of distinct characters
    /// gains one unit of weight.
    pub fn add_scene(&mut self, present: &[String]) {
        let mut remaining: Vec<NodeIndex> = Vec::with_capacity(present.len());
        for node in present.iter().filter_map(|name| self.index.get(name).copied()) {
            if !remaining.contains(&node) {
                remaining.push(node);
            }
        }

        while let Some(current) = remaining.pop() {
            for &other in &remaining {
                self.bump(current, other);
            }
        }
    }

    fn bump(&mut self, a: NodeIndex, b: NodeIndex) {
        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph[edge] += 1,
            None => {
                self.graph.add_edge(a, b, 1);
            }
        }
        trace!(a = %self.graph[a].name, b = %self.graph[b].name, "co-occurrence");
    }

    /// Weight of the edge between two characters, if they ever co-occur.
    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.graph.find_edge(a, b).map(|edge| self.graph[edge])
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Largest edge weight; `None` while the graph has no edges.
    pub fn max_weight(&self) -> Option<u32> {
        self.graph.edge_weights().copied().max()
    }

    /// Characters in vertex order.
    pub fn characters(&self) -> impl Iterator<Item = &CharacterMeta> {
        self.graph.node_weights()
    }

    /// `(name_a, name_b, weight)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].name.as_str(),
                self.graph[edge.target()].name.as_str(),
                *edge.weight(),
            )
        })
    }

    /// The underlying petgraph graph.
    pub fn inner(&self) -> &UnGraph<CharacterMeta, u32> {
        &self.graph
    }

    /// Plain-data view of the graph for export.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            vertices: self.characters().cloned().collect(),
            edges: self
                .edges()
                .map(|(source, target, weight)| EdgeRecord {
                    source: source.to_string(),
                    target: target.to_string(),
                    weight,
                })
                .collect(),
        }
    }

    /// Rebuild a graph from an exported snapshot.
    ///
    /// Rejects edges a build could never produce: self loops, a second edge
    /// for the same pair, and zero weights.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new(snapshot.vertices);
        for edge in snapshot.edges {
            let a = graph.node(&edge.source)?;
            let b = graph.node(&edge.target)?;
            if a == b {
                return Err(GraphError::SelfLoop(edge.source));
            }
            if edge.weight == 0 {
                return Err(GraphError::ZeroWeight(edge.source, edge.target));
            }
            if graph.graph.find_edge(a, b).is_some() {
                return Err(GraphError::DuplicateEdge(edge.source, edge.target));
            }
            graph.graph.add_edge(a, b, edge.weight);
        }
        Ok(graph)
    }

    fn node(&self, name: &str) -> Result<NodeIndex, GraphError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownVertex(name.to_string()))
    }
}

/// Serializable form of a finished graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub vertices: Vec<CharacterMeta>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Save a graph to a RON file.
pub fn save_graph(graph: &CooccurrenceGraph, path: &Path) -> Result<(), GraphError> {
    let serialized =
        ron::ser::to_string_pretty(&graph.snapshot(), ron::ser::PrettyConfig::default())?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a graph from a RON file.
pub fn load_graph(path: &Path) -> Result<CooccurrenceGraph, GraphError> {
    let contents = std::fs::read_to_string(path)?;
    let snapshot: GraphSnapshot = ron::from_str(&contents)?;
    CooccurrenceGraph::from_snapshot(snapshot)
}
