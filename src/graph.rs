use std::collections::{hash_map::Entry, HashMap};

use itertools::Itertools;
use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction, Graph};

use crate::error::GraphError;

pub type Weight = f64;

/// Weight an edge has when the source file does not give one.
pub const DEFAULT_WEIGHT: Weight = 1.0;

/// An edge as it appears in a graph file, before parallel edges are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    pub weight: Option<Weight>,
    /// Arc from source to target only, as opposed to a line usable both ways.
    pub directed: bool,
}

/// Vertices and edges exactly as read from a graph file. May contain parallel edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGraph {
    pub vertices: Vec<String>,
    pub edges: Vec<RawEdge>,
}

/// Simple (no parallel edges) station network whose edge weights carry traffic.
///
/// Vertices are station display names. For undirected graphs every edge is stored
/// once as an arc and traversed in both directions.
#[derive(Debug, Clone)]
pub struct StationGraph {
    graph: Graph<String, Weight, Directed>,
    nodes: HashMap<String, NodeIndex>,
    directed: bool,
}

impl StationGraph {
    /// Builds a simple graph. In a directed graph an undirected input edge turns
    /// into an arc in each direction; in an undirected graph every edge is a line.
    pub fn from_raw(raw: RawGraph, directed: bool) -> Result<Self, GraphError> {
        let mut graph = Graph::with_capacity(raw.vertices.len(), raw.edges.len());
        let mut nodes = HashMap::with_capacity(raw.vertices.len());

        for label in raw.vertices {
            match nodes.entry(label) {
                Entry::Occupied(entry) => {
                    return Err(GraphError::DuplicateVertex {
                        label: entry.key().to_owned(),
                    })
                }
                Entry::Vacant(entry) => {
                    let index = graph.add_node(entry.key().to_owned());
                    entry.insert(index);
                }
            }
        }

        let mut merged: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();
        let mut collapsed = 0usize;

        for edge in raw.edges {
            let lookup = |vertex: String| {
                nodes
                    .get(&vertex)
                    .copied()
                    .ok_or(GraphError::UnknownEndpoint { vertex })
            };
            let source = lookup(edge.source)?;
            let target = lookup(edge.target)?;
            let weight = edge.weight.unwrap_or(DEFAULT_WEIGHT);

            let keys = if !directed {
                vec![(source.min(target), source.max(target))]
            } else if edge.directed || source == target {
                vec![(source, target)]
            } else {
                vec![(source, target), (target, source)]
            };

            for key in keys {
                match merged.entry(key) {
                    Entry::Occupied(entry) => {
                        // later duplicates overwrite the weight of earlier ones
                        graph[*entry.get()] = weight;
                        collapsed += 1;
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(graph.add_edge(key.0, key.1, weight));
                    }
                }
            }
        }

        if collapsed > 0 {
            debug!(target: "graph", "Collapsed {} parallel edges", collapsed);
        }

        Ok(Self {
            graph,
            nodes,
            directed,
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.nodes.get(name).copied()
    }

    pub fn name(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Vertices reachable over one edge, ordered by station name.
    pub fn sorted_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let neighbors = if self.directed {
            self.graph.neighbors_directed(node, Direction::Outgoing)
        } else {
            self.graph.neighbors_undirected(node)
        };

        neighbors
            .unique()
            .sorted_by(|a, b| self.graph[*a].cmp(&self.graph[*b]))
            .collect()
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex) -> Option<EdgeIndex> {
        if self.directed {
            self.graph.find_edge(from, to)
        } else {
            self.graph
                .find_edge_undirected(from, to)
                .map(|(edge, _)| edge)
        }
    }

    /// Sets every edge weight to zero, giving accumulation an explicit baseline.
    pub fn reset_weights(&mut self) {
        self.graph
            .edge_weights_mut()
            .for_each(|weight| *weight = 0.0);
    }

    /// Adds `amount` to each edge between consecutive vertices of `path`.
    ///
    /// Returns the first pair of vertices that has no connecting edge, leaving the
    /// graph untouched in that case.
    pub fn add_along(
        &mut self,
        path: &[NodeIndex],
        amount: Weight,
    ) -> Result<(), (NodeIndex, NodeIndex)> {
        let edges = path
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| self.find_edge(from, to).ok_or((from, to)))
            .collect::<Result<Vec<_>, _>>()?;

        for edge in edges {
            self.graph[edge] += amount;
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<Weight> {
        let edge = self.find_edge(self.node(from)?, self.node(to)?)?;
        Some(self.graph[edge])
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, Weight)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
                *edge.weight(),
            )
        })
    }
}
