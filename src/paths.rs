use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::graph::StationGraph;

/// Breadth-first predecessor tree rooted at one source vertex.
#[derive(Debug, Clone)]
struct PathTree {
    predecessor: Vec<Option<NodeIndex>>,
    reached: Vec<bool>,
}

/// Shortest paths (by edge count) between every pair of connected vertices.
///
/// Neighbours are expanded in ascending name order and the first discovery of a
/// vertex fixes its predecessor, so among equally short paths the one whose
/// sequence of station names is lexicographically smallest is chosen.
///
/// The index only looks at the topology of the graph it was computed from and is
/// never updated afterwards, so adding traffic to edge weights cannot change it.
#[derive(Debug, Clone)]
pub struct PathIndex {
    trees: Vec<PathTree>,
}

impl PathIndex {
    pub fn compute(graph: &StationGraph) -> Self {
        let adjacency = graph
            .node_indices()
            .map(|node| graph.sorted_neighbors(node))
            .collect::<Vec<_>>();

        let trees = graph
            .node_indices()
            .map(|source| Self::search(&adjacency, source))
            .collect();

        Self { trees }
    }

    fn search(adjacency: &[Vec<NodeIndex>], source: NodeIndex) -> PathTree {
        let mut tree = PathTree {
            predecessor: vec![None; adjacency.len()],
            reached: vec![false; adjacency.len()],
        };
        tree.reached[source.index()] = true;

        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            for &next in &adjacency[node.index()] {
                if !tree.reached[next.index()] {
                    tree.reached[next.index()] = true;
                    tree.predecessor[next.index()] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        tree
    }

    /// Vertex sequence from `from` to `to`, both included, or `None` when `to` is
    /// unreachable. A vertex's path to itself is just that vertex.
    pub fn path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        let tree = self.trees.get(from.index())?;
        if !*tree.reached.get(to.index())? {
            return None;
        }

        let mut path = vec![to];
        let mut current = to;
        while let Some(previous) = tree.predecessor[current.index()] {
            path.push(previous);
            current = previous;
        }
        path.reverse();

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::raw;

    fn names(graph: &StationGraph, path: Option<Vec<NodeIndex>>) -> Option<Vec<&str>> {
        path.map(|p| p.into_iter().map(|n| graph.name(n)).collect())
    }

    fn route<'a>(graph: &'a StationGraph, index: &PathIndex, from: &str, to: &str) -> Option<Vec<&'a str>> {
        names(
            graph,
            index.path(graph.node(from).unwrap(), graph.node(to).unwrap()),
        )
    }

    #[test]
    fn line_graph() {
        let graph = StationGraph::from_raw(
            raw(&["A", "B", "C"], &[("A", "B", None), ("B", "C", None)]),
            false,
        )
        .unwrap();
        let index = PathIndex::compute(&graph);

        assert_eq!(route(&graph, &index, "A", "C"), Some(vec!["A", "B", "C"]));
        assert_eq!(route(&graph, &index, "C", "A"), Some(vec!["C", "B", "A"]));
        assert_eq!(route(&graph, &index, "B", "B"), Some(vec!["B"]));
    }

    #[test]
    fn directed_paths_follow_arcs() {
        let graph = StationGraph::from_raw(
            raw(&["A", "B", "C"], &[("A", "B", None), ("B", "C", None)]),
            true,
        )
        .unwrap();
        let index = PathIndex::compute(&graph);

        assert_eq!(route(&graph, &index, "A", "C"), Some(vec!["A", "B", "C"]));
        assert_eq!(route(&graph, &index, "C", "A"), None);
    }

    #[test]
    fn disconnected_vertices_have_no_path() {
        let graph = StationGraph::from_raw(
            raw(&["A", "B", "Island"], &[("A", "B", None)]),
            false,
        )
        .unwrap();
        let index = PathIndex::compute(&graph);

        assert_eq!(route(&graph, &index, "A", "Island"), None);
    }

    #[test]
    fn ties_pick_lexicographically_smallest_sequence() {
        // Two equally short routes from S to T: via "Mid" or via "East".
        // The insertion order deliberately favours "Mid".
        let graph = StationGraph::from_raw(
            raw(
                &["S", "Mid", "East", "T"],
                &[("S", "Mid", None), ("Mid", "T", None), ("S", "East", None), ("East", "T", None)],
            ),
            false,
        )
        .unwrap();
        let index = PathIndex::compute(&graph);

        assert_eq!(route(&graph, &index, "S", "T"), Some(vec!["S", "East", "T"]));
        assert_eq!(route(&graph, &index, "T", "S"), Some(vec!["T", "East", "S"]));
    }

    #[test]
    fn ignores_edge_weights() {
        // A heavy direct edge is still shorter than a light two-hop detour.
        let graph = StationGraph::from_raw(
            raw(
                &["A", "B", "C"],
                &[("A", "C", Some(1000.0)), ("A", "B", Some(0.0)), ("B", "C", Some(0.0))],
            ),
            false,
        )
        .unwrap();
        let index = PathIndex::compute(&graph);

        assert_eq!(route(&graph, &index, "A", "C"), Some(vec!["A", "C"]));
    }
}
