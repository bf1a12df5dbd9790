//! Step graph construction and reachability queries.
//!
//! The graph is built once per workflow from each step's child indices and
//! answers the expansion queries of the selection engine: all ancestors
//! (dependencies) or all descendants (dependents) of a step.

use crate::{Error, Result, StepNodeData};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

/// Render a dependency cycle as a readable chain.
///
/// The chain closes with a repetition of its first step, e.g.
/// `a.csv -> b.csv -> a.csv`.
#[must_use]
pub fn format_cycle_chain(labels: &[String]) -> String {
    labels.join(" -> ")
}

/// Directed acyclic graph over step indices.
///
/// One vertex per step, one edge `i -> j` for every child `j` of step `i`.
/// Construction rejects cyclic workflows.
#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    graph: DiGraph<usize, ()>,
    nodes: Vec<NodeIndex>,
}

impl StepGraph {
    /// Build the graph for a step sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] if a step names a child outside the
    /// sequence and [`Error::CycleDetected`] if the parent/child relation is
    /// cyclic.
    pub fn from_steps<T: StepNodeData>(steps: &[T]) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(steps.len(), steps.len());
        let nodes: Vec<NodeIndex> = (0..steps.len()).map(|index| graph.add_node(index)).collect();
        for (index, step) in steps.iter().enumerate() {
            for &child in step.child_indices() {
                let Some(&target) = nodes.get(child) else {
                    return Err(Error::invalid_index(child, steps.len()));
                };
                graph.add_edge(nodes[index], target, ());
            }
        }

        let built = Self { graph, nodes };
        if let Some(chain) = built.find_cycle() {
            let labels: Vec<String> = chain
                .iter()
                .map(|&index| steps[index].display_label())
                .collect();
            return Err(Error::cycle_detected(format_cycle_chain(&labels)));
        }
        debug!(
            steps = built.nodes.len(),
            edges = built.graph.edge_count(),
            "built step graph"
        );
        Ok(built)
    }

    /// Number of steps in the graph.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.nodes.len()
    }

    /// All strict ancestors of `index`, sorted ascending.
    ///
    /// An unknown index has no ancestors.
    #[must_use]
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        self.reachable(index, Direction::Incoming)
    }

    /// All strict descendants of `index`, sorted ascending.
    ///
    /// An unknown index has no descendants.
    #[must_use]
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        self.reachable(index, Direction::Outgoing)
    }

    /// Step indices in an order where every parent precedes its children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TopologicalSortFailed`] if petgraph cannot sort the
    /// graph; construction already rejects cycles, so this indicates a bug in
    /// the caller's step data.
    pub fn topological_sort(&self) -> Result<Vec<usize>> {
        match toposort(&self.graph, None) {
            Ok(sorted) => Ok(sorted.into_iter().map(|node| self.graph[node]).collect()),
            Err(_) => Err(Error::TopologicalSortFailed {
                reason: "petgraph toposort failed".to_string(),
            }),
        }
    }

    fn reachable(&self, index: usize, direction: Direction) -> Vec<usize> {
        let Some(&start) = self.nodes.get(index) else {
            return Vec::new();
        };
        let mut seen = vec![false; self.nodes.len()];
        seen[index] = true;
        let mut frontier = vec![start];
        let mut reached = Vec::new();
        while let Some(node) = frontier.pop() {
            for next in self.graph.neighbors_directed(node, direction) {
                let step = self.graph[next];
                if !seen[step] {
                    seen[step] = true;
                    reached.push(step);
                    frontier.push(next);
                }
            }
        }
        reached.sort_unstable();
        reached
    }

    /// Locate one cycle, returned as a step-index chain closed with the
    /// repeated index, or `None` if the graph is acyclic.
    fn find_cycle(&self) -> Option<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        let count = self.nodes.len();
        let mut marks = vec![Mark::White; count];
        let children = |index: usize| -> Vec<usize> {
            self.graph
                .neighbors_directed(self.nodes[index], Direction::Outgoing)
                .map(|node| self.graph[node])
                .collect()
        };

        for start in 0..count {
            if marks[start] != Mark::White {
                continue;
            }
            marks[start] = Mark::Gray;
            let mut path: Vec<(usize, Vec<usize>, usize)> = vec![(start, children(start), 0)];
            while let Some((_, kids, cursor)) = path.last_mut() {
                if *cursor >= kids.len() {
                    if let Some((done, _, _)) = path.pop() {
                        marks[done] = Mark::Black;
                    }
                    continue;
                }
                let next = kids[*cursor];
                *cursor += 1;
                match marks[next] {
                    Mark::White => {
                        marks[next] = Mark::Gray;
                        path.push((next, children(next), 0));
                    }
                    Mark::Gray => {
                        let mut chain: Vec<usize> = path
                            .iter()
                            .map(|(index, _, _)| *index)
                            .skip_while(|&index| index != next)
                            .collect();
                        chain.push(next);
                        return Some(chain);
                    }
                    Mark::Black => {}
                }
            }
        }
        None
    }
}
