//! Step dependency DAG for the drover selection engine.
//!
//! This crate provides a directed acyclic graph over step *indices* using
//! petgraph: one vertex per step, one edge `i -> j` for every child `j` of
//! step `i`. The selection engine uses it for ancestor/descendant expansion
//! and for ordering queries.
//!
//! # Key Types
//!
//! - [`StepGraph`]: the graph structure with reachability queries
//! - [`StepNodeData`]: trait step types implement to be graphed
//!
//! # Example
//!
//! ```
//! use drover_step_graph::{StepGraph, StepNodeData};
//!
//! struct Node {
//!     children: Vec<usize>,
//! }
//!
//! impl StepNodeData for Node {
//!     fn child_indices(&self) -> &[usize] {
//!         &self.children
//!     }
//!     fn display_label(&self) -> String {
//!         "node".to_string()
//!     }
//! }
//!
//! let steps = vec![
//!     Node { children: vec![1] },
//!     Node { children: vec![] },
//! ];
//! let graph = StepGraph::from_steps(&steps).unwrap();
//! assert_eq!(graph.descendants(0), vec![1]);
//! assert_eq!(graph.ancestors(1), vec![0]);
//! ```

mod error;
mod graph;

pub use error::{Error, Result};
pub use graph::{StepGraph, format_cycle_chain};

/// Trait for step data that can be stored in a step graph.
pub trait StepNodeData {
    /// Indices of steps consuming this step's outputs.
    fn child_indices(&self) -> &[usize];

    /// Human-readable label used in cycle chains.
    fn display_label(&self) -> String;
}
