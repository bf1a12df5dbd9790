//! Step and workflow model for the drover selection engine.
//!
//! drover is the step-selection core of a data-processing workflow tool:
//! given a parsed workflow of steps with input/output dependencies, compute
//! which steps a set of user targets selects and in what order. This crate
//! holds the model side of that: the [`Step`] type, the [`Workflow`] parse
//! tree with its reverse-lookup indexes, the per-step working-directory
//! assignment, and the [`Paths`] collaborator the engine normalizes paths
//! through.
//!
//! Workflow file parsing, filesystem adapters, and step execution live in the
//! surrounding tool; this crate only models what they hand over.

mod config;
mod error;
pub mod paths;
mod step;
mod workflow;

pub use config::SelectOptions;
pub use error::{Error, Result};
pub use paths::{LocalPaths, Paths, slash_clean};
pub use step::{Step, StepOptions};
pub use workflow::{Lookups, MAX_PATH, Workflow};
