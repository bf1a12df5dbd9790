//! Step selection for drover workflows.
//!
//! Given an indexed [`Workflow`](drover_core::Workflow) and a list of user
//! target expressions, this crate computes the ordered list of steps to run:
//!
//! 1. [`ParsedTarget::parse`] splits each target into build/tree qualifiers
//!    and a match body.
//! 2. The matcher resolves the body against the workflow's lookup indexes
//!    (by output path, `%tag`, `name()` method, `@regex`, or the `...`
//!    wildcard).
//! 3. Each match expands along its tree qualifier: up to its ancestors (the
//!    default), down to its descendants (`^`), or not at all (`=`).
//! 4. The merger folds every expansion in user order, applying `-` exclusions
//!    and `+` forced builds, and emits a topologically valid plan.
//!
//! # Example
//!
//! ```
//! use drover_core::{LocalPaths, Step, Workflow};
//! use drover_select::Selector;
//!
//! let mut workflow = Workflow::new(vec![
//!     Step::from_paths(&[], &["raw.csv"]),
//!     Step::from_paths(&["raw.csv"], &["clean.csv"]),
//!     Step::from_paths(&["clean.csv"], &["report.html"]),
//! ]);
//! let paths = LocalPaths::new("/work");
//! workflow.build_indexes(&paths);
//!
//! let mut selector = Selector::new(&workflow, &paths);
//! let plan = selector.select(&["report.html"]).unwrap();
//! assert_eq!(plan.indices(), vec![0, 1, 2]);
//! ```

mod engine;
mod error;
mod expand;
mod matcher;
mod merge;
mod target;
mod validation;

pub use engine::{Selection, Selector};
pub use error::{Error, Result};
pub use expand::{ExpandedTarget, expand_step, expand_target};
pub use matcher::{MatchedTarget, match_target};
pub use merge::SelectedStep;
pub use target::{Build, MatchKind, ParsedTarget, TreeMode};
pub use validation::{ValidationResult, validate};
