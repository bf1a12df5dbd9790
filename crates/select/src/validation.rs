//! Workflow validation without running a selection.
//!
//! Executors call this right after parsing to surface structural problems
//! (dependency cycles, steps fighting over an output) before any target is
//! evaluated.

use crate::error::Error;
use drover_core::Workflow;
use drover_step_graph::StepGraph;
use std::collections::HashMap;

/// Result of validating a workflow's dependency structure.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// Whether the workflow is structurally sound.
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Check a workflow for dependency cycles and duplicated outputs.
///
/// The workflow must already have its indexes built.
#[must_use]
pub fn validate(workflow: &Workflow) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(error) = StepGraph::from_steps(&workflow.steps) {
        errors.push(error.into());
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();
    for step in &workflow.steps {
        for output in &step.normalized_outputs {
            let count = counts.entry(output.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                seen_order.push(output.as_str());
            }
        }
    }
    let duplicated: Vec<&str> = seen_order
        .into_iter()
        .filter(|output| counts.get(output).is_some_and(|&count| count > 1))
        .collect();
    if !duplicated.is_empty() {
        errors.push(Error::duplicated_outputs(duplicated.join(", ")));
    }

    if errors.is_empty() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::{LocalPaths, Step};

    fn indexed(steps: Vec<Step>) -> Workflow {
        let mut workflow = Workflow::new(steps);
        workflow.build_indexes(&LocalPaths::new("/work"));
        workflow
    }

    #[test]
    fn valid_workflow_passes() {
        let workflow = indexed(vec![
            Step::from_paths(&[], &["a"]),
            Step::from_paths(&["a"], &["b"]),
        ]);
        let result = validate(&workflow);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn empty_workflow_passes() {
        let result = validate(&indexed(vec![]));
        assert!(result.is_valid);
    }

    #[test]
    fn cyclic_workflow_fails() {
        let workflow = indexed(vec![
            Step::from_paths(&["b"], &["a"]),
            Step::from_paths(&["a"], &["b"]),
        ]);
        let result = validate(&workflow);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(
            result.errors[0]
                .to_string()
                .starts_with("cycle dependency detected: ")
        );
    }

    #[test]
    fn duplicated_outputs_fail() {
        let workflow = indexed(vec![
            Step::from_paths(&[], &["x"]),
            Step::from_paths(&[], &["x"]),
        ]);
        let result = validate(&workflow);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors[0].to_string(),
            "duplicated outputs: /work/x"
        );
    }
}
