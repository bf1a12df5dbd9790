//! Selection orchestration.
//!
//! [`Selector`] binds the four selection stages together for one indexed
//! workflow: parse the targets, match each against the lookup indexes, expand
//! every match along its tree qualifier, and merge the expansions into an
//! ordered plan. The step graph and the per-step down-sets are built lazily
//! on the first call and reused across calls.

use crate::error::Result;
use crate::expand::{ExpandedTarget, expand_target};
use crate::matcher::match_target;
use crate::merge::{SelectedStep, merge_targets};
use crate::target::ParsedTarget;
use drover_core::{Paths, Workflow};
use drover_step_graph::StepGraph;
use std::collections::HashMap;
use tracing::debug;

/// The ordered result of a selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    steps: Vec<SelectedStep>,
}

impl Selection {
    /// The selected steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[SelectedStep] {
        &self.steps
    }

    /// The selected step indices in execution order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.steps.iter().map(|step| step.index).collect()
    }

    /// Number of selected steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the selected steps in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, SelectedStep> {
        self.steps.iter()
    }
}

impl<'selection> IntoIterator for &'selection Selection {
    type Item = &'selection SelectedStep;
    type IntoIter = std::slice::Iter<'selection, SelectedStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Step selection engine bound to one indexed workflow.
///
/// The selector is synchronous and single-threaded; its only state is the
/// memoized step graph and down-sets. Give each workflow its own selector.
pub struct Selector<'workflow, P: Paths> {
    workflow: &'workflow Workflow,
    paths: &'workflow P,
    graph: Option<StepGraph>,
    down_memo: HashMap<usize, Vec<usize>>,
}

impl<'workflow, P: Paths> Selector<'workflow, P> {
    /// Create a selector over an indexed workflow.
    ///
    /// The workflow must already have its indexes built; a selector never
    /// mutates it.
    #[must_use]
    pub fn new(workflow: &'workflow Workflow, paths: &'workflow P) -> Self {
        Self {
            workflow,
            paths,
            graph: None,
            down_memo: HashMap::new(),
        }
    }

    /// Compute the ordered list of steps to run for the given targets.
    ///
    /// Targets are applied in user order: matches expand along their tree
    /// qualifiers, later targets can force or exclude earlier selections, and
    /// the result is a topologically valid execution order.
    ///
    /// # Errors
    ///
    /// Fails when a target matches nothing, a regex body does not compile,
    /// the workflow turns out to be cyclic, or two selected steps produce the
    /// same output.
    pub fn select<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<Selection> {
        let workflow = self.workflow;
        let parsed = ParsedTarget::parse_all(targets);

        let mut expanded: Vec<ExpandedTarget> = Vec::new();
        for target in &parsed {
            let matched = match_target(workflow, self.paths, target)?;
            debug!(
                target = %target.name,
                matched = matched.len(),
                "resolved target"
            );
            for matched_target in &matched {
                expanded.extend(expand_target(workflow, matched_target, None)?);
            }
        }

        let graph = match &mut self.graph {
            Some(graph) => graph,
            slot => slot.insert(StepGraph::from_steps(&workflow.steps)?),
        };
        let steps = merge_targets(workflow, &expanded, graph, &mut self.down_memo)?;
        debug!(targets = parsed.len(), selected = steps.len(), "selected");
        Ok(Selection { steps })
    }
}
