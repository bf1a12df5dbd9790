//! Tree expansion of matched steps.
//!
//! A matched step grows into the list of steps its tree qualifier implies:
//! itself plus all ancestors (up), itself plus all descendants (down), or
//! itself alone (only). The walk preserves a useful order for the merger:
//! down-expansion yields descendants before the step itself, up-expansion
//! yields ancestors root-first with the step last, so dependencies always
//! enter the fold before their dependents. Diamond shapes may repeat steps;
//! the merger collapses duplicates.

use crate::error::Result;
use crate::matcher::MatchedTarget;
use crate::target::{Build, MatchKind, TreeMode};
use drover_core::Workflow;
use drover_step_graph::{Error as GraphError, format_cycle_chain};
use std::collections::HashSet;
use tracing::trace;

/// One entry of an expanded target, ready for merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedTarget {
    /// Index of the step to select.
    pub index: usize,
    /// Build qualifier inherited from the originating target.
    pub build: Build,
    /// The originating step keeps its match kind; steps pulled in by
    /// expansion are treated as output matches.
    pub match_kind: MatchKind,
}

/// Expand a matched target along its tree qualifier.
///
/// An unqualified target expands up-tree, except exclusions: `-x` removes
/// exactly the matched step, so an unqualified exclusion does not expand.
/// Explicit `^`/`=` sigils are always honored.
///
/// # Errors
///
/// Fails with a cycle error if the walk revisits a step already on the
/// current chain.
pub fn expand_target(
    workflow: &Workflow,
    matched: &MatchedTarget,
    valid: Option<&HashSet<usize>>,
) -> Result<Vec<ExpandedTarget>> {
    let tree = matched.tree.unwrap_or(if matched.build == Build::Exclude {
        TreeMode::Only
    } else {
        TreeMode::Up
    });
    let indices = expand_step(workflow, matched.index, tree, valid)?;
    Ok(indices
        .into_iter()
        .map(|index| ExpandedTarget {
            index,
            build: matched.build,
            match_kind: if index == matched.index {
                matched.match_kind
            } else {
                MatchKind::Output
            },
        })
        .collect())
}

/// Expand a step index along a tree mode.
///
/// With a `valid` restriction the result is intersected with that set, and an
/// out-of-set starting step expands to nothing.
///
/// # Errors
///
/// Fails with a cycle error if the walk revisits a step already on the
/// current chain; the message names the offending steps in order.
pub fn expand_step(
    workflow: &Workflow,
    index: usize,
    tree: TreeMode,
    valid: Option<&HashSet<usize>>,
) -> Result<Vec<usize>> {
    if let Some(valid) = valid
        && !valid.contains(&index)
    {
        return Ok(Vec::new());
    }
    match tree {
        TreeMode::Only => Ok(vec![index]),
        TreeMode::Up | TreeMode::Down => {
            let walked = walk(workflow, index, tree == TreeMode::Down)?;
            trace!(index, ?tree, expanded = walked.len(), "expanded step");
            Ok(match valid {
                Some(valid) => walked
                    .into_iter()
                    .filter(|step| valid.contains(step))
                    .collect(),
                None => walked,
            })
        }
    }
}

/// Depth-first walk over parents (up) or children (down), driven by an
/// explicit frame stack so deep chains cannot overflow the call stack.
///
/// A step is emitted when its frame is popped, so every adjacent subtree
/// leads and the step itself trails: for down the deepest descendants lead,
/// for up the roots lead. The frames on the stack are the current chain; a
/// step reappearing on it is a cycle.
fn walk(workflow: &Workflow, start: usize, down: bool) -> Result<Vec<usize>> {
    let mut expanded = Vec::new();
    // (step index, cursor into its adjacency list)
    let mut path: Vec<(usize, usize)> = vec![(start, 0)];
    while let Some(frame) = path.last_mut() {
        let (index, cursor) = *frame;
        let step = &workflow.steps[index];
        let kids: &[usize] = if down { &step.children } else { &step.parents };
        if cursor >= kids.len() {
            path.pop();
            expanded.push(index);
            continue;
        }
        frame.1 += 1;
        let next = kids[cursor];
        if path.iter().any(|&(on_chain, _)| on_chain == next) {
            let labels: Vec<String> = path
                .iter()
                .map(|&(on_chain, _)| on_chain)
                .chain(std::iter::once(next))
                .map(|chained| workflow.steps[chained].display_string())
                .collect();
            return Err(GraphError::cycle_detected(format_cycle_chain(&labels)).into());
        }
        path.push((next, 0));
    }
    Ok(expanded)
}
