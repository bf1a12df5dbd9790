//! Fold expanded targets into an ordered selection.
//!
//! The merger walks the expanded entries in user order and maintains one
//! record per selected step. Exclusions remove records, duplicates upgrade
//! the existing record in place, and a newly selected step is positioned
//! before the earliest already-selected step that depends on it, so the final
//! sort by position is always a valid execution order.

use crate::error::{Error, Result};
use crate::expand::ExpandedTarget;
use crate::target::{Build, MatchKind};
use drover_core::Workflow;
use drover_step_graph::StepGraph;
use std::collections::HashMap;

/// Ordering decrement applied when a step must precede an already-selected
/// dependent. Safe up to roughly a million steps.
const POS_EPSILON: f64 = 1e-7;

/// A step chosen by the merger, with its ordering key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedStep {
    /// Index into the workflow's step sequence.
    pub index: usize,
    /// Build classification for the executor.
    pub build: Build,
    /// How the user addressed this step.
    pub match_kind: MatchKind,
    /// Ordering key; the selection is sorted by this.
    pub pos: f64,
}

/// Fold expanded targets into the final ordered step list.
///
/// `down_memo` caches each step's down-set (itself plus all descendants)
/// across calls, so repeated selections against one workflow traverse the
/// graph once per distinct step.
///
/// # Errors
///
/// Fails with [`Error::DuplicatedOutputs`] if two selected steps produce the
/// same normalized output.
pub fn merge_targets(
    workflow: &Workflow,
    entries: &[ExpandedTarget],
    graph: &StepGraph,
    down_memo: &mut HashMap<usize, Vec<usize>>,
) -> Result<Vec<SelectedStep>> {
    // slots keep insertion order; exclusion tombstones a slot
    let mut slots: Vec<Option<SelectedStep>> = Vec::new();
    let mut by_index: HashMap<usize, usize> = HashMap::new();
    let mut next_pos = 0.0_f64;

    for entry in entries {
        if entry.build == Build::Exclude {
            if let Some(slot) = by_index.remove(&entry.index) {
                slots[slot] = None;
            }
            next_pos += 1.0;
        } else if let Some(&slot) = by_index.get(&entry.index) {
            if let Some(existing) = slots[slot].as_mut() {
                existing.build = if existing.build == Build::Forced || entry.build == Build::Forced
                {
                    Build::Forced
                } else {
                    Build::Timestamped
                };
                existing.match_kind = existing.match_kind.max(entry.match_kind);
            }
        } else {
            let earliest = all_down_descendants(graph, down_memo, entry.index)
                .iter()
                .filter_map(|dep| {
                    by_index
                        .get(dep)
                        .and_then(|&slot| slots[slot].as_ref())
                        .map(|selected| selected.pos)
                })
                .reduce(f64::min);
            let pos = earliest.map_or(next_pos, |min| min - POS_EPSILON);
            by_index.insert(entry.index, slots.len());
            slots.push(Some(SelectedStep {
                index: entry.index,
                build: entry.build,
                match_kind: entry.match_kind,
                pos,
            }));
            next_pos += 1.0;
        }
    }

    let mut selected: Vec<SelectedStep> = slots.into_iter().flatten().collect();
    selected.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    check_output_conflicts(workflow, &selected)?;
    Ok(selected)
}

/// A step's down-set: itself plus all descendants, memoized per index.
fn all_down_descendants<'memo>(
    graph: &StepGraph,
    memo: &'memo mut HashMap<usize, Vec<usize>>,
    index: usize,
) -> &'memo [usize] {
    memo.entry(index).or_insert_with(|| {
        let mut down = graph.descendants(index);
        down.push(index);
        down.sort_unstable();
        down
    })
}

/// Fail if any normalized output is produced by more than one selected step.
fn check_output_conflicts(workflow: &Workflow, selected: &[SelectedStep]) -> Result<()> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();
    for step in selected {
        for output in &workflow.steps[step.index].normalized_outputs {
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
    if duplicated.is_empty() {
        Ok(())
    } else {
        Err(Error::duplicated_outputs(duplicated.join(", ")))
    }
}
