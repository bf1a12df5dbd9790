//! Property-based tests for selection invariants.
//!
//! These tests verify the behavioral contracts of the selection engine:
//! - Selections are topologically valid
//! - Exclusion subtracts exactly the excluded step
//! - Forcing a step never changes the selected set
//! - Selection is deterministic
//! - Assigned step directories are unique

use drover_core::{LocalPaths, SelectOptions, Step, Workflow};
use drover_select::{Build, Selection, Selector};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Strategies for generating workflows
// =============================================================================

/// Generate dependency lists for an acyclic workflow.
///
/// Step `i` may only consume outputs of steps `0..i`, so the generated
/// workflow is a DAG by construction. Step `i` produces `out_i`.
fn deps_strategy(
    min_steps: usize,
    max_steps: usize,
) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (min_steps..=max_steps).prop_flat_map(|step_count| {
        let dep_strategies: Vec<BoxedStrategy<Vec<usize>>> = (0..step_count)
            .map(|i| {
                if i == 0 {
                    Just(vec![]).boxed()
                } else {
                    proptest::collection::vec(0..i, 0..=i.min(3))
                        .prop_map(|deps| {
                            let mut deps: Vec<usize> =
                                deps.into_iter().collect::<HashSet<_>>().into_iter().collect();
                            deps.sort_unstable();
                            deps
                        })
                        .boxed()
                }
            })
            .collect();
        dep_strategies
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn output_name(index: usize) -> String {
    format!("out_{index}")
}

fn build_workflow(deps: &[Vec<usize>]) -> Workflow {
    let steps: Vec<Step> = deps
        .iter()
        .enumerate()
        .map(|(index, dep_list)| {
            let inputs: Vec<String> = dep_list.iter().map(|&d| output_name(d)).collect();
            let outputs = vec![output_name(index)];
            Step {
                raw_outputs: outputs.clone(),
                outputs,
                raw_inputs: inputs.clone(),
                inputs,
                ..Step::default()
            }
        })
        .collect();
    let mut workflow = Workflow::new(steps);
    workflow.build_indexes(&LocalPaths::new("/data"));
    workflow
}

fn run_select(workflow: &Workflow, targets: &[String]) -> Selection {
    let paths = LocalPaths::new("/data");
    let mut selector = Selector::new(workflow, &paths);
    selector
        .select(targets)
        .expect("selection should succeed for a generated DAG")
}

/// All transitive dependencies of `start`, excluding `start` itself.
fn transitive_deps(deps: &[Vec<usize>], start: usize) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut frontier = vec![start];
    while let Some(index) = frontier.pop() {
        for &dep in &deps[index] {
            if seen.insert(dep) {
                frontier.push(dep);
            }
        }
    }
    seen
}

fn positions(selection: &Selection) -> HashMap<usize, usize> {
    selection
        .indices()
        .into_iter()
        .enumerate()
        .map(|(position, index)| (index, position))
        .collect()
}

// =============================================================================
// Property Tests: Topological Soundness
// =============================================================================

proptest! {
    /// Contract: the wildcard selects every step in a valid topological order.
    #[test]
    fn wildcard_selects_all_steps_topologically(deps in deps_strategy(1, 15)) {
        let workflow = build_workflow(&deps);
        let selection = run_select(&workflow, &["...".to_string()]);

        prop_assert_eq!(selection.len(), deps.len(), "every step should be selected");

        let pos = positions(&selection);
        for (index, dep_list) in deps.iter().enumerate() {
            for &dep in dep_list {
                prop_assert!(
                    pos[&dep] < pos[&index],
                    "dependency {} (pos {}) should precede {} (pos {})",
                    dep, pos[&dep], index, pos[&index]
                );
            }
        }
    }

    /// Contract: naming one output selects exactly its up-tree, in order.
    #[test]
    fn single_target_selects_its_up_tree(
        (deps, target) in deps_strategy(2, 15)
            .prop_flat_map(|deps| {
                let count = deps.len();
                (Just(deps), 0..count)
            })
    ) {
        let workflow = build_workflow(&deps);
        let selection = run_select(&workflow, &[output_name(target)]);

        let mut expected = transitive_deps(&deps, target);
        expected.insert(target);
        let selected: HashSet<usize> = selection.indices().into_iter().collect();
        prop_assert_eq!(selected, expected, "up-tree of {} mismatch", target);

        let pos = positions(&selection);
        for &index in pos.keys() {
            for &dep in &deps[index] {
                prop_assert!(pos[&dep] < pos[&index]);
            }
        }
    }
}

// =============================================================================
// Property Tests: Exclusion and Forcing
// =============================================================================

proptest! {
    /// Contract: appending "-X" subtracts exactly X from the selection.
    #[test]
    fn exclusion_subtracts_exactly_one_step(
        (deps, excluded) in deps_strategy(2, 15)
            .prop_flat_map(|deps| {
                let count = deps.len();
                (Just(deps), 0..count)
            })
    ) {
        let workflow = build_workflow(&deps);
        let base = run_select(&workflow, &["...".to_string()]);
        let reduced = run_select(
            &workflow,
            &["...".to_string(), format!("-{}", output_name(excluded))],
        );

        let mut expected: HashSet<usize> = base.indices().into_iter().collect();
        expected.remove(&excluded);
        let reduced_set: HashSet<usize> = reduced.indices().into_iter().collect();
        prop_assert_eq!(reduced_set, expected);

        // relative order of the survivors is unchanged
        let survivors: Vec<usize> = base
            .indices()
            .into_iter()
            .filter(|&index| index != excluded)
            .collect();
        prop_assert_eq!(reduced.indices(), survivors);
    }

    /// Contract: appending "+X" keeps the selected set and forces X.
    #[test]
    fn forcing_keeps_the_selected_set(
        (deps, forced) in deps_strategy(2, 15)
            .prop_flat_map(|deps| {
                let count = deps.len();
                (Just(deps), 0..count)
            })
    ) {
        let workflow = build_workflow(&deps);
        let base = run_select(&workflow, &["...".to_string()]);
        let with_force = run_select(
            &workflow,
            &["...".to_string(), format!("+{}", output_name(forced))],
        );

        let base_set: HashSet<usize> = base.indices().into_iter().collect();
        let forced_set: HashSet<usize> = with_force.indices().into_iter().collect();
        prop_assert_eq!(base_set, forced_set, "forcing must not change the set");

        let record = with_force
            .steps()
            .iter()
            .find(|s| s.index == forced)
            .expect("forced step should stay selected");
        prop_assert_eq!(record.build, Build::Forced);
    }
}

// =============================================================================
// Property Tests: Determinism
// =============================================================================

proptest! {
    /// Contract: identical target lists yield identical ordered results.
    #[test]
    fn selection_is_deterministic(deps in deps_strategy(1, 12)) {
        let workflow = build_workflow(&deps);
        let targets = vec!["@out_.*".to_string()];
        let first = run_select(&workflow, &targets);
        let second = run_select(&workflow, &targets);
        prop_assert_eq!(first.indices(), second.indices());
    }
}

// =============================================================================
// Property Tests: Directory Assignment
// =============================================================================

proptest! {
    /// Contract: assigned step directories are pairwise distinct.
    #[test]
    fn assigned_dirs_are_unique(deps in deps_strategy(1, 20)) {
        let paths = LocalPaths::new("/data");
        let mut workflow = build_workflow(&deps);
        workflow
            .assign_dirs(&SelectOptions::new("/tmp/drover"), &paths)
            .expect("dir assignment should succeed");

        let mut seen = HashSet::new();
        for step in &workflow.steps {
            prop_assert!(!step.dir.is_empty(), "every step gets a dir");
            prop_assert!(
                seen.insert(step.dir.clone()),
                "duplicate dir {}", step.dir
            );
        }
    }
}
