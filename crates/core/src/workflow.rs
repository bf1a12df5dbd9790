//! The workflow parse tree and its lookup indexes.
//!
//! A [`Workflow`] is the ordered step sequence the parser produced plus the
//! reverse-lookup maps the selection engine matches targets against. The
//! indexes are built once, right after parse, and are immutable afterwards:
//! [`Workflow::build_indexes`] derives canonical path forms, the lookup maps,
//! and the parent/child edges; [`Workflow::assign_dirs`] then gives every
//! step a unique working directory.

use crate::config::SelectOptions;
use crate::error::{Error, Result};
use crate::paths::{Paths, slash_clean};
use crate::step::Step;
use std::collections::HashMap;
use tracing::debug;

/// Longest allowed step directory name, in bytes.
pub const MAX_PATH: usize = 200;

/// Reverse lookup maps over a workflow's steps.
///
/// Every value list holds step indices deduplicated preserving first
/// appearance, so declaration order is recoverable from any entry.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    /// Path under raw, slash-cleaned, or normalized form → producing steps.
    /// Used for literal target matching.
    pub output_lookup: HashMap<String, Vec<usize>>,

    /// Path under raw or slash-cleaned form only → producing steps. Used for
    /// regex matching so paths are matched as the user declared them.
    pub output_lookup_regex: HashMap<String, Vec<usize>>,

    /// Output tag → steps carrying it.
    pub output_tags: HashMap<String, Vec<usize>>,

    /// Input tag → steps carrying it.
    pub input_tags: HashMap<String, Vec<usize>>,

    /// Method name → steps running it.
    pub methods: HashMap<String, Vec<usize>>,

    /// Canonical output path → producing steps.
    pub normalized_outputs: HashMap<String, Vec<usize>>,

    /// Canonical input path → consuming steps.
    pub normalized_inputs: HashMap<String, Vec<usize>>,
}

/// An ordered sequence of steps plus the lookup indexes built over them.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    /// Steps in declaration order.
    pub steps: Vec<Step>,

    /// Reverse lookup maps, filled by [`Workflow::build_indexes`].
    pub lookups: Lookups,
}

impl Workflow {
    /// Wrap a parsed step sequence. Indexes are not built yet.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            lookups: Lookups::default(),
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the workflow has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Build the lookup indexes and wire parent/child edges.
    ///
    /// Derives each step's normalized input/output forms via `paths`, builds
    /// the reverse multimaps, and annotates each step with the indices of its
    /// parents (producers of its inputs, by path or tag) and children
    /// (consumers of its outputs).
    pub fn build_indexes(&mut self, paths: &impl Paths) {
        for step in &mut self.steps {
            step.normalized_outputs = step.outputs.iter().map(|o| paths.normalize(o)).collect();
            step.normalized_inputs = step.inputs.iter().map(|i| paths.normalize(i)).collect();
        }

        let steps = &self.steps;
        let lookups = Lookups {
            output_tags: reverse_multimap(steps, |s| s.output_tags.clone()),
            input_tags: reverse_multimap(steps, |s| s.input_tags.clone()),
            methods: reverse_multimap(steps, |s| s.options.method.iter().cloned().collect()),
            normalized_outputs: reverse_multimap(steps, |s| s.normalized_outputs.clone()),
            normalized_inputs: reverse_multimap(steps, |s| s.normalized_inputs.clone()),
            output_lookup_regex: merge_distinct([
                reverse_multimap(steps, |s| s.raw_outputs.clone()),
                reverse_multimap(steps, |s| s.raw_outputs.iter().map(|o| slash_clean(o)).collect()),
                reverse_multimap(steps, |s| s.outputs.clone()),
                reverse_multimap(steps, |s| s.outputs.iter().map(|o| slash_clean(o)).collect()),
            ]),
            ..Lookups::default()
        };
        let lookups = Lookups {
            output_lookup: merge_distinct([
                lookups.output_lookup_regex.clone(),
                lookups.normalized_outputs.clone(),
            ]),
            ..lookups
        };

        let edges: Vec<(Vec<usize>, Vec<usize>)> = self
            .steps
            .iter()
            .map(|step| {
                let mut parents = Vec::new();
                for input in &step.normalized_inputs {
                    push_all_distinct(&mut parents, lookups.normalized_outputs.get(input));
                }
                for tag in &step.input_tags {
                    push_all_distinct(&mut parents, lookups.output_tags.get(tag));
                }
                let mut children = Vec::new();
                for output in &step.normalized_outputs {
                    push_all_distinct(&mut children, lookups.normalized_inputs.get(output));
                }
                for tag in &step.output_tags {
                    push_all_distinct(&mut children, lookups.input_tags.get(tag));
                }
                (parents, children)
            })
            .collect();
        for (step, (parents, children)) in self.steps.iter_mut().zip(edges) {
            step.parents = parents;
            step.children = children;
        }

        debug!(
            steps = self.steps.len(),
            output_keys = lookups.output_lookup.len(),
            tags = lookups.output_tags.len() + lookups.input_tags.len(),
            methods = lookups.methods.len(),
            "indexed workflow"
        );
        self.lookups = lookups;
    }

    /// Assign each step a unique, length-bounded working directory.
    ///
    /// Directory names are derived from the step's raw outputs and output
    /// tags under the configured temp directory, truncated to [`MAX_PATH`]
    /// bytes; colliding names are disambiguated with `.0`, `.1`, … suffixes
    /// in declaration order.
    ///
    /// # Errors
    ///
    /// Fails if the temp directory itself already reaches [`MAX_PATH`].
    pub fn assign_dirs(&mut self, options: &SelectOptions, paths: &impl Paths) -> Result<()> {
        let root = paths.absolute(&options.tmp_dir);
        if root.len() >= MAX_PATH {
            return Err(Error::directory_too_long(root));
        }

        let names: Vec<String> = self
            .steps
            .iter()
            .map(|step| {
                let parts: Vec<String> = step
                    .raw_outputs
                    .iter()
                    .chain(step.output_tags.iter())
                    .map(|part| part.replace('/', "_"))
                    .collect();
                truncate_to(format!("{root}/{}", parts.join(",")), MAX_PATH)
            })
            .collect();

        let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, name) in names.iter().enumerate() {
            groups.entry(name).or_default().push(index);
        }
        let mut suffixed: HashMap<usize, usize> = HashMap::new();
        for members in groups.values() {
            if members.len() > 1 {
                for (ordinal, &index) in members.iter().enumerate() {
                    suffixed.insert(index, ordinal);
                }
            }
        }

        for (index, (step, name)) in self.steps.iter_mut().zip(names).enumerate() {
            step.dir = match suffixed.get(&index) {
                Some(ordinal) => format!("{name}.{ordinal}"),
                None => name,
            };
        }
        Ok(())
    }
}

/// Map every key produced by `keys` to the steps producing it, deduplicated
/// preserving first appearance.
fn reverse_multimap<F>(steps: &[Step], keys: F) -> HashMap<String, Vec<usize>>
where
    F: Fn(&Step) -> Vec<String>,
{
    let mut map: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, step) in steps.iter().enumerate() {
        for key in keys(step) {
            let entry = map.entry(key).or_default();
            if !entry.contains(&index) {
                entry.push(index);
            }
        }
    }
    map
}

/// Union per-key index lists across maps, preserving first appearance
/// left-to-right.
fn merge_distinct(
    maps: impl IntoIterator<Item = HashMap<String, Vec<usize>>>,
) -> HashMap<String, Vec<usize>> {
    let mut merged: HashMap<String, Vec<usize>> = HashMap::new();
    for map in maps {
        for (key, indices) in map {
            let entry = merged.entry(key).or_default();
            for index in indices {
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }
    }
    merged
}

fn push_all_distinct(into: &mut Vec<usize>, indices: Option<&Vec<usize>>) {
    for &index in indices.into_iter().flatten() {
        if !into.contains(&index) {
            into.push(index);
        }
    }
}

/// Truncate to at most `max` bytes on a char boundary.
fn truncate_to(mut name: String, max: usize) -> String {
    if name.len() > max {
        let mut cut = max;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
    }
    name
}
