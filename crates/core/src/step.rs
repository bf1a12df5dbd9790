//! The step model.
//!
//! A step is a declared unit of work: it consumes inputs (paths or tags),
//! produces outputs (paths or tags), and optionally names a method that runs
//! it. The parser hands the engine steps with the raw and expanded string
//! forms filled in; the index builder derives the canonical forms and the
//! parent/child edges.

use drover_step_graph::StepNodeData;
use serde::{Deserialize, Serialize};

/// Options bag attached to a step by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOptions {
    /// Named handler used to run the step, targetable as `name()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// A unit of work declared by the workflow file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Output paths exactly as written in the workflow file.
    #[serde(default)]
    pub raw_outputs: Vec<String>,

    /// Output paths after parser expansion (base prefixes applied).
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Input paths exactly as written.
    #[serde(default)]
    pub raw_inputs: Vec<String>,

    /// Input paths after parser expansion.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Symbolic labels on outputs, stored without the `%` sigil.
    #[serde(default)]
    pub output_tags: Vec<String>,

    /// Symbolic labels on inputs, stored without the `%` sigil.
    #[serde(default)]
    pub input_tags: Vec<String>,

    /// Parser-provided options.
    #[serde(default)]
    pub options: StepOptions,

    /// Canonical forms of `outputs`, filled by the index builder.
    #[serde(default)]
    pub normalized_outputs: Vec<String>,

    /// Canonical forms of `inputs`, filled by the index builder.
    #[serde(default)]
    pub normalized_inputs: Vec<String>,

    /// Indices of steps whose outputs this step consumes.
    #[serde(default)]
    pub parents: Vec<usize>,

    /// Indices of steps consuming this step's outputs.
    #[serde(default)]
    pub children: Vec<usize>,

    /// Unique working directory, filled by the directory namer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir: String,
}

impl Step {
    /// Step whose raw and expanded path forms coincide (no parser rewriting).
    #[must_use]
    pub fn from_paths(inputs: &[&str], outputs: &[&str]) -> Self {
        let inputs: Vec<String> = inputs.iter().map(|s| (*s).to_string()).collect();
        let outputs: Vec<String> = outputs.iter().map(|s| (*s).to_string()).collect();
        Self {
            raw_outputs: outputs.clone(),
            outputs,
            raw_inputs: inputs.clone(),
            inputs,
            ..Self::default()
        }
    }

    /// The step's method name, if any.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.options.method.as_deref()
    }

    /// Display form used in cycle chains and log lines.
    ///
    /// Comma-joined raw outputs, falling back to `%tag` forms for steps that
    /// only produce tags.
    #[must_use]
    pub fn display_string(&self) -> String {
        if self.raw_outputs.is_empty() {
            self.output_tags
                .iter()
                .map(|tag| format!("%{tag}"))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            self.raw_outputs.join(", ")
        }
    }
}

impl StepNodeData for Step {
    fn child_indices(&self) -> &[usize] {
        &self.children
    }

    fn display_label(&self) -> String {
        self.display_string()
    }
}
