//! Resolve parsed targets to step indices.
//!
//! Each match kind reads from a pair of lookup maps: a literal map for exact
//! bodies and a regex map scanned for `@`-bodies and wildcards. Output
//! targets use the two output lookups so literal matches also find the
//! slash-cleaned and normalized spellings, while regex matches only ever see
//! paths in the form the user declared them.

use crate::error::{Error, Result};
use crate::target::{Build, MatchKind, ParsedTarget, REGEX_MARKER, TreeMode, WILDCARD};
use drover_core::{Paths, Workflow, slash_clean};
use regex::Regex;
use std::collections::HashMap;
use tracing::trace;

/// A target resolved to one originating step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedTarget {
    /// Index of the matched step.
    pub index: usize,
    /// Build qualifier carried from the target.
    pub build: Build,
    /// Tree qualifier carried from the target, `None` when unqualified.
    pub tree: Option<TreeMode>,
    /// How the target addressed the step.
    pub match_kind: MatchKind,
}

/// Resolve a parsed target to the steps it addresses, in declaration order.
///
/// # Errors
///
/// Fails with [`Error::TargetNotFound`] when nothing matches and
/// [`Error::InvalidRegex`] when a `@`-body does not compile.
pub fn match_target(
    workflow: &Workflow,
    paths: &impl Paths,
    target: &ParsedTarget,
) -> Result<Vec<MatchedTarget>> {
    let indices = match_indices(workflow, paths, target)?;
    if indices.is_empty() {
        return Err(Error::target_not_found(&target.name));
    }
    trace!(
        target = %target.name,
        matched = indices.len(),
        "matched target"
    );
    Ok(indices
        .into_iter()
        .map(|index| MatchedTarget {
            index,
            build: target.build,
            tree: target.tree,
            match_kind: target.match_kind,
        })
        .collect())
}

fn match_indices(
    workflow: &Workflow,
    paths: &impl Paths,
    target: &ParsedTarget,
) -> Result<Vec<usize>> {
    let lookups = &workflow.lookups;
    let (literal, regex_map): (
        &HashMap<String, Vec<usize>>,
        &HashMap<String, Vec<usize>>,
    ) = match target.match_kind {
        MatchKind::Tag => (&lookups.output_tags, &lookups.output_tags),
        MatchKind::Method => (&lookups.methods, &lookups.methods),
        MatchKind::Output => (&lookups.output_lookup, &lookups.output_lookup_regex),
    };

    let body = target.match_string.as_str();
    let dots = body == WILDCARD;
    let is_regex = body.starts_with(REGEX_MARKER);

    if target.match_kind == MatchKind::Output && dots && !is_regex {
        return Ok((0..workflow.len()).collect());
    }

    if !is_regex && !dots {
        let mut found = Vec::new();
        let mut keys = vec![body.to_string()];
        if target.match_kind == MatchKind::Output {
            keys.push(slash_clean(body));
            keys.push(paths.normalize(body));
        }
        for key in keys {
            for &index in literal.get(&key).into_iter().flatten() {
                if !found.contains(&index) {
                    found.push(index);
                }
            }
        }
        return Ok(found);
    }

    let pattern = if dots {
        None
    } else {
        let source = body.strip_prefix(REGEX_MARKER).unwrap_or(body);
        Some(Regex::new(source).map_err(|error| Error::invalid_regex(source, error))?)
    };
    let mut found: Vec<usize> = regex_map
        .iter()
        .filter(|(key, _)| pattern.as_ref().is_none_or(|re| re.is_match(key)))
        .flat_map(|(_, indices)| indices.iter().copied())
        .collect();
    found.sort_unstable();
    found.dedup();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::{LocalPaths, Step, StepOptions};

    fn workflow() -> Workflow {
        let mut steps = vec![
            Step::from_paths(&[], &["raw/a.csv"]),
            Step::from_paths(&["raw/a.csv"], &["clean//a.csv"]),
            Step::from_paths(&["clean//a.csv"], &["report.html"]),
        ];
        steps[0].output_tags = vec!["raw".to_string()];
        steps[2].options = StepOptions {
            method: Some("render".to_string()),
        };
        let mut workflow = Workflow::new(steps);
        workflow.build_indexes(&LocalPaths::new("/work"));
        workflow
    }

    fn indices(target: &str) -> Result<Vec<usize>> {
        let workflow = workflow();
        let parsed = ParsedTarget::parse(target);
        match_target(&workflow, &LocalPaths::new("/work"), &parsed)
            .map(|matched| matched.iter().map(|m| m.index).collect())
    }

    #[test]
    fn literal_output_match() {
        assert_eq!(indices("raw/a.csv").unwrap(), vec![0]);
        assert_eq!(indices("report.html").unwrap(), vec![2]);
    }

    #[test]
    fn literal_match_covers_cleaned_and_normalized_forms() {
        // declared with doubled slash, matched with a single one
        assert_eq!(indices("clean/a.csv").unwrap(), vec![1]);
        // absolute normalized spelling
        assert_eq!(indices("/work/clean/a.csv").unwrap(), vec![1]);
    }

    #[test]
    fn tag_match() {
        assert_eq!(indices("%raw").unwrap(), vec![0]);
    }

    #[test]
    fn method_match() {
        assert_eq!(indices("render()").unwrap(), vec![2]);
    }

    #[test]
    fn regex_match_returns_declaration_order() {
        assert_eq!(indices("@.*\\.csv").unwrap(), vec![0, 1]);
        assert_eq!(indices("@.*").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn regex_never_sees_normalized_paths() {
        assert!(matches!(
            indices("@^/work/.*"),
            Err(Error::TargetNotFound { .. })
        ));
    }

    #[test]
    fn wildcard_selects_every_step() {
        assert_eq!(indices("...").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn tag_wildcard_selects_tagged_steps_only() {
        assert_eq!(indices("%...").unwrap(), vec![0]);
    }

    #[test]
    fn method_wildcard_selects_stepped_methods() {
        assert_eq!(indices("...()").unwrap(), vec![2]);
    }

    #[test]
    fn missing_target_fails() {
        let err = indices("nope.csv").unwrap_err();
        assert_eq!(err.to_string(), "target not found: nope.csv");
    }

    #[test]
    fn missing_tag_reports_sigiled_name() {
        let err = indices("%nope").unwrap_err();
        assert_eq!(err.to_string(), "target not found: %nope");
    }

    #[test]
    fn invalid_regex_fails() {
        assert!(matches!(
            indices("@[unclosed"),
            Err(Error::InvalidRegex { .. })
        ));
    }

    #[test]
    fn qualifiers_ride_along() {
        let workflow = workflow();
        let parsed = ParsedTarget::parse("+^%raw");
        let matched = match_target(&workflow, &LocalPaths::new("/work"), &parsed).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].build, Build::Forced);
        assert_eq!(matched[0].tree, Some(TreeMode::Down));
        assert_eq!(matched[0].match_kind, MatchKind::Tag);
    }
}
