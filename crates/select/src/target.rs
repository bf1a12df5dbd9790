//! The target expression grammar.
//!
//! A target is the string a user types to select steps:
//!
//! ```text
//! target    := build? tree? body
//! build     := "+" | "-"
//! tree      := "^" | "="
//! body      := tag | method | output
//! tag       := "%" ident_or_regex_or_dots
//! method    := ident_or_regex_or_dots "()"
//! output    := ident_or_regex_or_dots
//! regex-form:= "@" regex-source
//! wildcard  := "..."
//! ```
//!
//! Qualifiers are peeled left to right: first the build marker, then the tree
//! marker, then the body is classified by its own sigils. Note the legacy
//! tree mapping: an *unqualified* target expands up-tree, while `^` selects
//! the down-tree and `=` the matched step alone.

use serde::{Deserialize, Serialize};

/// Marker introducing a regular-expression body.
pub const REGEX_MARKER: char = '@';

/// Wildcard body matching everything.
pub const WILDCARD: &str = "...";

/// Build qualifier peeled from the front of a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Build {
    /// `+`: run the step regardless of timestamps.
    Forced,
    /// `-`: remove the step from the selection.
    Exclude,
    /// No marker: let the executor decide from timestamps.
    #[default]
    Timestamped,
}

/// Tree qualifier controlling how a matched step expands.
///
/// An unqualified target carries no tree mode; the expander treats that as
/// [`TreeMode::Up`], except for exclusions, which apply to the matched step
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    /// Expand to the step and all its ancestors.
    Up,
    /// `^`: expand to the step and all its descendants.
    Down,
    /// `=`: the matched step alone.
    Only,
}

/// How a target body addresses steps.
///
/// The ordering encodes merge precedence: a method match outranks a tag
/// match, which outranks an output match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Match against produced output paths.
    Output,
    /// `%name`: match against output tags.
    Tag,
    /// `name()`: match against step methods.
    Method,
}

/// A target expression split into its qualifiers and match body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    /// The body as typed, after qualifier sigils are peeled.
    pub name: String,
    /// Build qualifier.
    pub build: Build,
    /// Tree qualifier, `None` when no sigil was given.
    pub tree: Option<TreeMode>,
    /// Body classification.
    pub match_kind: MatchKind,
    /// The body with its kind sigil removed (`%` or trailing `()`).
    pub match_string: String,
}

impl ParsedTarget {
    /// Parse a single target expression.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (build, rest) = if let Some(rest) = raw.strip_prefix('+') {
            (Build::Forced, rest)
        } else if let Some(rest) = raw.strip_prefix('-') {
            (Build::Exclude, rest)
        } else {
            (Build::Timestamped, raw)
        };

        let (tree, body) = if let Some(body) = rest.strip_prefix('^') {
            (Some(TreeMode::Down), body)
        } else if let Some(body) = rest.strip_prefix('=') {
            (Some(TreeMode::Only), body)
        } else {
            (None, rest)
        };

        let (match_kind, match_string) = if let Some(tag) = body.strip_prefix('%') {
            (MatchKind::Tag, tag.to_string())
        } else if let Some(method) = body.strip_suffix("()") {
            (MatchKind::Method, method.to_string())
        } else {
            (MatchKind::Output, body.to_string())
        };

        Self {
            name: body.to_string(),
            build,
            tree,
            match_kind,
            match_string,
        }
    }

    /// Parse a list of target expressions in user order.
    pub fn parse_all<S: AsRef<str>>(targets: &[S]) -> Vec<Self> {
        targets
            .iter()
            .map(|target| Self::parse(target.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_output_defaults() {
        let target = ParsedTarget::parse("out.csv");
        assert_eq!(target.build, Build::Timestamped);
        assert_eq!(target.tree, None);
        assert_eq!(target.match_kind, MatchKind::Output);
        assert_eq!(target.match_string, "out.csv");
        assert_eq!(target.name, "out.csv");
    }

    #[test]
    fn build_markers() {
        assert_eq!(ParsedTarget::parse("+x").build, Build::Forced);
        assert_eq!(ParsedTarget::parse("-x").build, Build::Exclude);
        assert_eq!(ParsedTarget::parse("x").build, Build::Timestamped);
    }

    #[test]
    fn tree_markers_follow_build() {
        let down = ParsedTarget::parse("+^x");
        assert_eq!(down.build, Build::Forced);
        assert_eq!(down.tree, Some(TreeMode::Down));
        assert_eq!(down.match_string, "x");

        let only = ParsedTarget::parse("-=x");
        assert_eq!(only.build, Build::Exclude);
        assert_eq!(only.tree, Some(TreeMode::Only));
    }

    #[test]
    fn caret_means_down_tree() {
        // legacy mapping: unqualified is up, the sigil selects down
        assert_eq!(ParsedTarget::parse("^x").tree, Some(TreeMode::Down));
        assert_eq!(ParsedTarget::parse("x").tree, None);
        assert_eq!(ParsedTarget::parse("=x").tree, Some(TreeMode::Only));
    }

    #[test]
    fn tag_bodies() {
        let target = ParsedTarget::parse("^%clean");
        assert_eq!(target.tree, Some(TreeMode::Down));
        assert_eq!(target.match_kind, MatchKind::Tag);
        assert_eq!(target.match_string, "clean");
        assert_eq!(target.name, "%clean");
    }

    #[test]
    fn method_bodies() {
        let target = ParsedTarget::parse("convert()");
        assert_eq!(target.match_kind, MatchKind::Method);
        assert_eq!(target.match_string, "convert");
        assert_eq!(target.name, "convert()");
    }

    #[test]
    fn regex_and_wildcard_pass_through() {
        assert_eq!(ParsedTarget::parse("@.*\\.csv").match_string, "@.*\\.csv");
        assert_eq!(ParsedTarget::parse("...").match_string, WILDCARD);
        assert_eq!(ParsedTarget::parse("%...").match_kind, MatchKind::Tag);
        assert_eq!(ParsedTarget::parse("@up.*()").match_kind, MatchKind::Method);
        assert_eq!(ParsedTarget::parse("@up.*()").match_string, "@up.*");
    }

    #[test]
    fn sigils_are_peeled_at_most_once() {
        // a second '+' is part of the body, not a second qualifier
        let target = ParsedTarget::parse("++x");
        assert_eq!(target.build, Build::Forced);
        assert_eq!(target.match_string, "+x");
        // '^' before '=' consumes the tree slot; '=' stays in the body
        let target = ParsedTarget::parse("^=x");
        assert_eq!(target.tree, Some(TreeMode::Down));
        assert_eq!(target.match_string, "=x");
    }

    #[test]
    fn match_kind_precedence_order() {
        assert!(MatchKind::Method > MatchKind::Tag);
        assert!(MatchKind::Tag > MatchKind::Output);
    }
}
