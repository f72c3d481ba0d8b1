//! Marker-based rewrite rules.
//!
//! A rule locates a marker (literal substring or regex) in the in-memory file
//! content and substitutes the first occurrence. Rules never touch disk; the
//! caller decides whether the transformed content is committed.

use regex::{Captures, NoExpand, Regex};
use tracing::debug;

use crate::error::PatchError;

/// How a rule finds its anchor in the target content.
#[derive(Debug, Clone)]
pub enum Marker {
    /// Exact substring.
    Literal(String),
    /// Regular expression, possibly with capture groups.
    Pattern(Regex),
}

/// What replaces the first match of a marker.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Inserted verbatim.
    Text(String),
    /// `$1` / `${name}` expand to pattern captures. Behaves like `Text` for
    /// literal markers.
    Template(String),
    /// Computed from the matched text.
    With(fn(&str) -> String),
}

/// Result of running one rule against content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Applied(String),
    MarkerMissing,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub marker: Marker,
    pub replacement: Replacement,
    pub required: bool,
    /// Text this rule inserts. When already in the content the rule is a no-op,
    /// so rules that can match independently stay idempotent.
    pub present: Option<String>,
}

impl Rule {
    /// Required rule anchored on an exact substring.
    pub fn literal(id: &str, marker: &str, replacement: Replacement) -> Self {
        Self {
            id: id.to_string(),
            marker: Marker::Literal(marker.to_string()),
            replacement,
            required: true,
            present: None,
        }
    }

    /// Required rule anchored on a regular expression.
    pub fn pattern(id: &str, pattern: &str, replacement: Replacement) -> Result<Self, PatchError> {
        let regex = Regex::new(pattern).map_err(|source| PatchError::InvalidPattern {
            rule: id.to_string(),
            source,
        })?;
        Ok(Self {
            id: id.to_string(),
            marker: Marker::Pattern(regex),
            replacement,
            required: true,
            present: None,
        })
    }

    /// Mark the rule as optional: a missing marker is skipped instead of failing.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Skip the rule when `product` already appears in the content.
    pub fn unless_present(mut self, product: &str) -> Self {
        self.present = Some(product.to_string());
        self
    }

    /// True when this rule's product is already in `content`.
    pub fn is_present(&self, content: &str) -> bool {
        self.present
            .as_deref()
            .is_some_and(|product| content.contains(product))
    }

    /// Substitute the first marker occurrence in `content`.
    pub fn apply(&self, content: &str) -> RuleOutcome {
        match &self.marker {
            Marker::Literal(marker) => {
                let Some(start) = content.find(marker.as_str()) else {
                    return RuleOutcome::MarkerMissing;
                };
                let end = start + marker.len();
                let inserted = match &self.replacement {
                    Replacement::Text(text) | Replacement::Template(text) => text.clone(),
                    Replacement::With(f) => f(&content[start..end]),
                };
                let mut out = String::with_capacity(content.len() + inserted.len());
                out.push_str(&content[..start]);
                out.push_str(&inserted);
                out.push_str(&content[end..]);
                RuleOutcome::Applied(out)
            }
            Marker::Pattern(regex) => {
                if !regex.is_match(content) {
                    return RuleOutcome::MarkerMissing;
                }
                let out = match &self.replacement {
                    Replacement::Text(text) => {
                        regex.replacen(content, 1, NoExpand(text.as_str()))
                    }
                    Replacement::Template(template) => {
                        regex.replacen(content, 1, template.as_str())
                    }
                    Replacement::With(f) => {
                        regex.replacen(content, 1, |caps: &Captures| f(&caps[0]))
                    }
                };
                RuleOutcome::Applied(out.into_owned())
            }
        }
    }
}

/// Ordered rules for one target file plus the sentinel that marks it patched.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Substring whose presence means the file was already patched.
    pub sentinel: String,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Sentinel present, or some rule's product already in `content`.
    pub fn already_applied(&self, content: &str) -> bool {
        is_patched(content, &self.sentinel)
            || self.rules.iter().any(|rule| rule.is_present(content))
    }
}

/// In-memory result of applying a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub content: String,
    /// Rule ids that matched, in declaration order.
    pub applied: Vec<String>,
    /// Optional rule ids whose marker was absent.
    pub skipped: Vec<String>,
    /// Rule ids whose product was already in the content.
    pub present: Vec<String>,
}

/// Idempotence check: true when `content` already carries the sentinel.
pub fn is_patched(content: &str, sentinel: &str) -> bool {
    content.contains(sentinel)
}

/// Apply `rules` in order to `content`.
///
/// Each rule sees the output of the previous one. The first required rule
/// whose marker is missing aborts the whole transform.
pub fn apply_rules(content: &str, rules: &[Rule]) -> Result<Transform, PatchError> {
    let mut current = content.to_string();
    let mut applied = Vec::new();
    let mut skipped = Vec::new();
    let mut present = Vec::new();
    for rule in rules {
        if rule.is_present(&current) {
            debug!(rule = %rule.id, "product already present");
            present.push(rule.id.clone());
            continue;
        }
        match rule.apply(&current) {
            RuleOutcome::Applied(next) => {
                debug!(rule = %rule.id, "rule applied");
                current = next;
                applied.push(rule.id.clone());
            }
            RuleOutcome::MarkerMissing if rule.required => {
                debug!(rule = %rule.id, "required marker missing");
                return Err(PatchError::MarkerNotFound(rule.id.clone()));
            }
            RuleOutcome::MarkerMissing => {
                debug!(rule = %rule.id, "optional marker missing, skipped");
                skipped.push(rule.id.clone());
            }
        }
    }
    Ok(Transform {
        content: current,
        applied,
        skipped,
        present,
    })
}
