//! Intent classification for free-text analytics queries
//!
//! An ordered list of (pattern, intent, capture group) rules evaluated top to
//! bottom; the first matching rule wins. The order matters because patterns
//! overlap: a query naming an organization and mentioning completion rates
//! must resolve to the organization rule, which is checked first.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Which aggregation a query maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Badge enrollment summary, optionally filtered by badge name
    BadgeEnrollments,
    /// Organization trend summary, optionally filtered by organization name
    OrganizationTrends,
    /// Completion metrics across badge and organization
    CompletionMetrics,
    /// Learning path analysis
    LearningPaths,
}

/// A classified query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    pub kind: IntentKind,
    /// Name captured from the query (badge or organization), if the rule has one
    pub parameter: Option<String>,
}

struct IntentRule {
    pattern: Regex,
    kind: IntentKind,
    /// Index of the capture group holding the extracted name
    capture: Option<usize>,
}

/// Regex-based query classifier with fixed rule priority
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl std::fmt::Debug for IntentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentClassifier")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Build the classifier with its fixed rule order:
    /// badge counts, organization counts, trends, completion rates, learning paths
    pub fn new() -> Self {
        let rules = vec![
            IntentRule {
                pattern: compile(r#"(?i)(how many|enrollments?|users?).+(?:badge|course)\s+["']?([^"']+)["']?"#),
                kind: IntentKind::BadgeEnrollments,
                capture: Some(2),
            },
            IntentRule {
                pattern: compile(r#"(?i)(how many|enrollments?|users?).+(?:organization|org)\s+["']?([^"']+)["']?"#),
                kind: IntentKind::OrganizationTrends,
                capture: Some(2),
            },
            IntentRule {
                pattern: compile(r"(?i)(trend|over time|historical)"),
                kind: IntentKind::OrganizationTrends,
                capture: None,
            },
            IntentRule {
                pattern: compile(r"(?i)(completion|success).+(rate|percentage)"),
                kind: IntentKind::CompletionMetrics,
                capture: None,
            },
            IntentRule {
                pattern: compile(r"(?i)(learning path|badge combination|journey)"),
                kind: IntentKind::LearningPaths,
                capture: None,
            },
        ];

        Self { rules }
    }

    /// Classify a query, returning None when no rule matches
    pub fn classify(&self, query: &str) -> Option<QueryIntent> {
        for rule in &self.rules {
            if let Some(captures) = rule.pattern.captures(query) {
                let parameter = rule
                    .capture
                    .and_then(|group| captures.get(group))
                    .map(|m| m.as_str().trim().to_string());

                debug!(kind = ?rule.kind, parameter = ?parameter, "Query classified");
                return Some(QueryIntent {
                    kind: rule.kind,
                    parameter,
                });
            }
        }

        debug!("Query did not match any intent rule");
        None
    }
}

/// Compile a rule pattern. The patterns are fixed at build time, so failure
/// here is a programming error, not a runtime condition.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("intent rule pattern must compile")
}
