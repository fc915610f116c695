//! Inlining decisions reported by `go build -gcflags=-m=2`.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};


/// Inlining budget of the gc compiler as of go1.25. Only used for display.
pub const MAX_INLINE_BUDGET: u32 = 80;

static RE_SUCCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+):\s+can inline (?P<name>\S+) with cost (?P<cost>\d+) as: (?P<text>.+)$",
    )
    .unwrap()
});
static RE_FAILURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+): cannot inline (?P<name>\S+):\s*(?P<reason>.*)$").unwrap()
});
static RE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<file>.+?):(?P<line>\d+):(?P<col>\d+): inlining call to (?P<name>\S+)$").unwrap()
});
static RE_COST: Lazy<Regex> = Lazy::new(|| Regex::new(r"cost (?P<cost>\d+)").unwrap());

/// One compiler verdict about one function or call site at one source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DecisionRecord", into = "DecisionRecord")]
pub enum InlineDecision {
    /// The function itself is inlinable.
    CanInline { name: String, cost: String, as_text: String },
    /// The function is not inlinable. `cost` is absent for reasons that carry none
    /// (e.g. `marked go:noinline`).
    CannotInline {
        name: String,
        reason: String,
        cost: Option<String>,
    },
    /// A call site was inlined.
    InlinedCall { name: String },
}

impl InlineDecision {
    pub fn name(&self) -> &str {
        match self {
            Self::CanInline { name, .. } | Self::CannotInline { name, .. } | Self::InlinedCall { name } => name,
        }
    }

    pub fn can_inline(&self) -> bool {
        matches!(self, Self::CanInline { .. })
    }

    pub fn is_inlined(&self) -> bool {
        matches!(self, Self::InlinedCall { .. })
    }

    pub fn cost(&self) -> Option<&str> {
        match self {
            Self::CanInline { cost, .. } => Some(cost),
            Self::CannotInline { cost, .. } => cost.as_deref(),
            Self::InlinedCall { .. } => None,
        }
    }

    /// The optimizer's rewritten call shape; only present on successful decisions.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::CanInline { as_text, .. } => Some(as_text),
            _ => None,
        }
    }

    pub fn max_budget(&self) -> u32 {
        MAX_INLINE_BUDGET
    }
}

/// The one formatting of a decision, shared by the SSA view and the inlay hints.
impl fmt::Display for InlineDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CanInline { name, cost, .. } => write!(f, "can inline {} with cost {}", name, cost),
            Self::InlinedCall { name } => write!(f, "inlining call to {}", name),
            Self::CannotInline {
                name, cost: Some(cost), ..
            } => write!(
                f,
                "cannot inline {}: function too complex: cost {} exceeds budget {}",
                name, cost, MAX_INLINE_BUDGET
            ),
            Self::CannotInline { name, reason, cost: None } => write!(f, "cannot inline {}: {}", name, reason),
        }
    }
}

/// Wire shape of a decision, as consumed by editor front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecisionRecord {
    name: String,
    can_inline: bool,
    is_inlined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost: Option<String>,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    as_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(default = "default_budget")]
    max_budget: u32,
}

fn default_budget() -> u32 {
    MAX_INLINE_BUDGET
}

impl From<InlineDecision> for DecisionRecord {
    fn from(decision: InlineDecision) -> Self {
        let can_inline = decision.can_inline();
        let is_inlined = decision.is_inlined();
        match decision {
            InlineDecision::CanInline { name, cost, as_text } => Self {
                name,
                can_inline,
                is_inlined,
                cost: Some(cost),
                as_text: Some(as_text),
                reason: None,
                max_budget: MAX_INLINE_BUDGET,
            },
            InlineDecision::CannotInline { name, reason, cost } => Self {
                name,
                can_inline,
                is_inlined,
                cost,
                as_text: None,
                reason: Some(reason),
                max_budget: MAX_INLINE_BUDGET,
            },
            InlineDecision::InlinedCall { name } => Self {
                name,
                can_inline,
                is_inlined,
                cost: None,
                as_text: None,
                reason: None,
                max_budget: MAX_INLINE_BUDGET,
            },
        }
    }
}

impl From<DecisionRecord> for InlineDecision {
    fn from(record: DecisionRecord) -> Self {
        if record.can_inline {
            InlineDecision::CanInline {
                name: record.name,
                cost: record.cost.unwrap_or_default(),
                as_text: record.as_text.unwrap_or_default(),
            }
        } else if record.is_inlined {
            InlineDecision::InlinedCall { name: record.name }
        } else {
            InlineDecision::CannotInline {
                name: record.name,
                reason: record.reason.unwrap_or_default(),
                cost: record.cost,
            }
        }
    }
}

/// Decisions of one source file keyed by 1-based line number.
///
/// A line holds exactly one decision: inserting again replaces the earlier entry wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineDecisionMap {
    by_line: BTreeMap<u32, InlineDecision>,
}

impl InlineDecisionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: u32, decision: InlineDecision) -> Option<InlineDecision> {
        self.by_line.insert(line, decision)
    }

    pub fn get(&self, line: u32) -> Option<&InlineDecision> {
        self.by_line.get(&line)
    }

    pub fn len(&self) -> usize {
        self.by_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Entries in ascending line order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &InlineDecision)> {
        self.by_line.iter().map(|(line, decision)| (*line, decision))
    }
}

impl FromIterator<(u32, InlineDecision)> for InlineDecisionMap {
    fn from_iter<I: IntoIterator<Item = (u32, InlineDecision)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (line, decision) in iter {
            map.insert(line, decision);
        }
        map
    }
}

/// Classify a single diagnostic line. Returns the 1-based source line and its decision.
pub fn classify_line(line: &str) -> Option<(u32, InlineDecision)> {
    if let Some(caps) = RE_SUCCESS.captures(line) {
        let code_line = caps["line"].parse().ok()?;
        return Some((
            code_line,
            InlineDecision::CanInline {
                name: caps["name"].to_string(),
                cost: caps["cost"].to_string(),
                as_text: caps["text"].to_string(),
            },
        ));
    }

    if let Some(caps) = RE_FAILURE.captures(line) {
        let code_line = caps["line"].parse().ok()?;
        let reason = caps["reason"].trim_end();
        let cost = RE_COST.captures(reason).map(|c| c["cost"].to_string());
        return Some((
            code_line,
            InlineDecision::CannotInline {
                name: caps["name"].to_string(),
                reason: reason.to_string(),
                cost,
            },
        ));
    }

    if let Some(caps) = RE_CALL.captures(line) {
        let code_line = caps["line"].parse().ok()?;
        return Some((
            code_line,
            InlineDecision::InlinedCall {
                name: caps["name"].to_string(),
            },
        ));
    }

    None
}

/// Parse the diagnostic stream of a single-file `-m=2` build.
///
/// Lines that match no known shape are skipped; later diagnostics for a line win.
pub fn parse_inline_decisions(diagnostics: &str) -> InlineDecisionMap {
    let mut map = InlineDecisionMap::new();
    for line in diagnostics.lines() {
        if let Some((code_line, decision)) = classify_line(line) {
            map.insert(code_line, decision);
        }
    }
    map
}
