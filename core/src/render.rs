use std::collections::HashSet;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::inline::InlineDecisionMap;

static CODE_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*(\d+)\s*\)").unwrap());

/// One row of the annotated SSA listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AnnotatedLine {
    /// Inlining verdict for `source_line`, placed before the first SSA row of that line.
    #[serde(rename_all = "camelCase")]
    Decision { source_line: u32, text: String },
    /// An SSA row; `index` is its position in the SSA body.
    #[serde(rename_all = "camelCase")]
    Ssa {
        index: usize,
        source_line: Option<u32>,
        text: String,
    },
}

impl AnnotatedLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Decision { text, .. } | Self::Ssa { text, .. } => text,
        }
    }
}

/// Source line encoded in an SSA row as `(N)`, with optional inner whitespace.
pub fn extract_code_line(line: &str) -> Option<u32> {
    let caps = CODE_LINE_RE.captures(line.trim())?;
    caps[1].parse().ok()
}

/// True when an SSA row belongs to the 1-based source `line`.
pub fn row_mentions_line(text: &str, line: u32) -> bool {
    text.contains(&format!("({})", line))
}

/// Interleave SSA rows with inlining decisions. Each source line is annotated
/// once per pass, right before its first SSA row.
pub fn annotate<S: AsRef<str>>(ssa_text: &[S], decisions: &InlineDecisionMap) -> Vec<AnnotatedLine> {
    let mut seen: HashSet<u32> = HashSet::new();
    let mut out = Vec::with_capacity(ssa_text.len());
    for (index, line) in ssa_text.iter().enumerate() {
        let line = line.as_ref();
        let source_line = extract_code_line(line);
        if let Some(code_line) = source_line
            && let Some(decision) = decisions.get(code_line)
            && seen.insert(code_line)
        {
            out.push(AnnotatedLine::Decision {
                source_line: code_line,
                text: decision.to_string(),
            });
        }
        out.push(AnnotatedLine::Ssa {
            index,
            source_line,
            text: line.to_string(),
        });
    }
    out
}

/// Plain-text listing for terminals. Highlighted rows start with `>`, decisions with `#`.
pub fn render_plain(rows: &[AnnotatedLine], highlight: Option<u32>, show_decisions: bool) -> String {
    let mut out = String::new();
    for row in rows {
        match row {
            AnnotatedLine::Decision { text, .. } => {
                if show_decisions {
                    let _ = writeln!(out, "  # {}", text);
                }
            }
            AnnotatedLine::Ssa { text, .. } => {
                let marker = match highlight {
                    Some(line) if row_mentions_line(text, line) => '>',
                    _ => ' ',
                };
                let _ = writeln!(out, "{} {}", marker, text);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::InlineDecision;

    fn sample_decisions() -> InlineDecisionMap {
        [
            (
                10,
                InlineDecision::CanInline {
                    name: "foo".into(),
                    cost: "5".into(),
                    as_text: "func() {}".into(),
                },
            ),
            (11, InlineDecision::InlinedCall { name: "baz".into() }),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn extracts_parenthesized_line_numbers() {
        assert_eq!(extract_code_line("v1 (10) foo"), Some(10));
        assert_eq!(extract_code_line("   v4 ( 42 ) = Add64"), Some(42));
        assert_eq!(extract_code_line("00002 (+7) RET"), None);
        assert_eq!(extract_code_line("b1:"), None);
    }

    #[test]
    fn each_source_line_is_annotated_once() {
        let ssa = ["v1 (10) foo", "v2 (10) bar", "v3 (11) baz"];
        let rows = annotate(&ssa, &sample_decisions());
        let texts: Vec<&str> = rows.iter().map(|r| r.text()).collect();
        assert_eq!(
            texts,
            vec![
                "can inline foo with cost 5",
                "v1 (10) foo",
                "v2 (10) bar",
                "inlining call to baz",
                "v3 (11) baz",
            ]
        );
    }

    #[test]
    fn rows_without_decisions_pass_through() {
        let ssa = ["b1:", "v1 (3) = InitMem <mem>"];
        let rows = annotate(&ssa, &sample_decisions());
        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[1], AnnotatedLine::Ssa { index: 1, source_line: Some(3), .. }));
    }

    #[test]
    fn plain_rendering_marks_highlight_and_hides_decisions_on_request() {
        let ssa = ["v1 (10) foo", "v3 (11) baz"];
        let rows = annotate(&ssa, &sample_decisions());
        let shown = render_plain(&rows, Some(11), true);
        assert!(shown.contains("  # can inline foo with cost 5\n"));
        assert!(shown.contains("> v3 (11) baz\n"));
        assert!(shown.contains("  v1 (10) foo\n"));

        let hidden = render_plain(&rows, None, false);
        assert!(!hidden.contains('#'));
    }

    #[test]
    fn rows_serialize_with_kind_tag() {
        let rows = annotate(&["v1 (11) x"], &sample_decisions());
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["kind"], "decision");
        assert_eq!(json[0]["sourceLine"], 11);
        assert_eq!(json[1]["kind"], "ssa");
        assert_eq!(json[1]["index"], 0);
    }
}
