use std::fmt::Write as _;

use gossa_core::InlineDecisionMap;
use serde::Serialize;

/// Inlining decisions of one file, as printed by `gossa inline`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineReport {
    pub(crate) file_name: String,
    pub(crate) inline_decisions: InlineDecisionMap,
}

impl InlineReport {
    pub(crate) fn new(file_name: String, inline_decisions: InlineDecisionMap) -> Self {
        Self {
            file_name,
            inline_decisions,
        }
    }

    /// `<line>: <decision>` per entry, in line order.
    pub(crate) fn to_text(&self) -> String {
        let mut out = String::new();
        if self.inline_decisions.is_empty() {
            let _ = writeln!(out, "No inlining decisions for {}", self.file_name);
            return out;
        }
        for (line, decision) in self.inline_decisions.iter() {
            let _ = writeln!(out, "{}: {}", line, decision);
        }
        out
    }
}
