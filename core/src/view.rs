use serde::{Deserialize, Serialize};

use crate::inline::InlineDecisionMap;
use crate::render::{AnnotatedLine, annotate, row_mentions_line};
use crate::ssa::SsaResult;

/// Messages delivered to a live SSA view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewEvent {
    /// Move the current-line marker to the 1-based source `line`.
    #[serde(rename_all = "camelCase")]
    Highlight { line: u32, file_name: String },
    /// Replace the whole listing, then re-apply the highlight.
    #[serde(rename = "updateSSA", rename_all = "camelCase")]
    UpdateSsa {
        ssa_text: Vec<String>,
        inline_decisions: InlineDecisionMap,
        line: Option<u32>,
        file_name: String,
    },
}

impl ViewEvent {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Highlight { file_name, .. } | Self::UpdateSsa { file_name, .. } => file_name,
        }
    }
}

/// State of one live SSA listing: a function, the file it lives in, and what is shown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SsaView {
    function: String,
    source_file_name: String,
    ssa_text: Vec<String>,
    inline_decisions: InlineDecisionMap,
    rows: Vec<AnnotatedLine>,
    highlight: Option<u32>,
}

impl SsaView {
    pub fn new(function: impl Into<String>, ssa: SsaResult, inline_decisions: InlineDecisionMap) -> Self {
        let rows = annotate(&ssa.ssa_text, &inline_decisions);
        Self {
            function: function.into(),
            source_file_name: ssa.source_file_name,
            ssa_text: ssa.ssa_text,
            inline_decisions,
            rows,
            highlight: None,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    pub fn ssa_text(&self) -> &[String] {
        &self.ssa_text
    }

    pub fn inline_decisions(&self) -> &InlineDecisionMap {
        &self.inline_decisions
    }

    pub fn rows(&self) -> &[AnnotatedLine] {
        &self.rows
    }

    pub fn highlight(&self) -> Option<u32> {
        self.highlight
    }

    /// Positions in [`SsaView::rows`] carrying the current-line marker.
    pub fn highlighted_rows(&self) -> Vec<usize> {
        let Some(line) = self.highlight else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| match row {
                AnnotatedLine::Ssa { text, .. } if row_mentions_line(text, line) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Apply an event. Events for another source file are ignored and `false` is returned.
    pub fn apply(&mut self, event: ViewEvent) -> bool {
        if event.file_name() != self.source_file_name {
            return false;
        }
        match event {
            ViewEvent::Highlight { line, .. } => {
                self.highlight = Some(line);
            }
            ViewEvent::UpdateSsa {
                ssa_text,
                inline_decisions,
                line,
                ..
            } => {
                self.rows = annotate(&ssa_text, &inline_decisions);
                self.ssa_text = ssa_text;
                self.inline_decisions = inline_decisions;
                self.highlight = line;
            }
        }
        true
    }
}
