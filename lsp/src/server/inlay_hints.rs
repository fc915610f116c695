use gossa_core::InlineDecisionMap;
use ropey::Rope;
use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, InlayHintTooltip, Position, Range};

/// One hint per decision, at the end of its source line, limited to `range`.
pub(crate) fn compute_decision_hints(content: &Rope, decisions: &InlineDecisionMap, range: Range) -> Vec<InlayHint> {
    let mut hints = Vec::new();
    for (code_line, decision) in decisions.iter() {
        let Some(line) = code_line.checked_sub(1) else {
            continue;
        };
        if line < range.start.line || line > range.end.line {
            continue;
        }
        if line as usize >= content.len_lines() {
            continue;
        }
        hints.push(InlayHint {
            position: Position::new(line, line_end_utf16(content, line as usize)),
            label: InlayHintLabel::from(format!(" {}", decision)),
            kind: Some(InlayHintKind::TYPE),
            text_edits: None,
            tooltip: decision
                .as_text()
                .map(|shape| InlayHintTooltip::String(format!("as: {}", shape))),
            padding_left: Some(false),
            padding_right: Some(false),
            data: None,
        });
    }
    hints
}

fn line_end_utf16(content: &Rope, line: usize) -> u32 {
    let text = content.line(line);
    let mut len = 0u32;
    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        len += ch.len_utf16() as u32;
    }
    len
}
