#[cfg(test)]
mod inlay_hint_tests {
    use crate::server::compute_decision_hints;
    use gossa_core::{InlineDecisionMap, parse_inline_decisions};
    use ropey::Rope;
    use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, InlayHintTooltip, Position, Range};

    const SRC: &str = "package main\n\nfunc add(a, b int) int { return a + b }\n\nfunc main() {\n\tprintln(add(1, 2))\n}\n";
    const REPORT: &str = "./main.go:3:6: can inline add with cost 4 as: func(int, int) int { return a + b }\n./main.go:5:6: cannot inline main: function too complex: cost 91 exceeds budget 80\n./main.go:6:13: inlining call to add\n";

    fn full_range(s: &str) -> Range {
        let lines = s.lines().count();
        let end_line = (lines.saturating_sub(1)) as u32;
        let end_col = s.lines().last().map(|l| l.len() as u32).unwrap_or(0);
        Range::new(Position::new(0, 0), Position::new(end_line, end_col))
    }

    fn labels(hints: &[InlayHint]) -> Vec<String> {
        hints
            .iter()
            .map(|h| match &h.label {
                InlayHintLabel::String(s) => s.clone(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_hints_sit_at_line_ends_with_shared_wording() {
        let hints = compute_decision_hints(&Rope::from_str(SRC), &parse_inline_decisions(REPORT), full_range(SRC));
        assert_eq!(
            labels(&hints),
            vec![
                " can inline add with cost 4",
                " cannot inline main: function too complex: cost 91 exceeds budget 80",
                " inlining call to add",
            ]
        );
        assert_eq!(hints[0].position, Position::new(2, 39));
        assert_eq!(hints[1].position, Position::new(4, 13));
        assert_eq!(hints[2].position, Position::new(5, 19));
        assert!(hints.iter().all(|h| h.kind == Some(InlayHintKind::TYPE)));
    }

    #[test]
    fn test_hints_outside_range_are_dropped() {
        let range = Range::new(Position::new(4, 0), Position::new(4, 20));
        let hints = compute_decision_hints(&Rope::from_str(SRC), &parse_inline_decisions(REPORT), range);
        assert_eq!(labels(&hints), vec![" cannot inline main: function too complex: cost 91 exceeds budget 80"]);
    }

    #[test]
    fn test_successful_decision_carries_shape_tooltip() {
        let hints = compute_decision_hints(&Rope::from_str(SRC), &parse_inline_decisions(REPORT), full_range(SRC));
        match &hints[0].tooltip {
            Some(InlayHintTooltip::String(s)) => assert_eq!(s, "as: func(int, int) int { return a + b }"),
            other => panic!("unexpected tooltip: {:?}", other),
        }
        assert!(hints[2].tooltip.is_none());
    }

    #[test]
    fn test_decisions_past_end_of_document_are_skipped() {
        let report = "./main.go:40:2: inlining call to add\n";
        let hints = compute_decision_hints(&Rope::from_str(SRC), &parse_inline_decisions(report), full_range(SRC));
        assert!(hints.is_empty());
    }

    #[test]
    fn test_unicode_separators_do_not_split_lines() {
        let src = "package main\n\n// a\u{2028}b\u{85}c\nfunc f() {}\n";
        let report = "./main.go:3:1: inlining call to g\n./main.go:4:6: can inline f with cost 2 as: func() {}\n";
        let hints = compute_decision_hints(&Rope::from_str(src), &parse_inline_decisions(report), full_range(src));
        assert_eq!(hints[0].position, Position::new(2, 8));
        assert_eq!(hints[1].position, Position::new(3, 11));
    }

    #[test]
    fn test_no_decisions_no_hints() {
        let hints = compute_decision_hints(&Rope::from_str(SRC), &InlineDecisionMap::new(), full_range(SRC));
        assert!(hints.is_empty());
    }
}
