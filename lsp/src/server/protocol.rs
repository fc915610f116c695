use gossa_core::{AnnotatedLine, InlineDecisionMap, SsaView};
use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::Url;

pub(crate) const SHOW_SSA_COMMAND: &str = "goSsaExplorer.showSSA";
pub(crate) const TOGGLE_INLINING_COMMAND: &str = "goSsaExplorer.toggleInliningDecisions";
pub(crate) const SELECTION_CHANGED_METHOD: &str = "goSsaExplorer/selectionChanged";

/// Client -> server: the cursor moved. `line` is 0-based, as in LSP positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectionChangedParams {
    pub(crate) uri: Url,
    pub(crate) line: u32,
}

/// Server -> client: move the current-line marker of one SSA view.
pub(crate) enum HighlightNotification {}

impl Notification for HighlightNotification {
    type Params = HighlightParams;
    const METHOD: &'static str = "goSsaExplorer/highlight";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HighlightParams {
    pub(crate) function: String,
    pub(crate) line: u32,
    pub(crate) file_name: String,
    pub(crate) highlighted_rows: Vec<usize>,
}

impl HighlightParams {
    pub(crate) fn from_view(view: &SsaView, line: u32) -> Self {
        Self {
            function: view.function().to_string(),
            line,
            file_name: view.source_file_name().to_string(),
            highlighted_rows: view.highlighted_rows(),
        }
    }
}

/// Server -> client: replace the whole listing of one SSA view.
pub(crate) enum UpdateSsaNotification {}

impl Notification for UpdateSsaNotification {
    type Params = UpdateSsaParams;
    const METHOD: &'static str = "goSsaExplorer/updateSSA";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateSsaParams {
    pub(crate) function: String,
    pub(crate) ssa: String,
    pub(crate) inline_decisions: InlineDecisionMap,
    pub(crate) rendered: Vec<AnnotatedLine>,
    pub(crate) line: Option<u32>,
    pub(crate) file_name: String,
    pub(crate) highlighted_rows: Vec<usize>,
}

impl UpdateSsaParams {
    pub(crate) fn from_view(view: &SsaView) -> Self {
        Self {
            function: view.function().to_string(),
            ssa: view.ssa_text().join("\n"),
            inline_decisions: view.inline_decisions().clone(),
            rendered: view.rows().to_vec(),
            line: view.highlight(),
            file_name: view.source_file_name().to_string(),
            highlighted_rows: view.highlighted_rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossa_core::{parse_inline_decisions, SsaResult};

    #[test]
    fn update_params_mirror_the_view() {
        let ssa = SsaResult {
            ssa_text: vec!["v1 (3) a".into(), "v2 (4) b".into()],
            source_file_name: "/main.go".into(),
        };
        let view = SsaView::new("pkg.F", ssa, parse_inline_decisions("./main.go:4:2: inlining call to g\n"));
        let params = UpdateSsaParams::from_view(&view);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["fileName"], "/main.go");
        assert_eq!(json["ssa"], "v1 (3) a\nv2 (4) b");
        assert_eq!(json["inlineDecisions"]["4"]["name"], "g");
        assert_eq!(json["rendered"].as_array().map(|r| r.len()), Some(3));
        assert_eq!(json["line"], serde_json::Value::Null);
    }

    #[test]
    fn selection_params_accept_client_shape() {
        let params: SelectionChangedParams =
            serde_json::from_value(serde_json::json!({ "uri": "file:///w/main.go", "line": 9 })).unwrap();
        assert_eq!(params.line, 9);
        assert_eq!(params.uri.path(), "/w/main.go");
    }
}
