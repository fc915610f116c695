use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::info;

use super::{
    inlay_hints::compute_decision_hints,
    paths::workspace_root,
    protocol::{SHOW_SSA_COMMAND, TOGGLE_INLINING_COMMAND},
    state::{Document, GoSsaLanguageServer},
};

fn is_go_document(uri: &Url) -> bool {
    uri.path().ends_with(".go")
}

#[tower_lsp::async_trait]
impl LanguageServer for GoSsaLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = workspace_root(&params);
        info!("Go SSA Explorer initializing with workspace root: {:?}", root);
        if let Ok(mut guard) = self.workspace_root.lock() {
            *guard = root;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    will_save: None,
                    will_save_wait_until: None,
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(false),
                    })),
                })),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                inlay_hint_provider: Some(OneOf::Right(InlayHintServerCapabilities::Options(InlayHintOptions {
                    work_done_progress_options: Default::default(),
                    resolve_provider: Some(false),
                }))),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![SHOW_SSA_COMMAND.to_string(), TOGGLE_INLINING_COMMAND.to_string()],
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Go SSA Explorer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Go SSA Explorer initialized");
        self.client
            .log_message(MessageType::INFO, "Go SSA Explorer started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Go SSA Explorer shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version: params.text_document.version,
        };
        self.documents.insert(params.text_document.uri, document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let mut entry = self.documents.entry(uri).or_default();
        if params.text_document.version < entry.version {
            return;
        }
        entry.version = params.text_document.version;
        // full sync: the last change holds the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            entry.content = Rope::from_str(&change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if is_go_document(&params.text_document.uri) {
            self.schedule_refresh(params.text_document.uri);
        }
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        if !is_go_document(&uri) {
            return Ok(None);
        }
        Ok(Some(vec![CodeLens {
            range: Range::new(Position::new(0, 0), Position::new(0, 0)),
            command: Some(Command {
                title: "Toggle Inlining Decisions".to_string(),
                command: TOGGLE_INLINING_COMMAND.to_string(),
                arguments: Some(vec![serde_json::Value::String(uri.to_string())]),
            }),
            data: None,
        }]))
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let enabled = self.config.lock().unwrap().inlay_hints_enabled;
        if !enabled {
            return Ok(None);
        }
        let uri = &params.text_document.uri;
        let Some(file_name) = self.file_name_of(uri) else {
            return Ok(None);
        };
        let Some(decisions) = self.hints.decisions(&file_name) else {
            return Ok(None);
        };
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };
        let hints = compute_decision_hints(&doc.content, &decisions, params.range);
        Ok((!hints.is_empty()).then_some(hints))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<serde_json::Value>> {
        let first_arg = params
            .arguments
            .first()
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        match params.command.as_str() {
            SHOW_SSA_COMMAND => {
                // a dismissed prompt arrives as no argument or an empty string
                if let Some(function) = first_arg {
                    self.show_ssa(&function).await;
                }
            }
            TOGGLE_INLINING_COMMAND => match first_arg.as_deref().map(Url::parse) {
                Some(Ok(uri)) => self.toggle_inlining_decisions(&uri).await,
                _ => {
                    self.client
                        .show_message(MessageType::ERROR, "No Go file to toggle inlining decisions for")
                        .await;
                }
            },
            other => {
                tracing::warn!("unknown command: {}", other);
            }
        }
        Ok(None)
    }
}
