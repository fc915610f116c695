use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::{protocol::SELECTION_CHANGED_METHOD, state::GoSsaLanguageServer};

const DEFAULT_TRACE_FILTER: &str = "gossa_lsp=info,gossa_core=info";

pub async fn run() {
    // stdout carries JSON-RPC; logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACE_FILTER));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(GoSsaLanguageServer::new)
        .custom_method(SELECTION_CHANGED_METHOD, GoSsaLanguageServer::selection_changed)
        .finish();
    Server::new(stdin, stdout, socket).serve(service).await;
}
