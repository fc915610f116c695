use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use gossa_core::{InlineHints, SsaSession, SsaView};
use ropey::Rope;
use tokio::sync::Semaphore;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

use super::paths::uri_file_name;

/// In-memory copy of an open Go document, used to place inlay hints.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
}

/// A live SSA view together with the session that rebuilds it.
pub(crate) struct OpenView {
    pub(crate) session: SsaSession,
    pub(crate) view: SsaView,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct GoSsaLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) workspace_root: Mutex<Option<PathBuf>>,
    /// Views keyed by the function identifier they show.
    pub(crate) views: Arc<DashMap<String, OpenView>>,
    pub(crate) hints: Arc<InlineHints>,
    pub(crate) config: Mutex<super::config::ServerConfig>,
    pub(crate) compute_limiter: Mutex<Arc<Semaphore>>,
}

impl GoSsaLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            workspace_root: Mutex::new(None),
            views: Arc::new(DashMap::new()),
            hints: Arc::new(InlineHints::new()),
            config: Mutex::new(super::config::ServerConfig::default()),
            compute_limiter: Mutex::new(Arc::new(Semaphore::new(2))),
        }
    }

    pub(crate) fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.lock().ok().and_then(|root| root.clone())
    }

    /// Workspace-relative name (`/main.go`) of a document.
    pub(crate) fn file_name_of(&self, uri: &Url) -> Option<String> {
        let root = self.workspace_root()?;
        uri_file_name(&root, uri)
    }

    pub(crate) fn limiter(&self) -> Arc<Semaphore> {
        self.compute_limiter.lock().unwrap().clone()
    }
}
