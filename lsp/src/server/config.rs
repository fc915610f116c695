use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use gossa_core::{BuildRunner, GoToolchain, ToolchainConfig};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tower_lsp::lsp_types::ConfigurationItem;

use super::state::GoSsaLanguageServer;

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) go_binary: Option<PathBuf>,
    /// Extra environment for `go` (`goSsaExplorer.env`), e.g. `GOFLAGS`.
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) inlay_hints_enabled: bool,
    pub(crate) max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            go_binary: None,
            env: BTreeMap::new(),
            inlay_hints_enabled: true,
            max_concurrent: 2,
        }
    }
}

impl ServerConfig {
    /// Toolchain for the current settings; an unset `goBinary` falls back to `GOSSA_GO`/`go`.
    pub(crate) fn runner(&self) -> Arc<dyn BuildRunner> {
        let mut toolchain = ToolchainConfig::from_env();
        if let Some(bin) = &self.go_binary {
            toolchain = toolchain.with_go_binary(bin.clone());
        }
        Arc::new(GoToolchain::new(toolchain.with_env(self.env.clone())))
    }

    fn merge(&mut self, section: GoSsaConfigSection) {
        if let Some(bin) = section.go_binary.filter(|b| !b.trim().is_empty()) {
            self.go_binary = Some(PathBuf::from(bin));
        }
        if let Some(env) = section.env {
            self.env = env;
        }
        self.inlay_hints_enabled = section.inlay_hints.enabled.unwrap_or(true);
        if let Some(v) = section.performance.max_concurrent.filter(|v| *v > 0) {
            self.max_concurrent = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GoSsaConfigSection {
    #[serde(default)]
    go_binary: Option<String>,
    #[serde(default)]
    env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    inlay_hints: InlayHintsConfig,
    #[serde(default)]
    performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InlayHintsConfig {
    #[serde(default)]
    enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PerformanceConfig {
    #[serde(default)]
    max_concurrent: Option<usize>,
}

impl GoSsaLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some("goSsaExplorer".to_string()),
        }];

        let Ok(values) = self.client.configuration(items).await else {
            return;
        };
        let Some(val) = values.into_iter().next() else {
            return;
        };
        let Ok(section) = serde_json::from_value::<GoSsaConfigSection>(val) else {
            tracing::warn!("ignoring malformed goSsaExplorer configuration");
            return;
        };

        let permits = {
            let mut guard = self.config.lock().unwrap();
            guard.merge(section);
            guard.max_concurrent.max(1)
        };
        if let Ok(mut sem_arc) = self.compute_limiter.lock() {
            *sem_arc = Arc::new(Semaphore::new(permits));
        }
    }
}
