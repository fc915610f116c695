use dashmap::DashMap;
use gossa_core::toolchain::load_inline_decisions;
use gossa_core::{ExplorerError, HintsState, SsaSession, ViewEvent};
use tokio::task;
use tower_lsp::lsp_types::{MessageType, Url};
use tracing::{debug, info, warn};

use super::paths::uri_file_name;
use super::protocol::{
    HighlightNotification, HighlightParams, SelectionChangedParams, UpdateSsaNotification, UpdateSsaParams,
};
use super::state::{GoSsaLanguageServer, OpenView};

impl GoSsaLanguageServer {
    async fn report_error(&self, err: &ExplorerError) {
        warn!("{}", err);
        self.client.show_message(MessageType::ERROR, err.to_string()).await;
    }

    /// `goSsaExplorer.showSSA`: build, open a view and push its first rendering.
    pub(crate) async fn show_ssa(&self, function: &str) {
        let function = function.trim();
        if function.is_empty() {
            return;
        }
        let Some(root) = self.workspace_root() else {
            self.report_error(&ExplorerError::NoWorkspace).await;
            return;
        };

        let runner = self.config.lock().unwrap().runner();
        let sem = self.limiter();
        let _permit = sem.acquire().await.ok();

        match SsaSession::open(runner, root, function).await {
            Ok((session, view)) => {
                let params = UpdateSsaParams::from_view(&view);
                self.views.insert(function.to_string(), OpenView { session, view });
                self.client.send_notification::<UpdateSsaNotification>(params).await;
            }
            Err(err) => self.report_error(&err).await,
        }
    }

    /// `goSsaExplorer.toggleInliningDecisions`: flip the annotations of one file.
    pub(crate) async fn toggle_inlining_decisions(&self, uri: &Url) {
        let Some(root) = self.workspace_root() else {
            self.report_error(&ExplorerError::NoWorkspace).await;
            return;
        };
        let Some(file_name) = uri_file_name(&root, uri) else {
            warn!("{} is outside the workspace; not toggling annotations", uri);
            return;
        };

        let runner = self.config.lock().unwrap().runner();
        let hints = self.hints.clone();
        let sem = self.limiter();
        let _permit = sem.acquire().await.ok();

        let toggled = task::spawn_blocking({
            let file_name = file_name.clone();
            move || hints.toggle(&file_name, || load_inline_decisions(runner.as_ref(), &root, &file_name))
        })
        .await;
        match toggled {
            Ok(HintsState::Shown) => info!("inlining decisions shown for {}", file_name),
            Ok(HintsState::Hidden) => info!("inlining decisions hidden for {}", file_name),
            Err(err) => warn!("toggling inlining decisions for {} failed: {}", file_name, err),
        }
        if let Err(err) = self.client.inlay_hint_refresh().await {
            debug!("inlay hint refresh after toggle failed: {}", err);
        }
    }

    /// `goSsaExplorer/selectionChanged`: move the marker of every view showing that file.
    pub(crate) async fn selection_changed(&self, params: SelectionChangedParams) {
        let Some(file_name) = self.file_name_of(&params.uri) else {
            return;
        };
        let line = params.line + 1;

        let mut updates = Vec::new();
        for mut entry in self.views.iter_mut() {
            let event = ViewEvent::Highlight {
                line,
                file_name: file_name.clone(),
            };
            if entry.view.apply(event) {
                updates.push(HighlightParams::from_view(&entry.view, line));
            }
        }
        for params in updates {
            self.client.send_notification::<HighlightNotification>(params).await;
        }
    }

    /// Rebuild every open view and the annotations of the saved file in the background.
    pub(crate) fn schedule_refresh(&self, uri: Url) {
        let Some(root) = self.workspace_root() else {
            return;
        };
        let Some(file_name) = uri_file_name(&root, &uri) else {
            return;
        };
        let views = self.views.clone();
        let hints = self.hints.clone();
        let client = self.client.clone();
        let runner = self.config.lock().unwrap().runner();
        let sem = self.limiter();

        tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok();

            for (function, session, line) in refresh_targets(&views, &file_name) {
                let snapshot = match session.refresh().await {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        debug!("refresh of `{}` skipped: {}", function, err);
                        continue;
                    }
                };
                let event = snapshot.into_event(file_name.clone(), line);
                let params = views
                    .get_mut(&function)
                    .and_then(|mut entry| entry.view.apply(event).then(|| UpdateSsaParams::from_view(&entry.view)));
                if let Some(params) = params {
                    client.send_notification::<UpdateSsaNotification>(params).await;
                }
            }

            if hints.is_shown(&file_name) {
                let decisions = task::spawn_blocking({
                    let file_name = file_name.clone();
                    move || load_inline_decisions(runner.as_ref(), &root, &file_name)
                })
                .await
                .unwrap_or_default();
                if hints.refresh(&file_name, decisions) {
                    if let Err(err) = client.inlay_hint_refresh().await {
                        debug!("inlay hint refresh after save failed: {}", err);
                    }
                }
            }
        });
    }
}

/// Views built from `file_name`, with the line each one currently highlights.
fn refresh_targets(views: &DashMap<String, OpenView>, file_name: &str) -> Vec<(String, SsaSession, Option<u32>)> {
    views
        .iter()
        .filter(|e| e.session.source_file_name() == file_name)
        .map(|e| (e.key().clone(), e.session.clone(), e.view.highlight()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use gossa_core::BuildRunner;

    /// Answers every SSA build with a dump attributed to `./<file>` of the function's package.
    struct FixedRunner;

    impl BuildRunner for FixedRunner {
        fn ssa_dump(&self, _: &Path, identifier: &str) -> anyhow::Result<String> {
            let (file, name) = identifier.split_once('.').unwrap_or(("main", identifier));
            Ok(format!("genssa {name}\n# ./{file}.go\nv1 (3) x\ndumped SSA for {name},1 to ./ssa.html\n"))
        }

        fn inlining_report(&self, _: &Path, _: &str) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    async fn open(views: &DashMap<String, OpenView>, function: &str) {
        let (session, view) = SsaSession::open(Arc::new(FixedRunner), "/work", function).await.unwrap();
        views.insert(function.to_string(), OpenView { session, view });
    }

    #[tokio::test]
    async fn save_only_rebuilds_views_of_the_saved_file() {
        let views = DashMap::new();
        open(&views, "main.Run").await;
        open(&views, "util.Helper").await;
        open(&views, "main.Stop").await;

        let mut targets: Vec<String> = refresh_targets(&views, "/main.go").into_iter().map(|t| t.0).collect();
        targets.sort();
        assert_eq!(targets, vec!["main.Run".to_string(), "main.Stop".to_string()]);
        assert!(refresh_targets(&views, "/other.go").is_empty());
    }
}
