use std::path::PathBuf;
use std::sync::Arc;

use tokio::task;

use crate::error::ExplorerError;
use crate::inline::InlineDecisionMap;
use crate::ssa::SsaResult;
use crate::toolchain::{BuildRunner, load_inline_decisions, load_ssa};
use crate::view::{SsaView, ViewEvent};

/// Result of one full re-invocation of the compiler for a session.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub ssa: SsaResult,
    pub inline_decisions: InlineDecisionMap,
}

impl Snapshot {
    /// Turn the snapshot into a full-replace event tagged with the file that triggered it.
    pub fn into_event(self, file_name: impl Into<String>, line: Option<u32>) -> ViewEvent {
        ViewEvent::UpdateSsa {
            ssa_text: self.ssa.ssa_text,
            inline_decisions: self.inline_decisions,
            line,
            file_name: file_name.into(),
        }
    }
}

/// Ties one function of one workspace to the toolchain that rebuilds it.
///
/// Blocking builds run on tokio's blocking pool.
#[derive(Clone)]
pub struct SsaSession {
    runner: Arc<dyn BuildRunner>,
    workdir: PathBuf,
    function: String,
    source_file_name: String,
}

impl SsaSession {
    /// First build for `function`: the SSA build resolves the source file, then the
    /// decisions for that file are collected.
    pub async fn open(
        runner: Arc<dyn BuildRunner>,
        workdir: impl Into<PathBuf>,
        function: impl Into<String>,
    ) -> Result<(Self, SsaView), ExplorerError> {
        let workdir = workdir.into();
        let function = function.into();

        let ssa = spawn_ssa(runner.clone(), workdir.clone(), function.clone()).await?;
        let inline_decisions =
            spawn_decisions(runner.clone(), workdir.clone(), ssa.source_file_name.clone()).await;

        let session = Self {
            runner,
            workdir,
            function: function.clone(),
            source_file_name: ssa.source_file_name.clone(),
        };
        tracing::info!(
            "opened SSA view for `{}` ({}, {} decisions)",
            function,
            session.source_file_name,
            inline_decisions.len()
        );
        Ok((session, SsaView::new(function, ssa, inline_decisions)))
    }

    /// Rebuild both reports. The file name is already known, so the two builds run concurrently.
    pub async fn refresh(&self) -> Result<Snapshot, ExplorerError> {
        let (ssa, inline_decisions) = tokio::join!(
            spawn_ssa(self.runner.clone(), self.workdir.clone(), self.function.clone()),
            spawn_decisions(
                self.runner.clone(),
                self.workdir.clone(),
                self.source_file_name.clone()
            ),
        );
        let ssa = ssa?;
        tracing::debug!("refreshed SSA of `{}` ({} rows)", self.function, ssa.ssa_text.len());
        Ok(Snapshot { ssa, inline_decisions })
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }
}

async fn spawn_ssa(runner: Arc<dyn BuildRunner>, workdir: PathBuf, function: String) -> Result<SsaResult, ExplorerError> {
    task::spawn_blocking(move || load_ssa(runner.as_ref(), &workdir, &function))
        .await
        .map_err(|e| ExplorerError::Toolchain(e.to_string()))?
}

async fn spawn_decisions(runner: Arc<dyn BuildRunner>, workdir: PathBuf, file_name: String) -> InlineDecisionMap {
    task::spawn_blocking(move || load_inline_decisions(runner.as_ref(), &workdir, &file_name))
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedRunner {
        ssa: Mutex<String>,
        report: String,
        report_calls: AtomicUsize,
        requested_files: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(ssa: &str, report: &str) -> Self {
            Self {
                ssa: Mutex::new(ssa.to_string()),
                report: report.to_string(),
                report_calls: AtomicUsize::new(0),
                requested_files: Mutex::new(Vec::new()),
            }
        }
    }

    impl BuildRunner for ScriptedRunner {
        fn ssa_dump(&self, _: &Path, _: &str) -> anyhow::Result<String> {
            Ok(self.ssa.lock().unwrap().clone())
        }

        fn inlining_report(&self, _: &Path, file_name: &str) -> anyhow::Result<String> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_files.lock().unwrap().push(file_name.to_string());
            Ok(self.report.clone())
        }
    }

    const SSA: &str = "genssa Foo\n# ./main.go\nv1 (4) a\nv2 (5) b\ndumped SSA for Foo,1 to ./ssa.html\n";
    const REPORT: &str = "./main.go:5:9: inlining call to helper\n";

    #[tokio::test]
    async fn open_resolves_file_before_collecting_decisions() {
        let runner = Arc::new(ScriptedRunner::new(SSA, REPORT));
        let (session, view) = SsaSession::open(runner.clone(), "/work", "pkg.Foo").await.unwrap();
        assert_eq!(session.source_file_name(), "/main.go");
        assert_eq!(runner.requested_files.lock().unwrap().as_slice(), ["/main.go".to_string()]);
        assert_eq!(view.function(), "pkg.Foo");
        assert_eq!(view.rows().len(), 3);
    }

    #[tokio::test]
    async fn open_without_region_is_not_found_and_skips_decisions() {
        let runner = Arc::new(ScriptedRunner::new("# pkg\nbuild failed\n", REPORT));
        let err = match SsaSession::open(runner.clone(), "/work", "pkg.Foo").await {
            Err(e) => e,
            Ok(_) => panic!("expected not found"),
        };
        assert!(err.is_not_found());
        assert_eq!(runner.report_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_produces_a_full_replace_for_the_view() {
        let runner = Arc::new(ScriptedRunner::new(SSA, REPORT));
        let (session, mut view) = SsaSession::open(runner.clone(), "/work", "Foo").await.unwrap();

        *runner.ssa.lock().unwrap() =
            "genssa Foo\n# ./main.go\nv1 (7) c\ndumped SSA for Foo,1 to ./ssa.html\n".to_string();
        let snapshot = session.refresh().await.unwrap();
        assert_eq!(runner.report_calls.load(Ordering::SeqCst), 2);

        assert!(view.apply(snapshot.clone().into_event("/main.go", Some(7))));
        assert_eq!(view.ssa_text(), ["v1 (7) c".to_string()]);
        assert_eq!(view.highlighted_rows(), vec![0]);

        let mut untouched = view.clone();
        assert!(!untouched.apply(snapshot.into_event("/util.go", Some(7))));
    }

    #[tokio::test]
    async fn failed_refresh_leaves_the_view_alone() {
        let runner = Arc::new(ScriptedRunner::new(SSA, REPORT));
        let (session, view) = SsaSession::open(runner.clone(), "/work", "Foo").await.unwrap();
        *runner.ssa.lock().unwrap() = String::new();
        assert!(session.refresh().await.is_err());
        assert_eq!(view.rows().len(), 3);
    }
}
