use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::{InitializeParams, Url};

/// Workspace root announced by the client; the first workspace folder wins.
#[allow(deprecated)]
pub(crate) fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .and_then(|folder| folder.uri.to_file_path().ok())
        .or_else(|| params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok()))
}

/// `/root/ws/pkg/a.go` under `/root/ws` -> `/pkg/a.go`, the shape the SSA header uses.
pub(crate) fn relative_file_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut out = String::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => {
                out.push('/');
                out.push_str(&part.to_string_lossy());
            }
            _ => return None,
        }
    }
    (!out.is_empty()).then_some(out)
}

pub(crate) fn uri_file_name(root: &Path, uri: &Url) -> Option<String> {
    let path = uri.to_file_path().ok()?;
    relative_file_name(root, &path)
}
