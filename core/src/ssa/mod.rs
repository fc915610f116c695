//! Locating a function's SSA dump inside `GOSSAFUNC` build output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};


const REGION_START: &str = "genssa ";
const REGION_END: &str = "dumped SSA";

// Go method identifiers: (Type).Method or (*Type).Method
static METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(.*\)\..+$").unwrap());

/// SSA body of one function and the source file the compiler attributes it to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsaResult {
    pub ssa_text: Vec<String>,
    /// Workspace-relative path with a leading `/`, e.g. `/main.go`.
    pub source_file_name: String,
}

impl SsaResult {
    /// The SSA body rejoined with newlines.
    pub fn body(&self) -> String {
        self.ssa_text.join("\n")
    }
}

/// The symbol the compiler prints in its `genssa` header.
///
/// Methods are kept verbatim; anything else loses its package qualifier.
pub fn bare_symbol(identifier: &str) -> &str {
    if METHOD_RE.is_match(identifier) {
        return identifier;
    }
    identifier.rsplit('.').next().unwrap_or(identifier)
}

/// Value of `GOSSAFUNC` requesting every phase of `identifier`.
pub fn gossafunc_value(identifier: &str) -> String {
    format!("{}+", identifier)
}

/// Cut the `genssa <symbol>` .. `dumped SSA` region out of a build's stderr.
///
/// The region's first two lines are header; the second names the source file.
/// Returns `None` when the output holds no region for the function.
pub fn extract_ssa(output: &str, identifier: &str) -> Option<SsaResult> {
    let marker = format!("{}{}", REGION_START, bare_symbol(identifier));
    let start = output.find(&marker)?;
    let end = start + output[start..].find(REGION_END)?;
    let region = &output[start..end];

    let mut lines: Vec<&str> = region.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    // the region stops at the start of the `dumped SSA` line
    if lines.len() > 2 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let header_len = lines.len().min(2);
    let source_file_name = normalize_file_name(lines[header_len - 1]);
    let ssa_text = lines[header_len..].iter().map(|l| l.to_string()).collect();

    Some(SsaResult {
        ssa_text,
        source_file_name,
    })
}

/// `# ./pkg/main.go` -> `/pkg/main.go`
fn normalize_file_name(header: &str) -> String {
    let name = header.replacen('#', "", 1).replacen("./", "", 1);
    format!("/{}", name.trim())
}
