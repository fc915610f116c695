//! Engine behind Go SSA Explorer: runs the Go toolchain with diagnostic flags,
//! parses what it prints, and correlates SSA rows with inlining decisions.

pub mod error;
pub mod hints;
pub mod inline;
pub mod render;
pub mod session;
pub mod ssa;
pub mod toolchain;
pub mod view;

pub use error::ExplorerError;
pub use hints::{HintsState, InlineHints};
pub use inline::{InlineDecision, InlineDecisionMap, MAX_INLINE_BUDGET, parse_inline_decisions};
pub use render::{AnnotatedLine, annotate, extract_code_line};
pub use session::{Snapshot, SsaSession};
pub use ssa::{SsaResult, bare_symbol, extract_ssa};
pub use toolchain::{BuildRunner, GoToolchain, ToolchainConfig};
pub use view::{SsaView, ViewEvent};
