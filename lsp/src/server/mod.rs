mod commands;
mod config;
mod entry;
mod handlers;
mod inlay_hints;
mod paths;
mod protocol;
mod state;

pub use entry::run;
#[cfg(test)]
pub(crate) use inlay_hints::compute_decision_hints;
