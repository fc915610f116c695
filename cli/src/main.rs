use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use gossa_core::{
    ExplorerError, GoToolchain, InlineDecisionMap, SsaView, ViewEvent, extract_ssa, parse_inline_decisions,
    render::render_plain,
    toolchain::{load_inline_decisions, load_ssa},
};

mod report;
#[cfg(test)]
mod main_test;

use report::InlineReport;

const DEFAULT_TRACE_FILTER: &str = "gossa_core=warn,gossa_cli=warn";

#[derive(Debug, Parser)]
#[command(
    name = "gossa",
    author,
    version,
    about = "Show Go SSA dumps annotated with inlining decisions",
    long_about = None,
    after_help = "Set GOSSA_GO to use a specific go binary; GOSSA_TRACE=1 (or a filter) enables logging."
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the SSA of one function, annotated with inlining decisions.
    Ssa {
        /// `pkg.Function`, `(Type).Method` or `(*Type).Method`
        #[arg(value_name = "FUNCTION")]
        function: String,
        /// Module directory to build (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Read a captured `GOSSAFUNC` build log instead of running `go build`
        #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
        input: Option<PathBuf>,
        /// Read a captured `-gcflags=-m=2` log instead of running `go build`
        #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
        decisions: Option<PathBuf>,
        /// Highlight SSA rows of this 1-based source line
        #[arg(long, value_name = "LINE")]
        line: Option<u32>,
        /// Skip the inlining report entirely
        #[arg(long, conflicts_with = "decisions")]
        no_decisions: bool,
        /// Emit JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Print the inlining decisions of one source file.
    Inline {
        /// Source file relative to the module directory, e.g. `main.go`
        #[arg(value_name = "FILE")]
        file: String,
        /// Module directory to build (defaults to the current directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Read a captured `-gcflags=-m=2` log instead of running `go build`
        #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
        input: Option<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn read_file_content(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

/// `main.go`, `./main.go` and `/main.go` all name the same workspace file.
fn workspace_file_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn resolve_dir(dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("Failed to determine the current directory"),
    }
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter_expr = match std::env::var("GOSSA_TRACE") {
        Ok(raw) if env_toggle_enabled(&raw) => {
            filter_expr_from(&raw).or_else(|| Some("gossa_core=debug,gossa_cli=debug".to_string()))
        }
        _ => std::env::var("RUST_LOG").ok(),
    };

    let builder = fmt().with_writer(std::io::stderr).with_target(false);
    let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
        Some(filter) => builder.with_env_filter(filter),
        None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
    };
    let _ = builder.try_init();
}

fn run_ssa(
    function: &str,
    dir: Option<PathBuf>,
    input: Option<PathBuf>,
    decisions: Option<PathBuf>,
    line: Option<u32>,
    no_decisions: bool,
    json: bool,
) -> anyhow::Result<()> {
    let function = function.trim();
    if function.is_empty() {
        return Ok(());
    }

    let toolchain = GoToolchain::from_env();
    let dir = resolve_dir(dir)?;

    let ssa = match &input {
        Some(path) => {
            let output = read_file_content(path)?;
            extract_ssa(&output, function).ok_or_else(|| ExplorerError::not_found(function))?
        }
        None => load_ssa(&toolchain, &dir, function)?,
    };

    let inline_decisions = if no_decisions {
        InlineDecisionMap::new()
    } else if let Some(path) = &decisions {
        parse_inline_decisions(&read_file_content(path)?)
    } else if input.is_none() {
        load_inline_decisions(&toolchain, &dir, &ssa.source_file_name)
    } else {
        InlineDecisionMap::new()
    };
    tracing::info!(
        "{} SSA rows, {} inlining decisions for {}",
        ssa.ssa_text.len(),
        inline_decisions.len(),
        ssa.source_file_name
    );

    let mut view = SsaView::new(function, ssa, inline_decisions);
    if let Some(line) = line {
        let file_name = view.source_file_name().to_string();
        view.apply(ViewEvent::Highlight { line, file_name });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("# SSA: {} ({})", view.function(), view.source_file_name());
        print!("{}", render_plain(view.rows(), view.highlight(), !no_decisions));
    }
    Ok(())
}

fn run_inline(file: &str, dir: Option<PathBuf>, input: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let file_name = workspace_file_name(file);
    let inline_decisions = match &input {
        Some(path) => parse_inline_decisions(&read_file_content(path)?),
        None => {
            let dir = resolve_dir(dir)?;
            load_inline_decisions(&GoToolchain::from_env(), &dir, &file_name)
        }
    };

    let report = InlineReport::new(file_name, inline_decisions);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { command } = CliArgs::parse();
    match command {
        Commands::Ssa {
            function,
            dir,
            input,
            decisions,
            line,
            no_decisions,
            json,
        } => run_ssa(&function, dir, input, decisions, line, no_decisions, json),
        Commands::Inline { file, dir, input, json } => run_inline(&file, dir, input, json),
    }
}
