//! CLI module - Command-line interface definition and run entry point

use anyhow::Result;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

use crate::backends::history::{GitHistory, HistoryProbe, NoHistory};
use crate::backends::scan::discover_documents;
use crate::core::config::{ConfigError, FixPattern, RunConfig, DEFAULT_MAX_DEPTH};
use crate::core::render::{OutputFormat, Renderer};
use crate::flows::scan::Scanner;

/// doclinks - check links and section anchors across a Markdown docs tree.
#[derive(Parser, Debug)]
#[command(name = "doclinks")]
#[command(
    author,
    version,
    about,
    long_about = r###"doclinks validates every Markdown link in a documentation tree.

For each link it checks that the target document exists and, when the link
carries a #fragment, that the target has a matching section anchor. Anchors
are matched exactly, then with numbered-section fuzzing (#25-setup finds
"## 2.5 Setup"), then by suffix (#setup finds "## 2.5 Setup").

URLs (http, https, ftp, mailto) are classified as external and never fetched.

Exit status: 0 when no links are broken, 1 when broken links were found,
2 on usage or setup errors.

Examples:
    doclinks --root docs
    doclinks --root docs --format json --jobs 8
    doclinks --root docs --fix "old/path/:new/path/"
    doclinks --root docs --warn-deep --max-depth 3
"###
)]
pub struct Cli {
    /// Docs root to scan.
    #[arg(
        short,
        long,
        default_value = ".",
        env = "DOCLINKS_DOCS_ROOT",
        value_name = "ROOT",
        long_help = "Docs root directory (defaults to the current directory).\n\n\
Documents are discovered under this root, `/`-prefixed links resolve against it,\n\
and reported paths are relative to it."
    )]
    pub root: PathBuf,

    /// Prefix that classifies link targets as internal.
    #[arg(
        long,
        env = "DOCLINKS_AREA_ROOT",
        value_name = "PATH",
        long_help = "Resolved targets whose path starts with this prefix count as internal;\n\
everything else is external. Defaults to the docs root.\n\n\
Note: this is a plain string-prefix test, so /docs also covers /docs-old."
    )]
    pub area_root: Option<PathBuf>,

    /// Document extension to scan (repeatable).
    #[arg(long = "ext", value_name = "EXT", default_value = "md")]
    pub extensions: Vec<String>,

    /// Skip documents whose root-relative path matches this regex.
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// Output format (text/json).
    #[arg(
        long,
        default_value = "text",
        value_parser = ["text", "json"],
        value_name = "FORMAT",
        long_help = "Select the report format.\n\n\
Supported values:\n\
- text (default): verdict lines per document plus a summary block\n\
- json: one object with summary, broken_links, warnings and deep_paths"
    )]
    pub format: String,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Verbose mode (print valid links, debug logging).
    #[arg(
        short,
        long,
        long_help = "Print every link verdict, not only problems, and raise the log level\n\
to debug. RUST_LOG still applies on top."
    )]
    pub verbose: bool,

    /// Number of concurrent workers (1 = sequential).
    #[arg(short = 'j', long, default_value = "1", value_name = "N")]
    pub jobs: usize,

    /// Batch-fix links by literal substitution (OLD:NEW).
    #[arg(
        long,
        value_name = "OLD:NEW",
        long_help = "Rewrite every link containing OLD so that OLD becomes NEW, editing the\n\
source document in place. Rewritten links count as valid and are not\n\
re-checked."
    )]
    pub fix: Option<String>,

    /// Replace dead links with a TODO marker.
    #[arg(
        long,
        long_help = "When a link target does not exist and git history has never seen a file\n\
with that name, replace the link in the source document with a plain-text\n\
TODO marker. If history exists the file is presumed moved and the link is\n\
reported as broken."
    )]
    pub auto_todo: bool,

    /// Warn about deep relative paths.
    #[arg(long)]
    pub warn_deep: bool,

    /// `../` count above which --warn-deep reports a link.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_name = "N")]
    pub max_depth: usize,

    /// Explicit documents to check instead of discovering them.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Run a validation pass and map the outcome to an exit status
pub fn run(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_default();

    let fix = cli
        .fix
        .as_deref()
        .map(str::parse::<FixPattern>)
        .transpose()?;

    let exclude = cli
        .exclude
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(ConfigError::from)?;

    let config = RunConfig::new(&cli.root, cli.area_root.as_deref())?
        .with_workers(cli.jobs)?
        .with_fix(fix)
        .with_auto_todo(cli.auto_todo)
        .with_deep_paths(cli.warn_deep, cli.max_depth)
        .with_verbose(cli.verbose);

    let documents = if cli.files.is_empty() {
        discover_documents(&config.docs_root, &cli.extensions, exclude.as_ref())
    } else {
        for file in cli.files.iter().filter(|f| !f.is_file()) {
            warn!("{} is not a readable file", file.display());
        }
        cli.files.clone()
    };

    debug!(
        "Checking {} document(s) under {} with {} worker(s)",
        documents.len(),
        config.docs_root.display(),
        config.workers
    );

    let history: Box<dyn HistoryProbe> = if config.auto_todo {
        Box::new(GitHistory::new(&config.docs_root))
    } else {
        Box::new(NoHistory)
    };
    let outcome = Scanner::new(&config, history.as_ref(), format).run(&documents);

    let renderer = Renderer::new(format, &config.docs_root);
    println!("{}", renderer.render(&outcome));

    Ok(if outcome.has_broken_links() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
