use crate::config::{SolverBackend, load_config};
use crate::layout::solve_layout;
use crate::layout_dump::{annotate_groups, write_document, write_layout_dump};
use crate::parser::parse_node_link;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ntm",
    version,
    about = "Nested treemap layout that keeps connected groups close"
)]
pub struct Args {
    /// Input node-link JSON file, or '-' for stdin
    #[arg(short = 'f', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Node field holding the group id
    #[arg(long = "group-key", default_value = "group")]
    pub group_key: String,

    /// Inset per nesting level
    #[arg(long = "margin")]
    pub margin: Option<f64>,

    /// Solver backend
    #[arg(long = "solver", value_enum)]
    pub solver: Option<SolverBackend>,

    /// Solver time limit in seconds
    #[arg(long = "time-limit")]
    pub time_limit: Option<f64>,

    /// Also write the bare layout (one rectangle per group) to this file
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.layout.width = width;
    }
    if let Some(height) = args.height {
        config.layout.height = height;
    }
    if let Some(margin) = args.margin {
        anyhow::ensure!(margin >= 0.0, "--margin must not be negative");
        config.layout.margin = margin;
    }
    if let Some(backend) = args.solver {
        config.solver.backend = backend;
    }
    if let Some(limit) = args.time_limit {
        anyhow::ensure!(
            limit.is_finite() && limit >= 0.0,
            "--time-limit must be a non-negative number of seconds"
        );
        config.solver.time_limit_secs = limit;
    }

    let input = read_input(args.input.as_deref())?;
    let mut parsed = parse_node_link(&input, &args.group_key)?;
    let layout = solve_layout(&parsed.graph, &config).context("layout failed")?;

    annotate_groups(&mut parsed.document, &parsed.group_slots, &layout)?;
    write_document(&parsed.document, args.output.as_deref())?;
    if let Some(path) = args.dump.as_deref() {
        write_layout_dump(path, &layout)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
