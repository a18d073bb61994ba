use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pydepgraph::config::{Config, ParseFailurePolicy, DEFAULT_OUTPUT, DEFAULT_SOURCE_ROOT};
use pydepgraph::export::ExportFormat;

#[derive(Parser)]
#[command(name = "pydepgraph")]
#[command(version)]
#[command(about = "Generate a dependency graph of internal Python modules", long_about = None)]
struct Cli {
    /// Directory containing the project's Python sources
    #[arg(short, long, default_value = DEFAULT_SOURCE_ROOT)]
    source_root: PathBuf,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Import prefix marking internal modules (defaults to the source root's name)
    #[arg(short, long)]
    marker: Option<String>,

    /// Output format: dot or json
    #[arg(short, long, default_value = "dot")]
    format: ExportFormat,

    /// Log and skip files that are not valid Python instead of failing
    #[arg(long)]
    skip_unparsable: bool,

    /// Declare every module as a node, including ones without edges (dot only)
    #[arg(long)]
    isolated_nodes: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.source_root)
            .with_output(self.output)
            .with_format(self.format)
            .with_isolated_nodes(self.isolated_nodes);

        if let Some(marker) = self.marker {
            config = config.with_marker(marker);
        }
        if self.skip_unparsable {
            config = config.with_parse_failure_policy(ParseFailurePolicy::Skip);
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.into_config()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    pydepgraph::run(&config).with_context(|| {
        format!(
            "could not generate graph for {}",
            config.source_root.display()
        )
    })?;

    println!("Graph written to {}", config.output.display());
    Ok(())
}
