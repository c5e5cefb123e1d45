use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use recall::commands::{self, Commands};
use recall::output::{ErrorResponse, print_json};
use recall::{Config, Error, MemoryService, RecordStore, embedding};

/// recall - Remember shell commands by what they do
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let config = Config::load()?;
    config.ensure_directories()?;

    if !cli.command.needs_store() {
        return commands::execute_setup(&cli.command, &config, cli.json);
    }

    let store = RecordStore::open(&config.store_path())?;
    let embedder = embedding::from_config(&config)?;
    let mut service = MemoryService::new(store, embedder, config.retry_policy());

    commands::execute(&cli.command, &mut service, cli.json)
}

/// Log to stderr. `RECALL_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "recall=debug" } else { "recall=warn" };
    let filter = EnvFilter::try_from_env("RECALL_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
