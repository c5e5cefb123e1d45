//! Command handlers for the recall CLI.

use crate::config::Config;
use crate::embedding::{Embedder, store_api_key};
use crate::errors::Error;
use crate::memory::{DEFAULT_QUERY_LIMIT, MemoryService};
use crate::output::*;
use std::process::ExitCode;

/// Commands supported by the recall CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Remember a command under a natural-language description
    Insert {
        /// Command to recall later, stored verbatim
        command_text: String,

        /// Description the command will be found by
        description_text: String,
    },
    /// Print the command whose description best matches the query
    Get {
        /// Query text
        query: String,
    },
    /// Print the best matching commands, most similar first
    List {
        /// Query text
        query: String,

        /// Maximum number of results
        #[arg(short = 'c', long, default_value_t = DEFAULT_QUERY_LIMIT)]
        count: usize,
    },
    /// Store the embedding provider API key
    SetKey {
        /// API key
        key: String,
    },
}

impl Commands {
    /// Whether the command needs the record store and embedding provider.
    pub fn needs_store(&self) -> bool {
        !matches!(self, Commands::SetKey { .. })
    }
}

/// Execute a command that only touches configuration.
pub fn execute_setup(command: &Commands, config: &Config, json: bool) -> Result<ExitCode, Error> {
    match command {
        Commands::SetKey { key } => handle_set_key(config, key, json),
        _ => Err(Error::Config(
            "command requires an open memory store".to_string(),
        )),
    }
}

/// Execute a store-backed CLI command.
pub fn execute<E: Embedder>(
    command: &Commands,
    service: &mut MemoryService<E>,
    json: bool,
) -> Result<ExitCode, Error> {
    match command {
        Commands::Insert {
            command_text,
            description_text,
        } => handle_insert(service, command_text, description_text, json),
        Commands::Get { query } => handle_get(service, query, json),
        Commands::List { query, count } => handle_list(service, query, *count, json),
        Commands::SetKey { .. } => Err(Error::Config(
            "set-key does not use the memory store".to_string(),
        )),
    }
}

fn handle_insert<E: Embedder>(
    service: &mut MemoryService<E>,
    command_text: &str,
    description_text: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let id = service.insert(command_text, description_text)?;
    if json {
        print_json(&InsertResponse {
            status: "inserted".to_string(),
            id,
        });
    } else {
        println!("Memory inserted!");
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_get<E: Embedder>(
    service: &MemoryService<E>,
    query: &str,
    json: bool,
) -> Result<ExitCode, Error> {
    let best = service.get_best(query)?;
    if json {
        print_json(&GetResponse {
            result: best.map(Into::into),
        });
    } else {
        match best {
            Some(memory) => println!("{}", memory.record.command_text),
            None => println!("No memory found!"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list<E: Embedder>(
    service: &MemoryService<E>,
    query: &str,
    count: usize,
    json: bool,
) -> Result<ExitCode, Error> {
    let memories = service.query(query, count)?;
    if json {
        print_json(&QueryResponse {
            results: memories.into_iter().map(Into::into).collect(),
        });
    } else if memories.is_empty() {
        println!("No memories found!");
    } else {
        for memory in memories {
            println!("{memory}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_set_key(config: &Config, key: &str, json: bool) -> Result<ExitCode, Error> {
    let path = config.api_key_path();
    store_api_key(&path, key)?;
    if json {
        print_json(&SetKeyResponse {
            status: "stored".to_string(),
            path: path.display().to_string(),
        });
    } else {
        println!("API key saved to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
