//! # String Analyzer CLI (`sa`)
//!
//! The `sa` binary initializes the database, stores and inspects analyzed
//! strings, runs structured and natural-language filters, and starts the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! sa --config ./config/sa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sa init` | Create the SQLite database and schema |
//! | `sa analyze <value>` | Print the properties of a value without storing it |
//! | `sa add <value>` | Analyze and store a value |
//! | `sa import <file>` | Store every non-blank line of a file |
//! | `sa get <id>` | Show a stored string by hash or value |
//! | `sa delete <id>` | Delete a stored string by hash or value |
//! | `sa list` | List stored strings, optionally filtered |
//! | `sa query "<text>"` | Filter with a natural-language query |
//! | `sa stats` | Show record counts |
//! | `sa serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! sa init
//! sa add "A man, a plan, a canal: Panama"
//! sa list --is-palindrome true --min-length 5
//! sa query "single word palindromic strings"
//! sa serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use string_analyzer::{add, config, get, migrate, search, server, stats};
use string_analyzer_core::filter::Criteria;

/// String Analyzer CLI: content-addressed string analysis and filtering.
///
/// All commands except `analyze` read a TOML configuration file given by
/// `--config`. See `config/sa.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "sa",
    about = "String Analyzer: store strings with computed properties and filter them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/sa.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Print the computed properties of a value without storing it.
    Analyze {
        /// The string to analyze.
        value: String,
    },

    /// Analyze and store a value.
    Add {
        /// The string to store.
        value: String,
    },

    /// Store every non-blank line of a file.
    ///
    /// Duplicates and invalid lines are counted and skipped.
    Import {
        /// Path to a UTF-8 text file, one value per line.
        path: PathBuf,
    },

    /// Show a stored string by its SHA-256 hash or raw value.
    Get {
        /// Content hash or raw value.
        id: String,
    },

    /// Delete a stored string by its SHA-256 hash or raw value.
    Delete {
        /// Content hash or raw value.
        id: String,
    },

    /// List stored strings, newest first.
    List {
        /// Only palindromes (`true`) or non-palindromes (`false`).
        #[arg(long)]
        is_palindrome: Option<bool>,

        /// Minimum length in characters (inclusive).
        #[arg(long)]
        min_length: Option<usize>,

        /// Maximum length in characters (inclusive).
        #[arg(long)]
        max_length: Option<usize>,

        /// Exact number of whitespace-separated words.
        #[arg(long)]
        word_count: Option<usize>,

        /// A character the value must contain (case-sensitive).
        #[arg(long)]
        contains_character: Option<char>,
    },

    /// Filter stored strings with a natural-language query.
    ///
    /// Example: `sa query "strings longer than 10 characters containing the letter z"`.
    Query {
        /// The query text.
        text: String,
    },

    /// Show record counts.
    Stats,

    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    // Commands that don't require config
    if let Commands::Analyze { value } = &cli.command {
        add::run_analyze(value)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Analyze { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Add { value } => {
            add::run_add(&cfg, &value).await?;
        }
        Commands::Import { path } => {
            add::run_import(&cfg, &path).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Delete { id } => {
            get::run_delete(&cfg, &id).await?;
        }
        Commands::List {
            is_palindrome,
            min_length,
            max_length,
            word_count,
            contains_character,
        } => {
            let criteria = Criteria {
                is_palindrome,
                min_length,
                max_length,
                word_count,
                contains_character,
            };
            search::run_list(&cfg, &criteria).await?;
        }
        Commands::Query { text } => {
            search::run_query(&cfg, &text).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
