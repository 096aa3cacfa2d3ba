//! FlattDB CLI
//!
//! Command-line tools for FlattDB database directories.
//!
//! # Commands
//!
//! - `inspect` - List collections, their models, indexes and sizes
//! - `fetch` - Print a document with its relations expanded
//! - `query` - Look documents up by an indexed value
//! - `verify` - Check indexes and relations point at stored documents
//! - `reindex` - Rebuild a collection's indexes from its documents
//! - `create-collection` - Provision a new collection

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FlattDB command-line database tools.
#[derive(Parser)]
#[command(name = "flattdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections, models, indexes and document counts
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print a document as JSON, relations expanded
    Fetch {
        /// Collection name
        collection: String,
        /// Document id
        id: String,
    },

    /// Print the documents an index lists under a value
    Query {
        /// Collection name
        collection: String,
        /// Index (and field) name
        index: String,
        /// Value to look up
        value: String,
    },

    /// Check that indexes and relations resolve to stored documents
    Verify,

    /// Rebuild a collection's indexes from its stored documents
    Reindex {
        /// Collection name
        collection: String,
    },

    /// Create a new collection
    CreateCollection {
        /// Collection name
        name: String,

        /// Index declaration as name=kind (kind: unique, group, collection:<target>)
        #[arg(short, long = "index")]
        indexes: Vec<String>,

        /// Document model name
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Database path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Fetch { collection, id } => {
            let path = cli.path.ok_or("Database path required for fetch")?;
            commands::fetch::run(&path, &collection, &id)?;
        }
        Commands::Query {
            collection,
            index,
            value,
        } => {
            let path = cli.path.ok_or("Database path required for query")?;
            commands::query::run(&path, &collection, &index, &value)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Database path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Reindex { collection } => {
            let path = cli.path.ok_or("Database path required for reindex")?;
            commands::reindex::run(&path, &collection)?;
        }
        Commands::CreateCollection {
            name,
            indexes,
            model,
        } => {
            let path = cli.path.ok_or("Database path required for create-collection")?;
            commands::create_collection::run(&path, &name, &indexes, model.as_deref())?;
        }
        Commands::Version => {
            println!("FlattDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("FlattDB Core v{}", flattdb_core::VERSION);
        }
    }

    Ok(())
}
