mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tagcomplete")]
#[command(about = "Tag autocomplete search and wildcard prompt expansion", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Data root (defaults to TAGCOMPLETE_DATA_PATH, then the current directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search tags across all loaded tables
    Search(SearchArgs),

    /// Expand a wildcard template
    Expand {
        /// Template text (omit when using --file)
        text: Option<String>,
        #[arg(long, help = "Read the template from a file")]
        file: Option<PathBuf>,
        #[arg(long, default_value = "0", help = "Random seed")]
        seed: u64,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// Load one table (main, extra, embeddings, loras, wildcards) and list it
    Table {
        /// Table name
        name: String,
        #[arg(long, help = "Tag file under tags/ (main and extra only)")]
        file: Option<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// List loaded wildcards with option counts
    Wildcards {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// List main, extra and translate files in the data root
    Files {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Partial tag to search for
    pub term: String,
    #[arg(long = "category", help = "Only these category names (repeatable)")]
    pub categories: Vec<String>,
    #[arg(long, help = "Main tag file under tags/")]
    pub main: Option<String>,
    #[arg(long, help = "Extra tag file under tags/")]
    pub extra: Option<String>,
    #[arg(long, help = "Translate file under translate/ (\"None\" to disable)")]
    pub translate: Option<String>,
    #[arg(long, help = "Include embeddings")]
    pub embeddings: bool,
    #[arg(long, help = "Include LoRAs")]
    pub loras: bool,
    #[arg(long, help = "Include wildcards")]
    pub wildcards: bool,
    #[arg(long, help = "Aliases only match exactly")]
    pub restrict_alias: bool,
    #[arg(long, help = "Result cap (0 = unlimited)")]
    pub max: Option<i64>,
    #[arg(long, help = "JSON output")]
    pub json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let data = cli.data;
    match cli.command {
        Commands::Search(args) => commands::search::run(data, args),
        Commands::Expand {
            text,
            file,
            seed,
            json,
        } => commands::expand::run(data, text, file, seed, json),
        Commands::Table { name, file, json } => commands::table::run(data, name, file, json),
        Commands::Wildcards { json } => commands::wildcards::run(data, json),
        Commands::Files { json } => commands::files::run(data, json),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
