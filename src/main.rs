//! hvac-assistant CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use hvac_assistant::{
    chain::RetrievalQa,
    commands::{
        cmd_ask, cmd_db_drop, cmd_db_init, cmd_db_status, cmd_extract, cmd_index, cmd_init,
        cmd_seed, cmd_serve, cmd_status, print_answer, print_extract_output, print_index_stats,
        print_init_report, print_seed_stats, print_status, print_table_counts, ExtractOptions,
        SeedOptions,
    },
    config::Config,
    db::{HvacDb, Table},
    embed::create_embedder,
    error::{Error, Result},
    llm::create_llm,
    progress::LogWriterFactory,
    store::open_index,
};
use std::path::{Path, PathBuf};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "hvac-assistant")]
#[command(version, about = "Ask questions about HVAC service records", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "HVAC_ASSISTANT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Generate sample customers, technicians, work orders, invoices and quotes
    Seed {
        /// Drop existing tables first
        #[arg(long)]
        drop: bool,

        /// Seed the generator for a reproducible data set
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Print the text chunks extracted from the database
    Extract {
        /// Only one table (customers, technicians, quotes, workorders, invoices)
        #[arg(long)]
        table: Option<Table>,

        /// Maximum number of chunks to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Embed every chunk and rebuild the vector index
    Index,

    /// Answer a question from the indexed records
    Ask {
        /// The question
        question: String,
    },

    /// Serve the web page and the /chat endpoint
    Serve {
        /// Listen address (defaults to server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show system status
    Status,

    /// Manage the records database
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Database management actions
#[derive(Subcommand)]
enum DbAction {
    /// Create the empty tables
    Init,

    /// Drop every table
    Drop {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Show row counts
    Status,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init { force } => {
            let base_dir = cli
                .config
                .as_deref()
                .and_then(Path::parent)
                .map(PathBuf::from)
                .unwrap_or_else(Config::default_base_dir);
            let report = cmd_init(base_dir, force)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_init_report(&report);
            }
            return Ok(());
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "hvac-assistant", &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref())?;
    let json = cli.json;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => {}

        Commands::Seed { drop, rng_seed } => {
            let db = HvacDb::connect(&config).await?;
            let options = SeedOptions {
                drop_existing: drop,
                rng_seed,
            };
            let result = cmd_seed(&config, &db, options).await;
            db.close().await;
            let stats = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_seed_stats(&stats);
            }
        }

        Commands::Extract { table, limit } => {
            let db = open_existing_db(&config).await?;
            let result = cmd_extract(&config, &db, ExtractOptions { table, limit }).await;
            db.close().await;
            let output = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_extract_output(&output);
            }
        }

        Commands::Index => {
            let db = open_existing_db(&config).await?;
            let embedder = create_embedder(&config.embedding)?;
            let index = open_index(&config, embedder.dimension()).await?;
            let result =
                cmd_index(&config, &db, embedder.as_ref(), index.as_ref(), !json).await;
            db.close().await;
            let stats = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_index_stats(&stats);
            }
        }

        Commands::Ask { question } => {
            let qa = build_chain(&config).await?;
            let answer = cmd_ask(&qa, &question).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&answer, cli.verbose);
            }
        }

        Commands::Serve { bind } => {
            let qa = build_chain(&config).await?;
            cmd_serve(&config, qa, bind.as_deref()).await?;
        }

        Commands::Status => {
            let status = cmd_status(&config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Db { action } => {
            handle_db_action(&config, action, json).await?;
        }
    }

    Ok(())
}

async fn handle_db_action(config: &Config, action: DbAction, json: bool) -> Result<()> {
    let db = HvacDb::connect(config).await?;
    let result = run_db_action(&db, action, json).await;
    db.close().await;
    result
}

async fn run_db_action(db: &HvacDb, action: DbAction, json: bool) -> Result<()> {
    match action {
        DbAction::Init => {
            cmd_db_init(db).await?;
            if json {
                println!(r#"{{"status": "ok", "message": "Tables created"}}"#);
            } else {
                println!("✓ Tables created");
            }
        }
        DbAction::Drop { yes } => {
            if !yes {
                eprintln!("This will delete every record. Re-run with --yes to confirm.");
            }
            cmd_db_drop(db, yes).await?;
            if json {
                println!(r#"{{"status": "ok", "message": "Tables dropped"}}"#);
            } else {
                println!("✓ Tables dropped");
            }
        }
        DbAction::Status => {
            let counts = cmd_db_status(db).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                println!("Database tables:");
                print_table_counts(&counts);
            }
        }
    }
    Ok(())
}

/// Explicit paths must exist; otherwise fall back to defaults under the base directory
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let config = Config::load_from(None)?;
            config.validate()?;
            Ok(config)
        }
    }
}

async fn open_existing_db(config: &Config) -> Result<HvacDb> {
    if !config.paths.db_file.exists() {
        return Err(Error::NotInitialized);
    }
    HvacDb::connect(config).await
}

async fn build_chain(config: &Config) -> Result<RetrievalQa> {
    let embedder = create_embedder(&config.embedding)?;
    let index = open_index(config, embedder.dimension()).await?;
    let llm = create_llm(&config.llm)?;
    Ok(RetrievalQa::new(config, embedder, index, llm))
}
