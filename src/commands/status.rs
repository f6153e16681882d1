//! Status command implementation

use crate::config::Config;
use crate::db::{HvacDb, TableCounts};
use crate::error::Result;
use crate::store::open_index;
use serde::Serialize;
use tracing::{debug, info};

/// Status information
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub config_exists: bool,
    pub db_path: String,
    pub db_initialized: bool,
    pub table_counts: Option<TableCounts>,
    pub embedding_backend: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub index_backend: String,
    pub index_location: Option<String>,
    pub indexed_chunks: Option<usize>,
    pub llm_provider: String,
    pub llm_model: String,
}

/// Get system status without creating anything on disk
pub async fn cmd_status(config: &Config) -> Result<StatusInfo> {
    info!("Getting status");

    let mut table_counts = None;
    let mut db_initialized = false;
    if config.paths.db_file.exists() {
        let db = HvacDb::connect(config).await?;
        db_initialized = db.is_initialized().await?;
        if db_initialized {
            table_counts = Some(db.table_counts().await?);
        }
        db.close().await;
    }

    let dimension = config.embedding.resolved_dimension();
    let index_on_disk = match config.index.backend {
        crate::config::IndexBackend::Local => config.paths.index_dir.exists(),
        crate::config::IndexBackend::Qdrant => true,
    };

    let (index_location, indexed_chunks) = if index_on_disk {
        match open_index(config, dimension).await {
            Ok(index) => match index.count().await {
                Ok(count) => (Some(index.describe()), Some(count)),
                Err(e) => {
                    debug!("Index count error: {:?}", e);
                    (Some(index.describe()), None)
                }
            },
            Err(e) => {
                debug!("Index connection error: {:?}", e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        config_exists: config.is_initialized(),
        db_path: config.paths.db_file.display().to_string(),
        db_initialized,
        table_counts,
        embedding_backend: format!("{:?}", config.embedding.backend).to_lowercase(),
        embedding_model: config.embedding.model.clone(),
        embedding_dimension: dimension,
        index_backend: format!("{:?}", config.index.backend).to_lowercase(),
        index_location,
        indexed_chunks,
        llm_provider: config.llm.provider.to_string(),
        llm_model: config.llm.model.clone(),
    })
}

pub fn print_status(status: &StatusInfo) {
    println!("hvac-assistant status\n");
    let config_note = if status.config_exists { "" } else { " (not found, using defaults)" };
    println!("Config: {}{}", status.config_path, config_note);
    println!("Database: {}", status.db_path);

    match &status.table_counts {
        Some(counts) => {
            println!("  Customers: {}", counts.customers);
            println!("  Technicians: {}", counts.technicians);
            println!("  Work orders: {}", counts.work_orders);
            println!("  Invoices: {}", counts.invoices);
            println!("  Quotes: {}", counts.quotes);
        }
        None => println!("  ✗ Not seeded (run `hvac-assistant seed`)"),
    }

    println!(
        "\nEmbeddings: {} via {} ({} dims)",
        status.embedding_model, status.embedding_backend, status.embedding_dimension
    );

    println!("Index ({}):", status.index_backend);
    match (&status.index_location, status.indexed_chunks) {
        (Some(location), Some(chunks)) => {
            println!("  Location: {}", location);
            println!("  Chunks: {}", chunks);
        }
        (Some(location), None) => {
            println!("  Location: {}", location);
            println!("  ✗ Unreadable");
        }
        _ => println!("  ✗ Not built (run `hvac-assistant index`)"),
    }

    println!("\nLanguage model: {} ({})", status.llm_model, status.llm_provider);
}
