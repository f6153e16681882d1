//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Where init wrote things
#[derive(Debug, Clone, Serialize)]
pub struct InitReport {
    pub config_path: String,
    pub db_path: String,
    pub index_dir: String,
}

/// Write a default configuration under `base_dir`
pub fn cmd_init(base_dir: PathBuf, force: bool) -> Result<InitReport> {
    let mut config = Config::default();
    config.init_paths(Some(base_dir));

    if config.is_initialized() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.validate()?;
    config.save()?;
    std::fs::create_dir_all(&config.paths.index_dir)?;
    info!("Created index directory at {:?}", config.paths.index_dir);

    Ok(InitReport {
        config_path: config.paths.config_file.display().to_string(),
        db_path: config.paths.db_file.display().to_string(),
        index_dir: config.paths.index_dir.display().to_string(),
    })
}

pub fn print_init_report(report: &InitReport) {
    println!("✓ hvac-assistant initialized");
    println!("  Config: {}", report.config_path);
    println!("  Database: {}", report.db_path);
    println!("  Index: {}", report.index_dir);
    println!("\nNext steps:");
    println!("  hvac-assistant seed                 # Generate sample records");
    println!("  hvac-assistant index                # Embed every row");
    println!("  hvac-assistant ask \"Which work orders are on hold?\"");
    println!("  hvac-assistant serve                # Web UI and POST /chat");
}
