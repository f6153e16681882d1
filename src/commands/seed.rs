//! Seed command - generate and store sample records

use crate::config::Config;
use crate::db::{HvacDb, TableCounts};
use crate::error::{Error, Result};
use crate::seed::{generate, rng_from_config};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// Drop existing tables first
    pub drop_existing: bool,
    /// Overrides `seed.rng_seed`
    pub rng_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedStats {
    pub anchor_date: String,
    pub rng_seed: Option<u64>,
    pub counts: TableCounts,
}

pub async fn cmd_seed(config: &Config, db: &HvacDb, options: SeedOptions) -> Result<SeedStats> {
    let mut seed_config = config.seed.clone();
    if options.rng_seed.is_some() {
        seed_config.rng_seed = options.rng_seed;
    }

    let anchor = seed_config.anchor()?;
    info!("Generating sample data anchored at {}", anchor);

    let mut rng = rng_from_config(&seed_config);
    let data = generate(&seed_config, anchor, &mut rng)?;

    if !options.drop_existing && db.is_initialized().await? {
        return Err(Error::Seed(
            "Tables already exist; rerun with --drop to replace them".to_string(),
        ));
    }

    let counts = db.seed_database(&data, options.drop_existing).await?;

    Ok(SeedStats {
        anchor_date: anchor.to_string(),
        rng_seed: seed_config.rng_seed,
        counts,
    })
}

pub fn print_seed_stats(stats: &SeedStats) {
    println!("✓ Database seeded (anchor date {})", stats.anchor_date);
    println!("  Customers: {}", stats.counts.customers);
    println!("  Technicians: {}", stats.counts.technicians);
    println!("  Work orders: {}", stats.counts.work_orders);
    println!("  Invoices: {}", stats.counts.invoices);
    println!("  Quotes: {}", stats.counts.quotes);
    if let Some(seed) = stats.rng_seed {
        println!("  RNG seed: {}", seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::setup_test_db;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.seed.customers = 5;
        config.seed.technicians = 2;
        config.seed.work_orders = 10;
        config.seed.quotes = 4;
        config.seed.anchor_date = Some("2024-01-31".to_string());
        config
    }

    #[tokio::test]
    async fn test_seed_then_reseed_with_drop() {
        let (db, _tmp) = setup_test_db(true).await;
        let config = small_config();

        let stats = cmd_seed(
            &config,
            &db,
            SeedOptions {
                rng_seed: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(stats.counts.customers, 5);
        assert_eq!(stats.counts.quotes, 4);
        assert_eq!(stats.anchor_date, "2024-01-31");
        assert_eq!(db.table_counts().await.unwrap(), stats.counts);

        let err = cmd_seed(&config, &db, SeedOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Seed(_)));

        let again = cmd_seed(
            &config,
            &db,
            SeedOptions {
                drop_existing: true,
                rng_seed: Some(3),
            },
        )
        .await
        .unwrap();
        assert_eq!(again.counts, stats.counts);
    }
}
