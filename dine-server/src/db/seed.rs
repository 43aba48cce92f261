//! Startup seeding
//!
//! Tables are created once and never destroyed; they only cycle through
//! occupancy states. Seeding guarantees tables `1..=table_count` exist and
//! leaves existing records untouched.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{RepoResult, TableRepository};

/// Ensure the physical tables exist
pub async fn seed_tables(db: &Surreal<Db>, table_count: u32) -> RepoResult<()> {
    let repo = TableRepository::new(db.clone());

    let mut created = 0u32;
    for number in 1..=table_count {
        if repo.find_by_number(number).await?.is_none() {
            repo.create(number).await?;
            created += 1;
        }
    }

    if created > 0 {
        tracing::info!(created, total = table_count, "Seeded dining tables");
    } else {
        tracing::debug!(total = table_count, "Dining tables already seeded");
    }

    Ok(())
}
