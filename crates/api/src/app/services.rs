//! Store wiring shared by every handler.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use solarworks_infra::store::{
    ensure_schema, InMemoryInventoryStore, InMemoryProjectStore, PgInventoryStore, PgProjectStore,
};
use solarworks_infra::{InventoryStore, ProjectStore};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<dyn InventoryStore>,
    pub projects: Arc<dyn ProjectStore>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            inventory: Arc::new(InMemoryInventoryStore::new()),
            projects: Arc::new(InMemoryProjectStore::new()),
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            inventory: Arc::new(PgInventoryStore::new(pool.clone())),
            projects: Arc::new(PgProjectStore::new(pool)),
        }
    }
}

/// Build the stores selected by `config`: PostgreSQL when a database is
/// configured (schema is created if missing), in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let Some(db) = &config.database else {
        tracing::info!(backend = "in_memory", "using in-memory stores; data is lost on restart");
        return Ok(AppServices::in_memory());
    };

    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .connect(&db.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    ensure_schema(&pool)
        .await
        .context("failed to create database schema")?;

    tracing::info!(
        backend = "postgres",
        max_connections = db.max_connections,
        "connected to database"
    );
    Ok(AppServices::postgres(pool))
}
