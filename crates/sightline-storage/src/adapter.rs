// SPDX-FileCopyrightText: 2026 Sightline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`VolunteerDirectory`] trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use sightline_config::model::StorageConfig;
use sightline_core::{
    Adapter, HealthStatus, SightlineError, UserId, VolunteerDirectory, VolunteerRecord,
};

use crate::database::Database;
use crate::queries::volunteers;

/// SQLite-backed volunteer directory.
///
/// The database is opened lazily by [`initialize`](Self::initialize); every
/// other operation fails with a storage error until then.
pub struct SqliteVolunteerDirectory {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteVolunteerDirectory {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), SightlineError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| SightlineError::storage("volunteer directory already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite volunteer directory initialized");
        Ok(())
    }

    /// Checkpoint and release the database, if it was opened.
    pub async fn close(&self) -> Result<(), SightlineError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    fn db(&self) -> Result<&Database, SightlineError> {
        self.db
            .get()
            .ok_or_else(|| SightlineError::storage("volunteer directory not initialized"))
    }
}

#[async_trait]
impl Adapter for SqliteVolunteerDirectory {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, SightlineError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VolunteerDirectory for SqliteVolunteerDirectory {
    async fn reserve_available(&self) -> Result<Option<VolunteerRecord>, SightlineError> {
        volunteers::reserve_available(self.db()?).await
    }

    async fn claim(&self, user_id: &UserId) -> Result<bool, SightlineError> {
        volunteers::claim_volunteer(self.db()?, user_id).await
    }

    async fn set_available(
        &self,
        user_id: &UserId,
        available: bool,
    ) -> Result<bool, SightlineError> {
        volunteers::set_available(self.db()?, user_id, available).await
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<VolunteerRecord>, SightlineError> {
        volunteers::get_volunteer(self.db()?, user_id).await
    }

    async fn upsert(&self, record: &VolunteerRecord) -> Result<(), SightlineError> {
        volunteers::upsert_volunteer(self.db()?, record).await
    }

    async fn list(&self) -> Result<Vec<VolunteerRecord>, SightlineError> {
        volunteers::list_volunteers(self.db()?).await
    }
}
