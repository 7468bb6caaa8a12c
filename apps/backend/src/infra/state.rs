use std::sync::Arc;

use crate::config::db::DbSettings;
use crate::domain::random::{ChaChaSource, RandomSource};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::services::catalog::{self, Catalog};
use crate::services::orchestrator::SessionOrchestrator;
use crate::services::round_scheduler::SchedulerConfig;
use crate::state::app_state::AppState;
use crate::ws::registry::ConnectionRegistry;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    db: DbSettings,
    scheduler: SchedulerConfig,
    rng: Option<Arc<dyn RandomSource>>,
    catalog: Option<Catalog>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db: DbSettings::sqlite_memory(),
            scheduler: SchedulerConfig::default(),
            rng: None,
            catalog: None,
        }
    }

    pub fn with_db(mut self, settings: DbSettings) -> Self {
        self.db = settings;
        self
    }

    pub fn with_scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    /// Deterministic randomness for tests; defaults to an OS-seeded ChaCha.
    pub fn with_rng(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Seed this catalog after migrations (skipped if rows already exist).
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        // single entrypoint: connect + migrate
        let db = bootstrap_db(&self.db).await?;
        if let Some(catalog) = self.catalog {
            catalog::seed(&db, catalog).await?;
        }

        let rng = self
            .rng
            .unwrap_or_else(|| Arc::new(ChaChaSource::new(None)));
        let orchestrator = SessionOrchestrator::new(
            db.clone(),
            Arc::new(ConnectionRegistry::new()),
            rng,
            self.scheduler,
        );
        Ok(AppState::new(db, Arc::new(orchestrator)))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
