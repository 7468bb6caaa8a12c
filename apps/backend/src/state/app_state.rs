use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::orchestrator::SessionOrchestrator;
use crate::ws::registry::ConnectionRegistry;

/// Shared state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    registry: Arc<ConnectionRegistry>,
    orchestrator: Arc<SessionOrchestrator>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self {
            db,
            registry: Arc::clone(orchestrator.registry()),
            orchestrator,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }
}
