//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ruzma_core::config::AppConfig;
use ruzma_database::{DatabasePool, MilestoneStore};
use ruzma_service::{
    DeliverableService, DeliverableWriter, LinkService, MilestoneService, RevisionService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Postgres pool; `None` when running on another store.
    pub db_pool: Option<DatabasePool>,
    /// Milestone CRUD.
    pub milestone_service: Arc<MilestoneService>,
    /// Deliverable field view and maintenance.
    pub deliverable_service: Arc<DeliverableService>,
    /// Shared link editing.
    pub link_service: Arc<LinkService>,
    /// Revision requests.
    pub revision_service: Arc<RevisionService>,
}

impl AppState {
    /// Wires every service onto `store`.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn MilestoneStore>,
        db_pool: Option<DatabasePool>,
    ) -> Self {
        let writer = Arc::new(DeliverableWriter::new(
            Arc::clone(&store),
            &config.deliverables,
        ));

        Self {
            milestone_service: Arc::new(MilestoneService::new(Arc::clone(&store))),
            deliverable_service: Arc::new(DeliverableService::new(
                Arc::clone(&store),
                Arc::clone(&writer),
            )),
            link_service: Arc::new(LinkService::new(Arc::clone(&writer))),
            revision_service: Arc::new(RevisionService::new(writer)),
            config: Arc::new(config),
            db_pool,
        }
    }
}
