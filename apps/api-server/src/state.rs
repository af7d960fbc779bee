//! Application state - shared across all handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use postpilot_core::domain::{PUBLISH_POST, SchedulerClock};
use postpilot_core::ports::{FileStore, PostRepository, TaskStore};
use postpilot_core::services::{MutationLock, PostService, PublishHandler, Reconciler};
use postpilot_infra::{
    BroadcastNotifier, DelayedTaskScheduler, InMemoryPostRepository, InMemoryTaskStore,
    LocalFileStore,
};

use crate::config::AppConfig;

// One scheduler and one startup reconciliation per process.
static BOOTSTRAPPED: AtomicBool = AtomicBool::new(false);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub files: Arc<dyn FileStore>,
    pub scheduler: Arc<DelayedTaskScheduler>,
    pub notifier: Arc<BroadcastNotifier>,
    pub reconciler: Arc<Reconciler>,
    pub clock: SchedulerClock,
}

impl AppState {
    /// Wire stores, scheduler and services. The scheduler is not started here.
    ///
    /// Fails if state was already built in this process.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        if BOOTSTRAPPED.swap(true, Ordering::SeqCst) {
            anyhow::bail!("application state is already initialized in this process");
        }

        let (post_repo, task_store) = open_stores(config).await?;
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(&config.upload_dir).await?);

        Ok(Self::assemble(post_repo, task_store, files, config).await)
    }

    /// In-memory state over a scratch upload directory.
    #[cfg(test)]
    pub(crate) async fn for_tests(upload_dir: &std::path::Path) -> Self {
        let config = test_config(upload_dir);
        let (post_repo, task_store) = in_memory_stores();
        let files: Arc<dyn FileStore> = Arc::new(
            LocalFileStore::new(upload_dir)
                .await
                .expect("upload dir should be creatable"),
        );
        Self::assemble(post_repo, task_store, files, &config).await
    }

    async fn assemble(
        post_repo: Arc<dyn PostRepository>,
        task_store: Arc<dyn TaskStore>,
        files: Arc<dyn FileStore>,
        config: &AppConfig,
    ) -> Self {
        let notifier = Arc::new(BroadcastNotifier::default());
        let scheduler = Arc::new(DelayedTaskScheduler::new(
            task_store,
            config.clock,
            config.scheduler.clone(),
        ));

        let publisher = Arc::new(PublishHandler::new(
            post_repo.clone(),
            notifier.clone(),
            config.clock,
        ));
        scheduler
            .register_handler(PUBLISH_POST, publisher.task_handler())
            .await;

        let mutation = MutationLock::default();
        let reconciler = Arc::new(Reconciler::new(
            post_repo.clone(),
            scheduler.clone(),
            publisher,
            config.clock,
            mutation.clone(),
        ));
        let posts = Arc::new(PostService::new(
            post_repo,
            scheduler.clone(),
            files.clone(),
            mutation,
        ));

        tracing::info!("Application state initialized");

        Self {
            posts,
            files,
            scheduler,
            notifier,
            reconciler,
            clock: config.clock,
        }
    }
}

#[cfg(feature = "database")]
async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn TaskStore>)> {
    use migration::MigratorTrait;
    use postpilot_infra::{SeaOrmPostRepository, SeaOrmTaskStore};

    let Some(db_config) = &config.database else {
        return Ok(in_memory_stores());
    };

    let db = postpilot_infra::connect(db_config).await?;
    if db_config.auto_migrate {
        migration::Migrator::up(&db, None).await?;
        tracing::info!("Database migrations applied");
    }

    let posts: Arc<dyn PostRepository> = Arc::new(SeaOrmPostRepository::new(db.clone()));
    let tasks: Arc<dyn TaskStore> = Arc::new(SeaOrmTaskStore::new(db));
    Ok((posts, tasks))
}

#[cfg(not(feature = "database"))]
async fn open_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn PostRepository>, Arc<dyn TaskStore>)> {
    if config.database.is_some() {
        tracing::warn!("DATABASE_URL is set but the database feature is disabled");
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (Arc<dyn PostRepository>, Arc<dyn TaskStore>) {
    tracing::warn!(
        "DATABASE_URL not set. Running with in-memory stores, posts and tasks are lost on restart."
    );
    let posts: Arc<dyn PostRepository> = Arc::new(InMemoryPostRepository::new());
    let tasks: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new());
    (posts, tasks)
}

#[cfg(test)]
fn test_config(upload_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        socketio_port: 0,
        database: None,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        clock: SchedulerClock::default(),
        scheduler: postpilot_infra::DelayedSchedulerConfig::default(),
        reconcile_cron: None,
    }
}
