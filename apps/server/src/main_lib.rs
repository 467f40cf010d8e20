use std::sync::Arc;

use crate::{config::Config, notifications::ServerNotificationSink};
use nestegg_core::{
    events::{NotificationRepositoryTrait, NotificationSink},
    savings::{SavingsRepositoryTrait, SavingsService, SavingsServiceTrait},
};
use nestegg_storage_sqlite::{db, NotificationRepository, SavingsRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub savings_service: Arc<dyn SavingsServiceTrait>,
    pub notification_repository: Arc<dyn NotificationRepositoryTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("NESTEGG_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `try_init` also installs the `log` bridge used by the core and storage crates.
    let result = if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("Tracing already initialised: {}", err);
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let savings_repository: Arc<dyn SavingsRepositoryTrait> =
        Arc::new(SavingsRepository::new(pool.clone(), writer.clone()));
    let notification_repository: Arc<dyn NotificationRepositoryTrait> =
        Arc::new(NotificationRepository::new(pool.clone(), writer.clone()));

    let notification_sink: Arc<dyn NotificationSink> = Arc::new(ServerNotificationSink::start(
        notification_repository.clone(),
    ));
    let savings_service: Arc<dyn SavingsServiceTrait> = Arc::new(SavingsService::new(
        savings_repository,
        notification_sink,
    ));

    Ok(Arc::new(AppState {
        savings_service,
        notification_repository,
    }))
}
