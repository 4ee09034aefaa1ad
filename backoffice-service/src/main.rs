use std::sync::Arc;

use service_core::error::AppError;
use service_core::observability::init_tracing;
use tracing::info;

use backoffice_service::config::{BackofficeConfig, StoreBackend};
use backoffice_service::models::TaxTable;
use backoffice_service::services::metrics::init_metrics;
use backoffice_service::services::storage::LocalStorage;
use backoffice_service::services::store::{MemoryStore, MongoStore, RecordStore};
use backoffice_service::startup::{build_router, shutdown_signal, AppState};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = BackofficeConfig::load()?;
    init_tracing(&config.service_name, &config.log_level);
    init_metrics();

    info!(
        service = %config.service_name,
        backend = ?config.store_backend,
        "Starting backoffice-service"
    );

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Mongo => {
            let mongo = MongoStore::connect(&config.mongodb.uri, &config.mongodb.database).await?;
            mongo.initialize_indexes().await?;
            Arc::new(mongo)
        }
        StoreBackend::Memory => {
            info!("Using in-memory record store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let storage = Arc::new(LocalStorage::new(
        &config.storage.local_path,
        &config.storage.public_base_url,
    ));

    let tax_table = TaxTable::single(config.tax.taxable_label.clone(), config.tax.rate_percent);

    let addr = format!("{}:{}", config.common.host, config.common.port);
    let state = AppState::new(config, store, storage, tax_table);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "backoffice-service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("backoffice-service stopped");
    Ok(())
}
