use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use backoffice_service::config::{
    BackofficeConfig, MongoConfig, PayrollConfig, StorageConfig, StoreBackend, TaxConfig,
};
use backoffice_service::models::TaxTable;
use backoffice_service::services::storage::LocalStorage;
use backoffice_service::services::store::{MemoryStore, RecordStore};
use backoffice_service::startup::{build_router, AppState};

pub const TAX_LABEL: &str = "Tax on Sales (15%)";

pub fn test_config() -> BackofficeConfig {
    BackofficeConfig {
        common: service_core::config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        service_name: "backoffice-service-test".to_string(),
        log_level: "warn".to_string(),
        store_backend: StoreBackend::Memory,
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "backoffice_test".to_string(),
        },
        storage: StorageConfig {
            local_path: std::env::temp_dir()
                .join("backoffice-test-storage")
                .to_string_lossy()
                .into_owned(),
            public_base_url: "http://localhost:8080/files".to_string(),
        },
        tax: TaxConfig {
            taxable_label: TAX_LABEL.to_string(),
            rate_percent: 15.0,
        },
        payroll: PayrollConfig {
            overtime_rate_per_km: 0.45,
            fallback_base_pay: 0.0,
            tax_percent_of_base: 0.0,
            flat_deduction: 0.0,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_store_impl(store.clone(), store)
    }

    /// Build the app over a custom store while keeping a handle to the
    /// memory store used for seeding fixtures.
    pub fn with_store(custom: Arc<dyn RecordStore>, seed: Arc<MemoryStore>) -> Self {
        Self::with_store_impl(custom, seed)
    }

    fn with_store_impl(store: Arc<dyn RecordStore>, seed: Arc<MemoryStore>) -> Self {
        let config = test_config();
        let storage = Arc::new(LocalStorage::new(
            &config.storage.local_path,
            &config.storage.public_base_url,
        ));
        let tax_table = TaxTable::single(config.tax.taxable_label.clone(), config.tax.rate_percent);
        let state = AppState::new(config, store, storage, tax_table);
        Self {
            router: build_router(state),
            store: seed,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(json) => builder
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}
