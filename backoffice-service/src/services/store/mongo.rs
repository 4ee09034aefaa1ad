//! MongoDB record store.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use tracing::{info, instrument};

use crate::models::{
    Employee, Invoice, InvoiceStatus, LeaveRequest, PayrollRun, Quote, QuoteStatus, Trip,
};
use crate::services::metrics::STORE_OP_DURATION;

use super::RecordStore;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        info!("Creating MongoDB indexes for backoffice-service");

        self.create_index(&self.invoices(), doc! { "status": 1 }, "invoice_status")
            .await?;
        self.create_index(&self.quotes(), doc! { "status": 1 }, "quote_status")
            .await?;
        self.create_index(
            &self.trips(),
            doc! { "driver_id": 1, "status": 1 },
            "trip_driver_status",
        )
        .await?;
        self.create_index(
            &self.leave_requests(),
            doc! { "status": 1 },
            "leave_status",
        )
        .await?;

        Ok(())
    }

    async fn create_index<T>(
        &self,
        collection: &Collection<T>,
        keys: Document,
        name: &str,
    ) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().name(name.to_string()).build())
            .build();
        collection.create_index(index, None).await.map_err(|e| {
            tracing::error!("Failed to create index {}: {}", name, e);
            AppError::from(e)
        })?;
        info!(index = %name, "Created index");
        Ok(())
    }

    fn invoices(&self) -> Collection<Invoice> {
        self.db.collection("invoices")
    }

    fn quotes(&self) -> Collection<Quote> {
        self.db.collection("quotes")
    }

    fn employees(&self) -> Collection<Employee> {
        self.db.collection("employees")
    }

    fn trips(&self) -> Collection<Trip> {
        self.db.collection("trips")
    }

    fn payroll_runs(&self) -> Collection<PayrollRun> {
        self.db.collection("payroll_runs")
    }

    fn leave_requests(&self) -> Collection<LeaveRequest> {
        self.db.collection("leave_requests")
    }

    async fn upsert<T>(
        &self,
        collection: Collection<T>,
        id: &str,
        record: &T,
        operation: &str,
    ) -> Result<(), AppError>
    where
        T: serde::Serialize + Send + Sync,
    {
        let timer = STORE_OP_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let options = ReplaceOptions::builder().upsert(true).build();
        collection
            .replace_one(doc! { "_id": id }, record, options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", operation, e))
            })?;
        timer.observe_duration();
        Ok(())
    }

    fn status_filter<S: serde::Serialize>(status: Option<S>) -> Result<Document, AppError> {
        let mut filter = doc! {};
        if let Some(status) = status {
            let bson_status = mongodb::bson::to_bson(&status).map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to serialize status: {}", e))
            })?;
            filter.insert("status", bson_status);
        }
        Ok(filter)
    }

    async fn find_sorted<T>(
        &self,
        collection: Collection<T>,
        filter: Document,
        operation: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: serde::de::DeserializeOwned + Send + Sync + Unpin,
    {
        let timer = STORE_OP_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();
        let mut cursor = collection.find(filter, options).await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", operation, e))
        })?;

        let mut records = Vec::new();
        while let Some(record) = cursor.try_next().await.map_err(AppError::from)? {
            records.push(record);
        }
        timer.observe_duration();
        Ok(records)
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.invoice_id))]
    async fn put_invoice(&self, invoice: &Invoice) -> Result<(), AppError> {
        self.upsert(self.invoices(), &invoice.invoice_id, invoice, "put_invoice")
            .await
    }

    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        self.invoices()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))
    }

    async fn list_invoices(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, AppError> {
        let filter = Self::status_filter(status)?;
        self.find_sorted(self.invoices(), filter, "list_invoices")
            .await
    }

    #[instrument(skip(self))]
    async fn delete_invoice(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .invoices()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, quote), fields(quote_id = %quote.quote_id))]
    async fn put_quote(&self, quote: &Quote) -> Result<(), AppError> {
        self.upsert(self.quotes(), &quote.quote_id, quote, "put_quote")
            .await
    }

    async fn get_quote(&self, id: &str) -> Result<Option<Quote>, AppError> {
        self.quotes()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quote: {}", e)))
    }

    async fn list_quotes(&self, status: Option<QuoteStatus>) -> Result<Vec<Quote>, AppError> {
        let filter = Self::status_filter(status)?;
        self.find_sorted(self.quotes(), filter, "list_quotes").await
    }

    #[instrument(skip(self))]
    async fn delete_quote(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .quotes()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete quote: {}", e))
            })?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, employee), fields(employee_id = %employee.employee_id))]
    async fn put_employee(&self, employee: &Employee) -> Result<(), AppError> {
        self.upsert(
            self.employees(),
            &employee.employee_id,
            employee,
            "put_employee",
        )
        .await
    }

    async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        self.employees()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get employee: {}", e)))
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        self.find_sorted(self.employees(), doc! {}, "list_employees")
            .await
    }

    #[instrument(skip(self, trip), fields(trip_id = %trip.trip_id))]
    async fn put_trip(&self, trip: &Trip) -> Result<(), AppError> {
        self.upsert(self.trips(), &trip.trip_id, trip, "put_trip")
            .await
    }

    async fn list_trips(&self, driver_id: Option<&str>) -> Result<Vec<Trip>, AppError> {
        let mut filter = doc! {};
        if let Some(driver_id) = driver_id {
            filter.insert("driver_id", driver_id);
        }
        self.find_sorted(self.trips(), filter, "list_trips").await
    }

    #[instrument(skip(self, run), fields(run_id = %run.run_id))]
    async fn put_payroll_run(&self, run: &PayrollRun) -> Result<(), AppError> {
        self.upsert(self.payroll_runs(), &run.run_id, run, "put_payroll_run")
            .await
    }

    async fn get_payroll_run(&self, id: &str) -> Result<Option<PayrollRun>, AppError> {
        self.payroll_runs()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get payroll run: {}", e))
            })
    }

    async fn list_payroll_runs(&self) -> Result<Vec<PayrollRun>, AppError> {
        self.find_sorted(self.payroll_runs(), doc! {}, "list_payroll_runs")
            .await
    }

    #[instrument(skip(self, request), fields(leave_id = %request.leave_id))]
    async fn put_leave_request(&self, request: &LeaveRequest) -> Result<(), AppError> {
        self.upsert(
            self.leave_requests(),
            &request.leave_id,
            request,
            "put_leave_request",
        )
        .await
    }

    async fn get_leave_request(&self, id: &str) -> Result<Option<LeaveRequest>, AppError> {
        self.leave_requests()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to get leave request: {}", e))
            })
    }

    async fn list_leave_requests(&self) -> Result<Vec<LeaveRequest>, AppError> {
        self.find_sorted(self.leave_requests(), doc! {}, "list_leave_requests")
            .await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
