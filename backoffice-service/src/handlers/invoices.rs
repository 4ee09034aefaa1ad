use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::compute::line_items::{compute_document_totals, line_breakdown, LineBreakdown};
use crate::models::de::lenient_opt_f64;
use crate::models::{Invoice, InvoiceStatus, LineItem, TaxTable, TaxType};
use crate::services::metrics::{INVOICES_TOTAL, TOTALS_RECOMPUTED};
use crate::services::storage::Storage;
use crate::startup::AppState;

const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub tax_type: TaxType,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub customer_name: Option<String>,
    pub customer_id: Option<String>,
    pub tax_type: Option<TaxType>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Numeric fields coerce leniently like the creation path; a malformed
/// quantity sets the row to 0 instead of rejecting the update.
#[derive(Debug, Deserialize)]
pub struct UpdateLineItemRequest {
    pub item: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub discount: Option<f64>,
    pub account: Option<String>,
    pub tax_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub locator: String,
    pub url: String,
}

/// Line item echoed back with its computed figures, so a client can
/// show the per-row math next to the editable fields.
#[derive(Debug, Serialize)]
pub struct LineItemView {
    #[serde(flatten)]
    pub item: LineItem,
    pub breakdown: LineBreakdown,
}

pub(crate) fn line_item_views(
    items: &[LineItem],
    taxes: &TaxTable,
    tax_type: TaxType,
) -> Vec<LineItemView> {
    items
        .iter()
        .map(|item| LineItemView {
            breakdown: line_breakdown(item, taxes, tax_type),
            item: item.clone(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub invoice_id: String,
    pub customer_name: String,
    pub customer_id: Option<String>,
    pub status: InvoiceStatus,
    pub tax_type: TaxType,
    pub line_items: Vec<LineItemView>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceResponse {
    pub fn from_invoice(invoice: Invoice, storage: &dyn Storage, taxes: &TaxTable) -> Self {
        let attachments = invoice
            .attachments
            .iter()
            .map(|locator| AttachmentResponse {
                locator: locator.clone(),
                url: storage.download_url(locator),
            })
            .collect();
        let line_items = line_item_views(&invoice.line_items, taxes, invoice.tax_type);
        Self {
            invoice_id: invoice.invoice_id,
            customer_name: invoice.customer_name,
            customer_id: invoice.customer_id,
            status: invoice.status,
            tax_type: invoice.tax_type,
            line_items,
            subtotal: invoice.subtotal,
            total_tax: invoice.total_tax,
            total: invoice.total,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            paid_date: invoice.paid_date,
            notes: invoice.notes,
            attachments,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

fn recompute(invoice: &mut Invoice, state: &AppState) {
    let totals = compute_document_totals(&invoice.line_items, &state.tax_table, invoice.tax_type);
    invoice.apply_totals(totals);
    TOTALS_RECOMPUTED.with_label_values(&["invoice"]).inc();
}

async fn fetch_invoice(state: &AppState, id: &str) -> Result<Invoice, AppError> {
    state
        .store
        .get_invoice(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id)))
}

async fn fetch_editable_invoice(state: &AppState, id: &str) -> Result<Invoice, AppError> {
    let invoice = fetch_invoice(state, id).await?;
    if !invoice.is_editable() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Paid invoices cannot be modified"
        )));
    }
    Ok(invoice)
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut invoice = Invoice::new(payload.customer_name, payload.tax_type);
    invoice.customer_id = payload.customer_id;
    invoice.line_items = payload.line_items;
    invoice.issue_date = payload.issue_date;
    invoice.due_date = payload.due_date;
    invoice.notes = payload.notes;
    recompute(&mut invoice, &state);

    state.store.put_invoice(&invoice).await?;
    INVOICES_TOTAL.with_label_values(&["draft"]).inc();
    tracing::info!(invoice_id = %invoice.invoice_id, total = invoice.total, "Created invoice");

    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from_invoice(
            invoice,
            state.storage.as_ref(),
            &state.tax_table,
        )),
    ))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<InvoiceListParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params.status.as_deref().map(InvoiceStatus::from_string);
    let invoices = state.store.list_invoices(status).await?;
    let responses: Vec<InvoiceResponse> = invoices
        .into_iter()
        .map(|i| InvoiceResponse::from_invoice(i, state.storage.as_ref(), &state.tax_table))
        .collect();
    Ok(Json(responses))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = fetch_invoice(&state, &id).await?;
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_editable_invoice(&state, &id).await?;

    if let Some(name) = payload.customer_name {
        if name.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Customer name cannot be empty"
            )));
        }
        invoice.customer_name = name;
    }
    if let Some(customer_id) = payload.customer_id {
        invoice.customer_id = Some(customer_id);
    }
    if let Some(tax_type) = payload.tax_type {
        invoice.tax_type = tax_type;
    }
    if let Some(issue_date) = payload.issue_date {
        invoice.issue_date = Some(issue_date);
    }
    if let Some(due_date) = payload.due_date {
        invoice.due_date = Some(due_date);
    }
    if let Some(notes) = payload.notes {
        invoice.notes = Some(notes);
    }

    recompute(&mut invoice, &state);
    state.store.put_invoice(&invoice).await?;
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

/// Only drafts may be deleted; anything issued stays on the books.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = fetch_invoice(&state, &id).await?;
    if invoice.status != InvoiceStatus::Draft {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only draft invoices can be deleted"
        )));
    }
    state.store.delete_invoice(&id).await?;
    tracing::info!(invoice_id = %id, "Deleted draft invoice");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_line_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(item): Json<LineItem>,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_editable_invoice(&state, &id).await?;
    invoice.line_items.push(item);
    recompute(&mut invoice, &state);
    state.store.put_invoice(&invoice).await?;
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

pub async fn update_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateLineItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_editable_invoice(&state, &id).await?;
    let line = invoice
        .line_items
        .iter_mut()
        .find(|l| l.line_item_id == line_item_id)
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Line item {} not found", line_item_id))
        })?;

    apply_line_item_update(line, payload);
    recompute(&mut invoice, &state);
    state.store.put_invoice(&invoice).await?;
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

pub(crate) fn apply_line_item_update(line: &mut LineItem, payload: UpdateLineItemRequest) {
    if let Some(item) = payload.item {
        line.item = Some(item);
    }
    if let Some(description) = payload.description {
        line.description = description;
    }
    if let Some(quantity) = payload.quantity {
        line.quantity = quantity;
    }
    if let Some(unit_price) = payload.unit_price {
        line.unit_price = unit_price;
    }
    if let Some(discount) = payload.discount {
        line.discount = discount;
    }
    if let Some(account) = payload.account {
        line.account = Some(account);
    }
    if let Some(tax_rate) = payload.tax_rate {
        line.tax_rate = tax_rate;
    }
}

pub async fn remove_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_editable_invoice(&state, &id).await?;
    let before = invoice.line_items.len();
    invoice.line_items.retain(|l| l.line_item_id != line_item_id);
    if invoice.line_items.len() == before {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Line item {} not found",
            line_item_id
        )));
    }
    recompute(&mut invoice, &state);
    state.store.put_invoice(&invoice).await?;
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

/// Status moves forward only; a paid invoice marks itself with today's
/// date if the client did not already set one.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_invoice(&state, &id).await?;
    let next = InvoiceStatus::from_string(&payload.status);
    if !invoice.can_transition_to(next) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Cannot move invoice from {} to {}",
            invoice.status.as_str(),
            next.as_str()
        )));
    }

    invoice.status = next;
    if next == InvoiceStatus::Paid && invoice.paid_date.is_none() {
        invoice.paid_date = Some(Utc::now().date_naive());
    }
    invoice.updated_at = Utc::now();

    state.store.put_invoice(&invoice).await?;
    INVOICES_TOTAL.with_label_values(&[next.as_str()]).inc();
    tracing::info!(invoice_id = %id, status = next.as_str(), "Invoice status changed");
    Ok(Json(InvoiceResponse::from_invoice(
        invoice,
        state.storage.as_ref(),
        &state.tax_table,
    )))
}

pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut invoice = fetch_editable_invoice(&state, &id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e)))?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let filename = field.file_name().unwrap_or("attachment").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?;

    if data.len() > MAX_ATTACHMENT_BYTES {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Attachment too large (max 10MB)"
        )));
    }

    let locator = state.storage.upload(&filename, &data).await?;
    invoice.attachments.push(locator.clone());
    invoice.updated_at = Utc::now();
    state.store.put_invoice(&invoice).await?;

    tracing::info!(invoice_id = %id, locator = %locator, "Attached file to invoice");
    Ok((
        StatusCode::CREATED,
        Json(AttachmentResponse {
            url: state.storage.download_url(&locator),
            locator,
        }),
    ))
}
