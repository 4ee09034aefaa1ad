use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

use crate::compute::line_items::compute_document_totals;
use crate::models::{LineItem, Quote, QuoteStatus, TaxTable, TaxType};
use crate::services::metrics::{INVOICES_TOTAL, TOTALS_RECOMPUTED};
use crate::startup::AppState;

use super::invoices::{
    apply_line_item_update, line_item_views, InvoiceResponse, LineItemView, StatusUpdateRequest,
    UpdateLineItemRequest,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    pub customer_id: Option<String>,
    #[serde(default)]
    pub tax_type: TaxType,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuoteRequest {
    pub customer_name: Option<String>,
    pub customer_id: Option<String>,
    pub tax_type: Option<TaxType>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteListParams {
    pub status: Option<String>,
}

/// Quote echoed back with per-row computed figures, matching the
/// invoice response shape.
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote_id: String,
    pub customer_name: String,
    pub customer_id: Option<String>,
    pub status: QuoteStatus,
    pub tax_type: TaxType,
    pub line_items: Vec<LineItemView>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub converted_invoice_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteResponse {
    pub fn from_quote(quote: Quote, taxes: &TaxTable) -> Self {
        let line_items = line_item_views(&quote.line_items, taxes, quote.tax_type);
        Self {
            quote_id: quote.quote_id,
            customer_name: quote.customer_name,
            customer_id: quote.customer_id,
            status: quote.status,
            tax_type: quote.tax_type,
            line_items,
            subtotal: quote.subtotal,
            total_tax: quote.total_tax,
            total: quote.total,
            valid_until: quote.valid_until,
            notes: quote.notes,
            converted_invoice_id: quote.converted_invoice_id,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}

fn recompute(quote: &mut Quote, state: &AppState) {
    let totals = compute_document_totals(&quote.line_items, &state.tax_table, quote.tax_type);
    quote.apply_totals(totals);
    TOTALS_RECOMPUTED.with_label_values(&["quote"]).inc();
}

async fn fetch_quote(state: &AppState, id: &str) -> Result<Quote, AppError> {
    state
        .store
        .get_quote(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quote {} not found", id)))
}

async fn fetch_editable_quote(state: &AppState, id: &str) -> Result<Quote, AppError> {
    let quote = fetch_quote(state, id).await?;
    if !quote.is_editable() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only draft quotes can be modified"
        )));
    }
    Ok(quote)
}

pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut quote = Quote::new(payload.customer_name, payload.tax_type);
    quote.customer_id = payload.customer_id;
    quote.line_items = payload.line_items;
    quote.valid_until = payload.valid_until;
    quote.notes = payload.notes;
    recompute(&mut quote, &state);

    state.store.put_quote(&quote).await?;
    tracing::info!(quote_id = %quote.quote_id, total = quote.total, "Created quote");
    Ok((
        StatusCode::CREATED,
        Json(QuoteResponse::from_quote(quote, &state.tax_table)),
    ))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<QuoteListParams>,
) -> Result<impl IntoResponse, AppError> {
    let status = params.status.as_deref().map(QuoteStatus::from_string);
    let quotes = state.store.list_quotes(status).await?;
    let responses: Vec<QuoteResponse> = quotes
        .into_iter()
        .map(|q| QuoteResponse::from_quote(q, &state.tax_table))
        .collect();
    Ok(Json(responses))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quote = fetch_quote(&state, &id).await?;
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_editable_quote(&state, &id).await?;

    if let Some(name) = payload.customer_name {
        if name.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Customer name cannot be empty"
            )));
        }
        quote.customer_name = name;
    }
    if let Some(customer_id) = payload.customer_id {
        quote.customer_id = Some(customer_id);
    }
    if let Some(tax_type) = payload.tax_type {
        quote.tax_type = tax_type;
    }
    if let Some(valid_until) = payload.valid_until {
        quote.valid_until = Some(valid_until);
    }
    if let Some(notes) = payload.notes {
        quote.notes = Some(notes);
    }

    recompute(&mut quote, &state);
    state.store.put_quote(&quote).await?;
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quote = fetch_quote(&state, &id).await?;
    if quote.status != QuoteStatus::Draft {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only draft quotes can be deleted"
        )));
    }
    state.store.delete_quote(&id).await?;
    tracing::info!(quote_id = %id, "Deleted draft quote");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_line_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(item): Json<LineItem>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_editable_quote(&state, &id).await?;
    quote.line_items.push(item);
    recompute(&mut quote, &state);
    state.store.put_quote(&quote).await?;
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

pub async fn update_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateLineItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_editable_quote(&state, &id).await?;
    let line = quote
        .line_items
        .iter_mut()
        .find(|l| l.line_item_id == line_item_id)
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Line item {} not found", line_item_id))
        })?;

    apply_line_item_update(line, payload);
    recompute(&mut quote, &state);
    state.store.put_quote(&quote).await?;
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

pub async fn remove_line_item(
    State(state): State<AppState>,
    Path((id, line_item_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_editable_quote(&state, &id).await?;
    let before = quote.line_items.len();
    quote.line_items.retain(|l| l.line_item_id != line_item_id);
    if quote.line_items.len() == before {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Line item {} not found",
            line_item_id
        )));
    }
    recompute(&mut quote, &state);
    state.store.put_quote(&quote).await?;
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_quote(&state, &id).await?;
    let next = QuoteStatus::from_string(&payload.status);
    if !quote.can_transition_to(next) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Cannot move quote from {} to {}",
            quote.status.as_str(),
            next.as_str()
        )));
    }

    quote.status = next;
    quote.updated_at = Utc::now();
    state.store.put_quote(&quote).await?;
    tracing::info!(quote_id = %id, status = next.as_str(), "Quote status changed");
    Ok(Json(QuoteResponse::from_quote(quote, &state.tax_table)))
}

/// Convert an accepted quote into an unpaid invoice. Conversion is
/// once-only; the quote remembers the invoice it produced.
pub async fn convert_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut quote = fetch_quote(&state, &id).await?;

    if quote.status != QuoteStatus::Accepted {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Only accepted quotes can be converted"
        )));
    }
    if let Some(existing) = &quote.converted_invoice_id {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Quote already converted to invoice {}",
            existing
        )));
    }

    let invoice = quote.to_invoice();
    state.store.put_invoice(&invoice).await?;
    INVOICES_TOTAL.with_label_values(&["unpaid"]).inc();

    quote.converted_invoice_id = Some(invoice.invoice_id.clone());
    quote.updated_at = Utc::now();
    state.store.put_quote(&quote).await?;

    tracing::info!(
        quote_id = %id,
        invoice_id = %invoice.invoice_id,
        "Converted quote to invoice"
    );
    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from_invoice(
            invoice,
            state.storage.as_ref(),
            &state.tax_table,
        )),
    ))
}
