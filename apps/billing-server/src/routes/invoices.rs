//! Invoice API handlers.
//!
//! Handlers orchestrate the split of responsibilities: billing-core does
//! every financial computation, billing-db persists the result atomically,
//! and this layer only translates between the wire contract and the two.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use billing_core::{
    compute_totals, normalize_items, validation, CoreError, DiscountType, Invoice, InvoiceStatus,
    Money, Payment, PaymentMethod, RawLineItem,
};
use billing_db::{
    InvoiceDetail, InvoiceSummary, InvoiceUpdate, ItemReplacement, NewInvoice, NewPayment,
};

use crate::error::ApiResult;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body for `POST /invoices`.
///
/// Invalid line items are silently dropped; the request only fails when
/// none survive. An unrecognized `discount_type` normalizes to none.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_id: i64,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_value: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for `PUT /invoices/{id}`. All fields optional; omitted fields
/// keep their stored values.
///
/// With `items`, totals are recomputed server-side and the financial
/// override fields are ignored. Without `items`, supplied header
/// financials are stored as-is. The balance always re-derives from
/// (total, paid); status does too unless `status` is given.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RawLineItem>>,
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

/// Body for `POST /invoices/{id}/payments`.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response for a recorded payment: the ledger entry plus the invoice's
/// refreshed financial state.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub invoice: Invoice,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<InvoiceSummary>>> {
    Ok(Json(state.db.invoices().list().await?))
}

pub async fn get_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InvoiceDetail>> {
    Ok(Json(state.db.invoices().get_detail(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateInvoiceRequest>,
) -> ApiResult<Json<InvoiceDetail>> {
    validation::validate_id("customer_id", req.customer_id).map_err(CoreError::from)?;

    let lines = normalize_items(&req.items);
    let totals = compute_totals(&lines, req.discount_type, req.discount_value)?;

    let repo = state.db.invoices();
    let invoice = repo
        .create(NewInvoice {
            customer_id: req.customer_id,
            invoice_date: req.invoice_date.unwrap_or_else(|| Utc::now().date_naive()),
            due_date: req.due_date,
            notes: req.notes,
            lines,
            totals,
        })
        .await?;

    // The contract returns the full invoice with its items
    Ok(Json(repo.get_detail(invoice.id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> ApiResult<Json<InvoiceDetail>> {
    let repo = state.db.invoices();

    // The existing row supplies discount defaults for recomputation and
    // turns an unknown id into a 404 before any work happens.
    let existing = repo.get_by_id(id).await?;

    let replacement = match &req.items {
        Some(items) => {
            let lines = normalize_items(items);
            let discount_type = req.discount_type.unwrap_or(existing.discount_type);
            let discount_value = req.discount_value.unwrap_or(existing.discount_value);
            let totals = compute_totals(&lines, discount_type, discount_value)?;
            Some(ItemReplacement { lines, totals })
        }
        None => None,
    };

    let invoice = repo
        .update(
            id,
            InvoiceUpdate {
                customer_id: req.customer_id,
                invoice_date: req.invoice_date,
                due_date: req.due_date,
                notes: req.notes,
                replacement,
                subtotal: req.subtotal.map(Money::from_decimal),
                discount_type: req.discount_type,
                discount_value: req.discount_value,
                discount_amount: req.discount_amount.map(Money::from_decimal),
                total_amount: req.total_amount.map(Money::from_decimal),
                paid_amount: req.paid_amount.map(Money::from_decimal),
                status: req.status,
            },
        )
        .await?;

    Ok(Json(repo.get_detail(invoice.id).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.db.invoices().delete(id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Payment>>> {
    // 404 for an unknown invoice rather than an empty ledger
    state.db.invoices().get_by_id(id).await?;
    Ok(Json(state.db.invoices().payments_for(id).await?))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    validation::validate_payment_amount(req.amount).map_err(CoreError::from)?;

    let (payment, invoice) = state
        .db
        .invoices()
        .record_payment(
            id,
            NewPayment {
                amount: Money::from_decimal(req.amount),
                payment_date: req.payment_date.unwrap_or_else(|| Utc::now().date_naive()),
                payment_method: req.payment_method,
                reference_number: req.reference_number,
                notes: req.notes,
            },
        )
        .await?;

    Ok(Json(PaymentResponse { payment, invoice }))
}
