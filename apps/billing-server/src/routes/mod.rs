//! # HTTP Routes
//!
//! Route table for the JSON API and the server-rendered views.
//!
//! The API is mounted twice: at the root and under `/api`. Both prefixes
//! serve the same handlers, so API clients and the HTML views can share
//! one contract.
//!
//! ```text
//! GET  /                           dashboard (HTML)
//! GET  /print/invoice/{id}         printable invoice (HTML)
//!
//! GET|POST        /customers       list / create
//! GET|PUT|DELETE  /customers/{id}  fetch / replace / delete
//! GET|POST        /products        list (active) / create
//! GET|PUT|DELETE  /products/{id}   fetch / replace / deactivate
//! GET|POST        /invoices        list / create
//! GET|PUT|DELETE  /invoices/{id}   detail / edit / delete
//! GET|POST        /invoices/{id}/payments   ledger / record
//! GET  /dashboard/stats            dashboard aggregates (JSON)
//! GET  /health                     liveness probe
//! ```

pub mod customers;
pub mod dashboard;
pub mod invoices;
pub mod products;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::views;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/customers/{id}",
            get(customers::get_by_id)
                .put(customers::update)
                .delete(customers::remove),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/invoices", get(invoices::list).post(invoices::create))
        .route(
            "/invoices/{id}",
            get(invoices::get_detail)
                .put(invoices::update)
                .delete(invoices::remove),
        )
        .route(
            "/invoices/{id}/payments",
            get(invoices::list_payments).post(invoices::record_payment),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/health", get(dashboard::health));

    Router::new()
        .route("/", get(views::dashboard))
        .route("/print/invoice/{id}", get(views::print_invoice))
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
