//! # billing-db: Database Layer for the Billing Service
//!
//! SQLite persistence for customers, products, invoices, and payments.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         billing-db                                      │
//! │                                                                         │
//! │  ┌──────────────┐    ┌──────────────────────────────────────────────┐  │
//! │  │   Database   │───▶│              Repositories                    │  │
//! │  │  (SqlitePool)│    │  customers() products() invoices() stats()   │  │
//! │  └──────┬───────┘    └──────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │  ┌──────▼───────┐    Transactional guarantees:                          │
//! │  │  migrations  │    • invoice numbering: atomic counter + unique       │
//! │  │  (embedded)  │      constraint + bounded retry                       │
//! │  └──────────────┘    • payments: increment-first, single transaction    │
//! │                      • item edits: delete-all / insert-all              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All financial computation lives in billing-core; this crate persists
//! its results and enforces atomicity at the SQLite layer.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    CustomerRepository, CustomerUpdate, DashboardStats, InvoiceDetail, InvoiceItemDetail,
    InvoiceRepository, InvoiceSummary, InvoiceUpdate, ItemReplacement, NewCustomer, NewInvoice,
    NewPayment, NewProduct, ProductRepository, ProductUpdate, StatsRepository,
};
