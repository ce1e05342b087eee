//! # Repository Pattern Implementation
//!
//! One repository per aggregate. Each repository owns a clone of the
//! connection pool (pool clones are cheap handle copies) and exposes
//! async methods returning `DbResult<T>`.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repository Layer                                  │
//! │                                                                         │
//! │  CustomerRepository   ── customer CRUD                                  │
//! │  ProductRepository    ── catalog CRUD + soft delete                     │
//! │  InvoiceRepository    ── invoice lifecycle: create / edit / pay /      │
//! │                          delete (the transactional heart)               │
//! │  StatsRepository      ── dashboard aggregates (read-only)               │
//! │                                                                         │
//! │  All financial math is delegated to billing-core; repositories only     │
//! │  persist the results and enforce atomicity.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod invoice;
pub mod product;
pub mod stats;

pub use customer::{CustomerRepository, CustomerUpdate, NewCustomer};
pub use invoice::{
    InvoiceDetail, InvoiceItemDetail, InvoiceRepository, InvoiceSummary, InvoiceUpdate,
    ItemReplacement, NewInvoice, NewPayment,
};
pub use product::{NewProduct, ProductRepository, ProductUpdate};
pub use stats::{DashboardStats, StatsRepository};
