//! Library surface of the billing server.
//!
//! The binary in `main.rs` and the API integration tests both build the
//! application through [`routes::router`].

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod views;
