//! Remote interaction layer for TaxFlow.
//!
//! Provides the HTTP implementation of [`taxflow_core::backend::TaxBackend`].

pub mod http_backend;

pub use http_backend::{HealthStatus, HttpTaxBackend};
