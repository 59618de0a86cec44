//! Domain layer for TaxFlow.
//!
//! Holds the workflow session, the extraction and review models, tax
//! results, the backend port and configuration. Nothing here performs
//! network IO.

pub mod backend;
pub mod config;
pub mod error;
pub mod extraction;
pub mod review;
pub mod session;
pub mod tax;

// Re-export common error type
pub use error::{BackendCall, BackendError, TaxflowError};
