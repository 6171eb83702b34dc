//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Tubely component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ToleranceMode};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{LocatorStrategy, StorageBackend};
