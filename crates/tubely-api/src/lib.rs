//! Tubely API
//!
//! HTTP surface for video ingestion. Exposes the router and setup helpers so
//! integration tests can drive the same stack as the binary.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
