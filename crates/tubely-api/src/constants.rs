//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Headroom for multipart boundaries and part headers on top of the video
/// ceiling when limiting the raw request body.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
