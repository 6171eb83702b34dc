//! Shared constants.

/// Content type every optimized artifact is stored with.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Extension appended to every remote video key.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Multipart field carrying the video body.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Number of random bytes behind each remote key.
pub const REMOTE_KEY_RANDOM_BYTES: usize = 32;

/// Prefix of staged upload files in the transient store.
pub const STAGING_FILE_PREFIX: &str = "tubely-upload-";

/// Issuer expected on bearer tokens.
pub const DEFAULT_JWT_ISSUER: &str = "tubely-access";
