use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

/// Storage backend types
///
/// Defined in core because configuration selects it before any storage
/// crate code runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// How a stored object's externally resolvable address is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Deterministic public URL derived from the store location and key.
    Public,
    /// Time-limited signed GET URL.
    Presigned { expires_in: Duration },
}

impl LocatorStrategy {
    /// Parse the strategy name used in configuration (`public` / `presigned`).
    pub fn parse(name: &str, presigned_ttl: Duration) -> Result<Self, anyhow::Error> {
        match name.trim().to_lowercase().as_str() {
            "public" => Ok(LocatorStrategy::Public),
            "presigned" => Ok(LocatorStrategy::Presigned {
                expires_in: presigned_ttl,
            }),
            other => Err(anyhow::anyhow!("Invalid locator strategy: {}", other)),
        }
    }
}

impl Display for LocatorStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LocatorStrategy::Public => write!(f, "public"),
            LocatorStrategy::Presigned { expires_in } => {
                write!(f, "presigned({}s)", expires_in.as_secs())
            }
        }
    }
}
