//! Remote key generation.
//!
//! Key format: `{namespace}/{name}.mp4`, where the namespace is the aspect
//! class of the video and the name is unguessable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tubely_core::constants::{REMOTE_KEY_RANDOM_BYTES, VIDEO_EXTENSION};
use tubely_core::models::AspectClass;

/// A namespaced object key for remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteKey {
    namespace: AspectClass,
    name: String,
}

impl RemoteKey {
    /// Generate a fresh key in the namespace of `class`.
    ///
    /// The name is 32 bytes from the thread-local CSPRNG encoded as URL-safe
    /// base64 without padding, so it never contains `/`, `+` or `=`.
    pub fn generate(class: AspectClass) -> Self {
        let mut raw = [0u8; REMOTE_KEY_RANDOM_BYTES];
        rand::rng().fill_bytes(&mut raw);
        Self {
            namespace: class,
            name: format!("{}.{}", URL_SAFE_NO_PAD.encode(raw), VIDEO_EXTENSION),
        }
    }

    pub fn namespace(&self) -> AspectClass {
        self.namespace
    }

    /// File name part of the key, without the namespace.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for RemoteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.namespace.namespace(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_layout() {
        let key = RemoteKey::generate(AspectClass::Portrait);
        let rendered = key.to_string();
        assert!(rendered.starts_with("portrait/"));
        assert!(rendered.ends_with(".mp4"));
        assert_eq!(rendered.matches('/').count(), 1);

        let stem = key.name().trim_end_matches(".mp4");
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(stem.len(), 43);
        assert!(stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<String> = (0..256)
            .map(|_| RemoteKey::generate(AspectClass::Other).to_string())
            .collect();
        assert_eq!(keys.len(), 256);
    }

    #[test]
    fn test_namespace_follows_class() {
        assert_eq!(
            RemoteKey::generate(AspectClass::Landscape).namespace(),
            AspectClass::Landscape
        );
        assert!(RemoteKey::generate(AspectClass::Other)
            .to_string()
            .starts_with("other/"));
    }
}
