use crate::traits::{Storage, StorageError, StorageResult};
use crate::{LocatorStrategy, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::path::Path;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
    locator_strategy: LocatorStrategy,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials are taken from the standard AWS environment variables.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        Self::from_builder(AmazonS3Builder::from_env(), bucket, region, endpoint_url)
    }

    fn from_builder(
        builder: AmazonS3Builder,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = builder
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url: None,
            locator_strategy: LocatorStrategy::Public,
        })
    }

    /// Serve public locators from a CDN or distribution instead of the bucket.
    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url;
        self
    }

    pub fn with_locator_strategy(mut self, strategy: LocatorStrategy) -> Self {
        self.locator_strategy = strategy;
        self
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path style on the endpoint URL.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        key: &str,
        source: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let data = tokio::fs::read(source).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to read staged file {}: {}",
                source.display(),
                e
            ))
        })?;
        let size = data.len() as u64;
        let location = ObjectPath::from(key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), opts)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(size)
    }

    async fn locator(&self, key: &str) -> StorageResult<String> {
        match self.locator_strategy {
            LocatorStrategy::Public => Ok(self.generate_url(key)),
            LocatorStrategy::Presigned { expires_in } => {
                let location = ObjectPath::from(key.to_string());
                let url_result: ObjectResult<_> = self
                    .store
                    .signed_url(Method::GET, &location, expires_in)
                    .await;

                let url = url_result
                    .map_err(|e| StorageError::LocatorFailed(e.to_string()))?
                    .to_string();

                Ok(url)
            }
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = ObjectPath::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn storage(endpoint: Option<&str>) -> S3Storage {
        let builder = AmazonS3Builder::new()
            .with_access_key_id("AKIDEXAMPLE")
            .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
        S3Storage::from_builder(
            builder,
            "tubely-videos".to_string(),
            "us-east-2".to_string(),
            endpoint.map(String::from),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_public_locator_aws() {
        let url = storage(None).locator("landscape/abc.mp4").await.unwrap();
        assert_eq!(
            url,
            "https://tubely-videos.s3.us-east-2.amazonaws.com/landscape/abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_public_locator_custom_endpoint() {
        let url = storage(Some("http://localhost:9000/"))
            .locator("portrait/abc.mp4")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:9000/tubely-videos/portrait/abc.mp4");
    }

    #[tokio::test]
    async fn test_public_locator_cdn_base() {
        let url = storage(None)
            .with_public_base_url(Some("https://cdn.tubely.dev/".to_string()))
            .locator("other/abc.mp4")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.tubely.dev/other/abc.mp4");
    }

    #[tokio::test]
    async fn test_presigned_locator_is_signed() {
        let url = storage(None)
            .with_locator_strategy(LocatorStrategy::Presigned {
                expires_in: Duration::from_secs(600),
            })
            .locator("landscape/abc.mp4")
            .await
            .unwrap();
        assert!(url.contains("landscape/abc.mp4"));
        assert!(url.contains("X-Amz-Expires=600"));
        assert!(url.contains("X-Amz-Signature="));
    }
}
