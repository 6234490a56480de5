use async_trait::async_trait;

use super::{ObjectStore, UpstreamError};

/// Storage relay for a single bucket.
pub struct StorageClient {
    http: reqwest::Client,
    base: String,
    service_key: String,
    bucket: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, base: &str, service_key: &str, bucket: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn upload(
        &self,
        name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, UpstreamError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base, self.bucket, name);

        let mut req = self
            .http
            .post(&url)
            .bearer_auth(&self.service_key)
            // Re-uploads replace the object, matching upsert semantics on the
            // table routes.
            .header("x-upsert", "true")
            .body(bytes);
        if let Some(ct) = content_type {
            req = req.header(reqwest::header::CONTENT_TYPE, ct);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        Ok(self.public_url(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base, self.bucket, name
        )
    }
}
