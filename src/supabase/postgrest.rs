use async_trait::async_trait;
use serde_json::Value;

use super::{expect_json, TableStore, UpstreamError};

/// PostgREST relay for the hosted Postgres tables.
pub struct SupabaseStore {
    http: reqwest::Client,
    base: String,
    service_key: String,
}

impl SupabaseStore {
    /// `base` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(http: reqwest::Client, base: &str, service_key: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl TableStore for SupabaseStore {
    async fn upsert(&self, table: &str, rows: Value) -> Result<Value, UpstreamError> {
        let res = self
            .authed(self.http.post(self.table_url(table)))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&rows)
            .send()
            .await?;
        expect_json(res).await
    }

    async fn select(
        &self,
        table: &str,
        eq_filters: &[(String, String)],
    ) -> Result<Value, UpstreamError> {
        let mut query: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for (column, value) in eq_filters {
            query.push((column.clone(), format!("eq.{}", value)));
        }

        let res = self
            .authed(self.http.get(self.table_url(table)))
            .query(&query)
            .send()
            .await?;
        expect_json(res).await
    }

    async fn probe(&self) -> Result<(), UpstreamError> {
        // The PostgREST root answers any keyed request; reaching it at all is
        // the signal we want.
        let res = self
            .authed(self.http.get(format!("{}/rest/v1/", self.base)))
            .send()
            .await?;
        let status = res.status();
        if status.is_server_error() {
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }
        Ok(())
    }
}
