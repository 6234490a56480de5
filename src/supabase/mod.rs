//! Clients for the hosted Supabase collaborators: PostgREST tables, GoTrue
//! identity, and object storage. Each client is constructed once at startup
//! and injected through router state behind a trait, so handlers never build
//! their own and tests can substitute doubles.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod gotrue;
mod postgrest;
mod storage;

pub use gotrue::GoTrueClient;
pub use postgrest::SupabaseStore;
pub use storage::StorageClient;

/// Failure talking to any Supabase service. Opaque to callers; routes map it
/// to 502/503, never to 401/403.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Identity-provider failures. Invalid credentials are the caller's problem
/// (401); everything else is upstream trouble.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("registration rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Row relay against the hosted table store.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Upsert one row (or an array of rows) into `table`, returning the
    /// stored representation.
    async fn upsert(&self, table: &str, rows: Value) -> Result<Value, UpstreamError>;

    /// Select all rows from `table`, narrowed by equality filters.
    async fn select(
        &self,
        table: &str,
        eq_filters: &[(String, String)],
    ) -> Result<Value, UpstreamError>;

    /// Cheap reachability check for /health.
    async fn probe(&self) -> Result<(), UpstreamError>;
}

/// Credential-minting relay. These calls are exempt from the access gate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email/password for a session (token + user).
    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError>;

    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Value, IdentityError>;
}

/// Object storage relay. Uploads return a retrievable URL; downloads are
/// served by the storage host itself, so only the URL is produced here.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, UpstreamError>;

    fn public_url(&self, name: &str) -> String;
}

/// Decode a JSON response, folding non-success statuses into `UpstreamError`.
pub(crate) async fn expect_json(res: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }
    Ok(res.json().await?)
}
