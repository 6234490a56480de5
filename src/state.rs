use std::sync::Arc;
use std::time::Duration;

use crate::auth::AccessGate;
use crate::config::AppConfig;
use crate::supabase::{
    GoTrueClient, IdentityProvider, ObjectStore, StorageClient, SupabaseStore, TableStore,
};

/// Shared router state: the access gate plus the injected collaborators.
/// Everything here is immutable after startup and cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub gate: AccessGate,
    pub store: Arc<dyn TableStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Wire the real Supabase collaborators from configuration.
    pub fn supabase(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let supabase = &config.supabase;
        Ok(Self {
            gate: AccessGate::new(&supabase.jwt_secret, config.security.jwt_leeway_secs),
            store: Arc::new(SupabaseStore::new(
                http.clone(),
                &supabase.url,
                &supabase.service_key,
            )),
            identity: Arc::new(GoTrueClient::new(
                http.clone(),
                &supabase.url,
                &supabase.service_key,
            )),
            storage: Arc::new(StorageClient::new(
                http,
                &supabase.url,
                &supabase.service_key,
                &supabase.storage_bucket,
            )),
        })
    }
}
