use async_trait::async_trait;
use serde_json::{json, Value};

use super::{expect_json, IdentityError, IdentityProvider, UpstreamError};

/// GoTrue relay. Password handling stays entirely on the provider side; this
/// client only forwards credentials and relays the session.
pub struct GoTrueClient {
    http: reqwest::Client,
    base: String,
    service_key: String,
}

impl GoTrueClient {
    pub fn new(http: reqwest::Client, base: &str, service_key: &str) -> Self {
        Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Value, IdentityError> {
        let res = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=password", self.base))
            .header("apikey", &self.service_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(UpstreamError::from)?;

        // GoTrue answers rejected logins in the 4xx range; anything there is
        // the caller's credentials, not an upstream fault.
        if res.status().is_client_error() {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(expect_json(res).await?)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Value, IdentityError> {
        let res = self
            .http
            .post(format!("{}/auth/v1/signup", self.base))
            .header("apikey", &self.service_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(UpstreamError::from)?;

        // A 4xx at signup means the provider rejected the registration
        // (duplicate email, weak password); not an upstream fault.
        if res.status().is_client_error() {
            let body = res.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(body));
        }
        Ok(expect_json(res).await?)
    }
}
