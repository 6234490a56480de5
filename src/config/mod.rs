use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

/// Startup configuration faults. Any of these prevents the process from
/// starting; there is no per-request fallback.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

/// Connection details for the hosted backend. The JWT secret doubles as the
/// token issuer key; it is read once here and never reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub jwt_secret: String,
    pub storage_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Expiry grace period in seconds. Zero unless explicitly configured.
    pub jwt_leeway_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let url = require_var("SUPABASE_URL")?;
        // Validate the shape now; every client builds request URLs from it.
        Url::parse(&url).map_err(|e| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;

        let service_key = require_var("SUPABASE_KEY")?;
        let jwt_secret = require_var("SUPABASE_JWT_SECRET")?;

        let port = env::var("GRADIENT_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .map(|s| {
                s.parse::<u16>().map_err(|e| ConfigError::Invalid {
                    name: "GRADIENT_API_PORT",
                    reason: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(3000);

        let jwt_leeway_secs = env::var("JWT_LEEWAY_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "JWT_LEEWAY_SECS",
                    reason: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(0);

        let storage_bucket =
            env::var("SUPABASE_BUCKET").unwrap_or_else(|_| "gradient-files".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { port },
            supabase: SupabaseConfig {
                url,
                service_key,
                jwt_secret,
                storage_bucket,
            },
            security: SecurityConfig { jwt_leeway_secs },
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::MissingVar(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            name,
            reason: "value is empty".to_string(),
        });
    }
    Ok(value)
}
