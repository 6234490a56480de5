use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub mod extract;

/// Caller role decoded from the token's `role` claim.
///
/// Anything that is not a recognized role (including a missing claim)
/// collapses to `Other`: still an authenticated caller, never an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
    Other,
}

impl Role {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "student" => Role::Student,
            _ => Role::Other,
        }
    }

    /// Whether this role satisfies a declared requirement.
    pub fn satisfies(self, required: RoleRequirement) -> bool {
        match required {
            RoleRequirement::Authenticated => true,
            RoleRequirement::Admin => matches!(self, Role::Admin),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Other => "other",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Tokens carry the role as a free-form string; unknown values must not fail
// decoding, so this cannot be a plain derived enum.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Role::parse(&s))
    }
}

/// Declarative admission level attached to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any caller that passed authentication.
    Authenticated,
    /// Callers whose role claim is `admin`.
    Admin,
}

impl std::fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleRequirement::Authenticated => f.write_str("authenticated"),
            RoleRequirement::Admin => f.write_str("admin"),
        }
    }
}

/// Verified, decoded token payload. Request-scoped: built at gate entry,
/// dropped at request exit, never persisted or mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
    /// Custom claims kept for downstream consumers.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Verification and admission failures. Every variant except `Forbidden`
/// surfaces as the same generic 401; the variants exist so logs can tell
/// the causes apart.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("malformed credential: {0}")]
    Malformed(String),
    #[error("credential signature invalid")]
    InvalidSignature,
    #[error("credential expired")]
    Expired,
    #[error("role '{actual}' does not satisfy '{required}' requirement")]
    Forbidden {
        required: RoleRequirement,
        actual: Role,
    },
}

/// Token verifier. Built once at startup from the issuer secret and shared
/// read-only across requests; rotating the secret requires a restart.
#[derive(Clone)]
pub struct AccessGate {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessGate {
    /// `leeway_secs` is the expiry grace period; zero means a token is
    /// rejected the second its `exp` passes.
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        // Pin the algorithm set to exactly HS256. Tokens signed with `none`
        // or anything else fail before the payload is even looked at.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw bearer credential and decode its claims.
    ///
    /// Pure verification plus one clock read; no I/O, no retries. A failure
    /// here is terminal for the request.
    pub fn authenticate(&self, credential: &str) -> Result<Claims, AuthError> {
        if credential.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        decode::<Claims>(credential, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    AuthError::Malformed("algorithm not allowed".to_string())
                }
                _ => AuthError::Malformed(e.to_string()),
            })
    }
}

/// Check a verified caller against an operation's declared requirement.
///
/// Kept separate from `authenticate` so one verification can back several
/// admission checks within a request.
pub fn authorize(claims: &Claims, required: RoleRequirement) -> Result<(), AuthError> {
    if claims.role.satisfies(required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            required,
            actual: claims.role,
        })
    }
}
