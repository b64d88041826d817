//! Access Gate - shared-secret guard for the registry endpoints
//!
//! Requests under the gate prefix must carry the configured token in the
//! `x-registry-token` header. With no token configured the gate is open and
//! every request passes. Paths outside the prefix are never intercepted.
//!
//! The gate keeps only a SHA-256 digest of the expected token; comparison
//! happens digest to digest, and neither the secret nor the presented value
//! is ever logged.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

/// Request header carrying the token
pub const TOKEN_HEADER: &str = "x-registry-token";

/// Environment variable holding the expected token
pub const TOKEN_ENV: &str = "REGISTRY_TOKEN";

/// Path prefix guarded by default
pub const DEFAULT_GATE_PREFIX: &str = "/r";

/// Message returned with every 401
pub const UNAUTHORIZED_MESSAGE: &str = "Valid x-registry-token header required.";

/// Gate configuration, injected at construction
#[derive(Clone)]
pub struct GateConfig {
    /// Expected token; `None` or empty means open
    pub expected_token: Option<String>,
    /// Guarded path prefix
    pub prefix: String,
}

impl GateConfig {
    pub fn new(expected_token: Option<String>) -> Self {
        Self {
            expected_token,
            prefix: DEFAULT_GATE_PREFIX.to_string(),
        }
    }

    /// An open gate
    pub fn open() -> Self {
        Self::new(None)
    }

    /// Read the expected token from `REGISTRY_TOKEN`
    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok())
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::open()
    }
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field(
                "expected_token",
                &self.expected_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Outcome of checking one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Path is outside the gate
    Bypass,
    /// Path is gated and the request may proceed
    Allow,
    /// Path is gated and the token is missing or wrong
    Reject,
}

/// Body of a 401 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnauthorizedBody {
    pub error: &'static str,
    pub message: &'static str,
}

impl Default for UnauthorizedBody {
    fn default() -> Self {
        Self {
            error: "Unauthorized",
            message: UNAUTHORIZED_MESSAGE,
        }
    }
}

/// The gate itself; stateless after construction
#[derive(Clone)]
pub struct AccessGate {
    prefix: String,
    expected: Option<[u8; 32]>,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        let expected = config
            .expected_token
            .filter(|t| !t.is_empty())
            .map(|t| digest(t.as_bytes()));

        Self {
            prefix: config.prefix,
            expected,
        }
    }

    /// Whether requests pass without a token
    pub fn is_open(&self) -> bool {
        self.expected.is_none()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a path falls under the gate: the prefix itself or anything
    /// below it, never a sibling such as `/registry`
    pub fn guards(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Decide a request from its path and raw header value
    pub fn check(&self, path: &str, presented: Option<&[u8]>) -> GateDecision {
        if !self.guards(path) {
            return GateDecision::Bypass;
        }

        let Some(expected) = &self.expected else {
            return GateDecision::Allow;
        };

        match presented {
            Some(value) if digest(value) == *expected => GateDecision::Allow,
            _ => GateDecision::Reject,
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("prefix", &self.prefix)
            .field("open", &self.is_open())
            .finish()
    }
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// The 401 response
pub fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(UnauthorizedBody::default())).into_response()
}

/// axum middleware applying the gate
///
/// Install with `axum::middleware::from_fn_with_state(gate, require_token)`.
pub async fn require_token(
    State(gate): State<Arc<AccessGate>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request.headers().get(TOKEN_HEADER).map(|v| v.as_bytes());

    match gate.check(request.uri().path(), presented) {
        GateDecision::Bypass | GateDecision::Allow => next.run(request).await,
        GateDecision::Reject => {
            warn!(
                path = %request.uri().path(),
                header_present = request.headers().contains_key(TOKEN_HEADER),
                "Rejected registry request without a valid token"
            );
            unauthorized()
        }
    }
}
