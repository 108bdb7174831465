use thiserror::Error;

/// Top-level error type for the `robosync-api` crate.
///
/// Covers every failure mode of the Robot webservice client:
/// authentication, transport, structured API errors, and payload decoding.
/// `robosync-core` wraps these unchanged as transport failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected by the webservice (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Robot API ───────────────────────────────────────────────────
    /// Non-success response. `code` is the Robot error code
    /// (e.g. `FIREWALL_NOT_FOUND`) when the body carried an error envelope.
    #[error("hetzner webservice response status {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the remote resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status: 404, .. } => true,
            Self::Api {
                code: Some(code), ..
            } => code.ends_with("NOT_FOUND"),
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Extract the Robot error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
