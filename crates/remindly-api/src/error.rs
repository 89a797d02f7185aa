use thiserror::Error;

/// Top-level error type for the `remindly-api` crate.
///
/// Covers every failure mode of the Remind cloud API: authentication,
/// transport, HTTP status and payload decoding. `remindly-core` maps these
/// into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login did not yield a token (bad credentials, malformed reply).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The auth token was rejected on an authenticated call (HTTP 400/401).
    #[error("Auth token rejected (HTTP {status})")]
    RejectedToken { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// Any other non-200 reply from the vendor.
    #[error("Remind API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
