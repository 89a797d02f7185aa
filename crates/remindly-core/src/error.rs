// ── Core error types ──
//
// Domain errors from remindly-core. The snapshot pipeline never returns
// these as `Err` across the poll boundary; they ride inside
// `FetchOutcome::Stale` / `FetchOutcome::Fatal` so callers can tell a
// skipped tick from a dead configuration.

use strum::Display;
use thiserror::Error;

/// Which step of account discovery came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DiscoveryStep {
    /// `POST /login` yielded no token.
    Login,
    /// `GET /customer` failed or had no id.
    Customer,
    /// `GET /locations/{id}` failed.
    Locations,
    /// The location list was empty.
    LocationList,
    /// The first location had no usable device.
    DeviceList,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthFailed { message: String },

    #[error("Auth token rejected by the Remind API (HTTP {status})")]
    RejectedToken { status: u16 },

    // ── Discovery / identity ─────────────────────────────────────────
    #[error("Account discovery incomplete at step '{step}'")]
    DiscoveryIncomplete { step: DiscoveryStep },

    #[error("No stored identity: run discovery or configure auth_token and device_id")]
    NoIdentity,

    #[error("No auth token and no credentials to obtain one")]
    NoToken,

    #[error("No device id to poll")]
    NoDevice,

    // ── Transport / upstream ─────────────────────────────────────────
    #[error("Cannot reach the Remind API: {reason}")]
    Transport { reason: String },

    #[error("Remind API request timed out")]
    Timeout,

    #[error("Remind API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Classify a raw device-status HTTP status into the error it implies.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Self::Transport {
                reason: "no response from server".into(),
            },
            400 | 401 => Self::RejectedToken { status },
            200 => Self::Upstream {
                status,
                message: "empty or unreadable body".into(),
            },
            _ => Self::Upstream {
                status,
                message: "unexpected status".into(),
            },
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<remindly_api::Error> for CoreError {
    fn from(err: remindly_api::Error) -> Self {
        match err {
            remindly_api::Error::Authentication { message } => CoreError::AuthFailed { message },
            remindly_api::Error::RejectedToken { status } => CoreError::RejectedToken { status },
            remindly_api::Error::Transport(e) if e.is_timeout() => CoreError::Timeout,
            remindly_api::Error::Transport(e) => CoreError::Transport {
                reason: e.to_string(),
            },
            remindly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            remindly_api::Error::Tls(msg) => CoreError::Transport {
                reason: format!("TLS error: {msg}"),
            },
            remindly_api::Error::Api { status, message } => CoreError::Upstream { status, message },
            remindly_api::Error::Deserialization { message, body: _ } => CoreError::Upstream {
                status: 200,
                message: format!("Deserialization error: {message}"),
            },
        }
    }
}
