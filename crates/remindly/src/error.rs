//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use remindly_config::ConfigError;
use remindly_core::{CoreError, DiscoveryStep};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NO_IDENTITY: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Remind API: {reason}")]
    #[diagnostic(
        code(remindly::connection_failed),
        help("Check network access to remind.rainsoft.com, or api_base in your config.")
    )]
    ConnectionFailed { reason: String },

    #[error("Remind API error (HTTP {status}): {message}")]
    #[diagnostic(code(remindly::api_error))]
    Api { status: u16, message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(remindly::timeout),
        help("Increase the timeout with --timeout or `remindly config set timeout <secs>`.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(remindly::auth_failed),
        help(
            "Verify the account email and password.\n\
             Run: remindly config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No account email configured")]
    #[diagnostic(
        code(remindly::no_credentials),
        help(
            "Configure credentials with: remindly config init\n\
             Or set REMINDLY_EMAIL and REMINDLY_PASSWORD."
        )
    )]
    NoCredentials,

    // ── Identity ─────────────────────────────────────────────────────
    #[error("No device identity available")]
    #[diagnostic(
        code(remindly::no_identity),
        help(
            "Run `remindly discover`, or configure auth_token and device_id.\n\
             Detail: {detail}"
        )
    )]
    NoIdentity { detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(remindly::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(remindly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(remindly::config))]
    Config(ConfigError),

    // ── Catch-all ────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(remindly::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Api { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NoIdentity { .. } => exit_code::NO_IDENTITY,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthFailed { message } => CliError::AuthFailed { message },
            CoreError::RejectedToken { status } => CliError::AuthFailed {
                message: format!("token rejected (HTTP {status})"),
            },
            CoreError::DiscoveryIncomplete {
                step: DiscoveryStep::Login,
            } => CliError::AuthFailed {
                message: "login returned no token".into(),
            },
            e @ (CoreError::DiscoveryIncomplete { .. }
            | CoreError::NoIdentity
            | CoreError::NoToken
            | CoreError::NoDevice) => CliError::NoIdentity {
                detail: e.to_string(),
            },
            CoreError::Transport { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Upstream { status, message } => CliError::Api { status, message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoEmail => CliError::NoCredentials,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
