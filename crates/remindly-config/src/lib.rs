//! Configuration for remindly.
//!
//! One flat TOML file plus `REMINDLY_*` environment overrides, credential
//! resolution (env + keyring + plaintext), and translation to
//! `remindly_core::PollerConfig`. Core never reads config files; hosts go
//! through this crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use remindly_api::{TlsMode, TransportConfig};
use remindly_core::PollerConfig;

/// Keyring service name; the account is the configured email.
pub const KEYRING_SERVICE: &str = "remindly";
pub const ENV_PREFIX: &str = "REMINDLY_";
pub const PASSWORD_ENV: &str = "REMINDLY_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no email configured")]
    NoEmail,

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Account email. With a password, enables discovery and reauth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Plaintext password (prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Seconds between polls; non-positive means the default.
    #[serde(default = "default_poll_seconds")]
    pub poll_seconds: i64,

    /// Allow server-side refresh requests.
    #[serde(default = "default_true")]
    pub force_update: bool,

    /// Also request a server-side refresh on scheduled ticks.
    #[serde(default)]
    pub force_on_tick: bool,

    /// Display overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    /// Base directory for the identity/status documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Remind API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Path to an extra CA certificate (intercepting proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// CLI presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            password_env: None,
            device_id: None,
            auth_token: None,
            poll_seconds: default_poll_seconds(),
            force_update: true,
            force_on_tick: false,
            name: None,
            model: None,
            serial: None,
            storage_dir: None,
            api_base: None,
            ca_cert: None,
            timeout: default_timeout(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_poll_seconds() -> i64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "remindly", "remindly").map_or_else(
        || {
            let mut p = home_fallback();
            p.push(".config");
            p.push("remindly");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Base directory for persisted documents when none is configured. The
/// store adds its own `remindly/` subdirectory.
pub fn default_storage_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || {
            let mut p = home_fallback();
            p.push(".local");
            p.push("share");
            p
        },
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn home_fallback() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load from a specific file + environment. A missing file is not an
/// error; defaults fill in.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    // The password variable is a credential-chain step, not a plaintext
    // override, and REMINDLY_CONFIG names the file itself.
    let env = Env::prefixed(ENV_PREFIX).ignore(&["password", "config", "defaults"]);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(env);

    Ok(figment.extract()?)
}

// ── Saving ──────────────────────────────────────────────────────────

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account password: `password_env` variable, then
/// `REMINDLY_PASSWORD`, then the system keyring, then plaintext.
pub fn resolve_password(cfg: &Config) -> Option<SecretString> {
    resolve_password_with(cfg, |name| std::env::var(name).ok(), keyring_password)
}

/// [`resolve_password`] with injectable lookups.
pub fn resolve_password_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    // 1. Configured env var
    if let Some(pw) = cfg.password_env.as_deref().and_then(&env) {
        return Some(SecretString::from(pw));
    }

    // 2. Well-known env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Some(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = cfg.email.as_deref().and_then(keyring) {
        return Some(SecretString::from(pw));
    }

    // 4. Plaintext in config
    cfg.password.clone().map(SecretString::from)
}

fn keyring_password(email: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, email)
        .ok()?
        .get_password()
        .ok()
}

/// Store a password in the system keyring under the given email.
pub fn store_password(email: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, email)
        .map_err(|e| ConfigError::Keyring(e.to_string()))?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(default_storage_dir)
    }

    pub fn poll_interval(&self) -> Duration {
        PollerConfig::interval_from_secs(self.poll_seconds)
    }

    /// HTTP transport settings from `timeout` and `ca_cert`.
    pub fn transport(&self) -> TransportConfig {
        let tls = self
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            ..TransportConfig::default()
        }
        .with_timeout(Duration::from_secs(self.timeout))
    }

    pub fn api_base_url(&self) -> Result<Option<url::Url>, ConfigError> {
        self.api_base
            .as_deref()
            .map(|raw| {
                url::Url::parse(raw).map_err(|_| ConfigError::Validation {
                    field: "api_base".into(),
                    reason: format!("invalid URL: {raw}"),
                })
            })
            .transpose()
    }

    /// Build a `PollerConfig`, resolving the password through the
    /// credential chain.
    pub fn to_poller_config(&self) -> Result<PollerConfig, ConfigError> {
        self.to_poller_config_with(resolve_password(self))
    }

    /// Build a `PollerConfig` with an already-resolved password.
    pub fn to_poller_config_with(
        &self,
        password: Option<SecretString>,
    ) -> Result<PollerConfig, ConfigError> {
        let mut poller = PollerConfig::new(self.storage_dir());
        poller.email = non_empty(self.email.as_ref());
        poller.password = password;
        poller.auth_token = non_empty(self.auth_token.as_ref()).map(SecretString::from);
        poller.device_id = non_empty(self.device_id.as_ref());
        poller.poll_interval = self.poll_interval();
        poller.force_update = self.force_update;
        poller.force_on_tick = self.force_on_tick;
        poller.name = non_empty(self.name.as_ref());
        poller.model = non_empty(self.model.as_ref());
        poller.serial = non_empty(self.serial.as_ref());
        poller.api_base = self.api_base_url()?;
        poller.transport = self.transport();
        Ok(poller)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}
