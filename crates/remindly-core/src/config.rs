// ── Runtime poller configuration ──
//
// Describes how to reach the Remind cloud and how often to poll. Carries
// credential data and tuning, but never touches a config file: the host
// builds a `PollerConfig` and hands it to `start`.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use remindly_api::TransportConfig;

/// Poll interval used when none (or a non-positive one) is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Everything `start` needs to run one device's poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Account email; with `password`, enables discovery and reauth.
    pub email: Option<String>,
    pub password: Option<SecretString>,
    /// Pre-obtained token, used when no credentials are configured.
    pub auth_token: Option<SecretString>,
    pub device_id: Option<String>,
    pub poll_interval: Duration,
    /// Allow server-side refresh requests before reading status.
    pub force_update: bool,
    /// Request a server-side refresh on scheduled ticks, not only on
    /// explicit refreshes.
    pub force_on_tick: bool,
    /// Display overrides applied to every snapshot.
    pub name: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    /// Base directory; documents live under `<storage_dir>/remindly/`.
    pub storage_dir: PathBuf,
    /// API endpoint; `None` means production.
    pub api_base: Option<Url>,
    pub transport: TransportConfig,
}

impl PollerConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            email: None,
            password: None,
            auth_token: None,
            device_id: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            force_update: true,
            force_on_tick: false,
            name: None,
            model: None,
            serial: None,
            storage_dir: storage_dir.into(),
            api_base: None,
            transport: TransportConfig::default(),
        }
    }

    /// Interval from a raw seconds value; non-positive falls back to
    /// [`DEFAULT_POLL_INTERVAL`].
    pub fn interval_from_secs(secs: i64) -> Duration {
        u64::try_from(secs)
            .ok()
            .filter(|s| *s > 0)
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs)
    }

    pub fn has_credentials(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.is_empty()) && self.password.is_some()
    }
}
