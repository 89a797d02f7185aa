// ── Cloud client ──
//
// Account discovery and the snapshot pipeline on top of `RemindClient`.
// Nothing here returns an error across the poll boundary: a failed fetch
// is a `FetchOutcome::Stale` or `FetchOutcome::Fatal`, and the session the
// caller should keep is always handed back.

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use remindly_api::{DeviceStatusReply, RemindClient};

use crate::config::PollerConfig;
use crate::convert::{normalize, summary_pretty_model};
use crate::error::{CoreError, DiscoveryStep};
use crate::model::{AccountInfo, Session, Snapshot};

/// Per-fetch knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Ask the vendor to refresh telemetry first. Honored only when the
    /// session also allows it.
    pub force: bool,
}

/// How one fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// A new snapshot.
    Fresh(Snapshot),
    /// Nothing new this time; the last snapshot stays current.
    Stale(CoreError),
    /// Polling cannot work with this configuration.
    Fatal(CoreError),
}

impl FetchOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Outcome plus the session to adopt (possibly with a new token).
#[derive(Debug)]
pub struct FetchResult {
    pub outcome: FetchOutcome,
    pub session: Session,
}

/// Domain-level client for the Remind cloud.
#[derive(Debug, Clone)]
pub struct CloudClient {
    api: RemindClient,
}

impl CloudClient {
    pub fn new(api: RemindClient) -> Self {
        Self { api }
    }

    /// Client for `config.api_base`, or production when unset.
    pub fn from_config(config: &PollerConfig) -> Result<Self, CoreError> {
        let api = match config.api_base.clone() {
            Some(base) => RemindClient::new(base, &config.transport)?,
            None => RemindClient::production(&config.transport)?,
        };
        Ok(Self::new(api))
    }

    /// Obtain a token, logging and swallowing any failure.
    pub async fn login(&self, email: &str, password: &SecretString) -> Option<SecretString> {
        match self.api.login(email, password).await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "login failed");
                None
            }
        }
    }

    /// Resolve token, customer, location and device from credentials.
    ///
    /// Takes the first location and its first device.
    pub async fn discover_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AccountInfo, CoreError> {
        let Some(token) = self.login(email, password).await else {
            warn!("discovery stopped: login returned no token");
            return Err(incomplete(DiscoveryStep::Login));
        };

        let customer = match self.api.customer(&token).await {
            Ok(customer) => customer,
            Err(e) => {
                warn!(error = %e, "discovery stopped: /customer failed");
                return Err(incomplete(DiscoveryStep::Customer));
            }
        };
        let Some(customer_id) = customer.id else {
            warn!("discovery stopped: /customer returned no id");
            return Err(incomplete(DiscoveryStep::Customer));
        };

        let locations = match self.api.locations(&token, &customer_id).await {
            Ok(locations) => locations,
            Err(e) => {
                warn!(error = %e, customer_id, "discovery stopped: /locations failed");
                return Err(incomplete(DiscoveryStep::Locations));
            }
        };
        let Some(location) = locations.first() else {
            warn!(customer_id, "discovery stopped: no locations on account");
            return Err(incomplete(DiscoveryStep::LocationList));
        };
        let Some((device, device_id)) = location
            .first_device()
            .and_then(|d| d.id.clone().map(|id| (d, id)))
        else {
            warn!(customer_id, "discovery stopped: first location has no device");
            return Err(incomplete(DiscoveryStep::DeviceList));
        };

        let account = AccountInfo {
            auth_token: token,
            customer_id,
            location_name: location.name.clone(),
            device_name: device.name.clone(),
            pretty_model: summary_pretty_model(device),
            serial_number: device
                .serial_number
                .clone()
                .unwrap_or_else(|| device_id.clone()),
            device_id,
        };
        info!(
            device_id = %account.device_id,
            serial = %account.serial_number,
            model = %account.pretty_model,
            "discovered device"
        );
        Ok(account)
    }

    /// Request a server-side telemetry refresh. Best effort.
    pub async fn force_update(&self, token: &SecretString) -> bool {
        match self.api.force_update(token).await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "force update not accepted");
                false
            }
        }
    }

    pub async fn device_status(&self, token: &SecretString, device_id: &str) -> DeviceStatusReply {
        self.api.device_status(token, device_id).await
    }

    /// Run the full snapshot pipeline once.
    ///
    /// Logs in when there is no token, reads device status, and on a
    /// rejected token re-logs in and retries exactly once. The returned
    /// session carries any new token; if a re-login fails the previous
    /// token is kept.
    pub async fn fetch_snapshot(&self, session: &Session, options: FetchOptions) -> FetchResult {
        let mut session = session.clone();

        let mut login_attempted = false;
        if session.auth_token.is_none() {
            let token = match session.credentials() {
                Some((email, password)) => {
                    login_attempted = true;
                    self.login(email, password).await
                }
                None => None,
            };
            if token.is_some() {
                info!("obtained auth token");
                session.auth_token = token;
            }
        }

        let Some(token) = session.auth_token.clone() else {
            let outcome = if login_attempted {
                FetchOutcome::Stale(CoreError::AuthFailed {
                    message: "login returned no token".into(),
                })
            } else {
                FetchOutcome::Fatal(CoreError::NoToken)
            };
            return FetchResult { outcome, session };
        };

        let Some(device_id) = session.device_id.clone().filter(|id| !id.is_empty()) else {
            return FetchResult {
                outcome: FetchOutcome::Fatal(CoreError::NoDevice),
                session,
            };
        };

        if options.force && session.force_update {
            self.force_update(&token).await;
        }

        let mut reply = self.device_status(&token, &device_id).await;

        if reply.is_rejected() {
            let fresh = match session.credentials() {
                Some((email, password)) => {
                    warn!(status = reply.status, "auth token rejected, logging in again");
                    self.login(email, password).await
                }
                None => None,
            };
            if let Some(fresh) = fresh {
                reply = self.device_status(&fresh, &device_id).await;
                session.auth_token = Some(fresh);
            }
        }

        let outcome = match reply {
            DeviceStatusReply {
                status: 200,
                data: Some(data),
            } => {
                let snapshot = normalize(&data, &session, &device_id, Utc::now());
                session.serial = Some(snapshot.serial_number.clone());
                FetchOutcome::Fresh(snapshot)
            }
            DeviceStatusReply { status, .. } => FetchOutcome::Stale(CoreError::from_status(status)),
        };

        FetchResult { outcome, session }
    }
}

fn incomplete(step: DiscoveryStep) -> CoreError {
    CoreError::DiscoveryIncomplete { step }
}
