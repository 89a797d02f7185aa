use secrecy::{ExposeSecret, SecretString};

use super::IdentityPatch;

/// Runtime state for one device's polling session.
///
/// Owned by the poller and passed by reference into the cloud client,
/// which returns an updated copy rather than mutating it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub auth_token: Option<SecretString>,
    pub device_id: Option<String>,
    /// Last known serial, used when a status reply omits it.
    pub serial: Option<String>,
    /// Whether a server-side refresh may be requested before reading.
    pub force_update: bool,
}

impl Session {
    /// Email and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        match (self.email.as_deref(), self.password.as_ref()) {
            (Some(email), Some(password)) if !email.is_empty() => Some((email, password)),
            _ => None,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }

    /// Compare tokens without leaking either into logs.
    pub fn same_token(&self, other: &Self) -> bool {
        match (&self.auth_token, &other.auth_token) {
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            (None, None) => true,
            _ => false,
        }
    }

    /// Identity fields this session is authoritative for.
    pub fn identity_patch(&self) -> IdentityPatch {
        IdentityPatch {
            device_id: IdentityPatch::defined(self.device_id.clone()),
            auth_token: IdentityPatch::defined(
                self.auth_token
                    .as_ref()
                    .map(|t| t.expose_secret().to_owned()),
            ),
            ..IdentityPatch::default()
        }
    }
}

/// Result of discovering an account from email/password.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    pub auth_token: SecretString,
    pub customer_id: String,
    pub location_name: Option<String>,
    pub device_id: String,
    pub device_name: Option<String>,
    pub pretty_model: String,
    /// Falls back to the device id when the vendor omits it.
    pub serial_number: String,
}

impl AccountInfo {
    /// Identity fields discovery is able to fill in.
    pub fn identity_patch(&self) -> IdentityPatch {
        let model = Some(self.pretty_model.clone()).filter(|m| !m.is_empty());
        IdentityPatch {
            device_id: Some(Some(self.device_id.clone())),
            auth_token: Some(Some(self.auth_token.expose_secret().to_owned())),
            name: IdentityPatch::defined(
                self.device_name
                    .clone()
                    .or_else(|| model.clone())
                    .or_else(|| Some("RainSoft".to_owned())),
            ),
            model: IdentityPatch::defined(model.or_else(|| Some(self.device_id.clone()))),
            serial: Some(Some(self.serial_number.clone())),
            ..IdentityPatch::default()
        }
    }
}
