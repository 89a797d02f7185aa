use serde::{Deserialize, Serialize};

use remindly_api::models::de;

use super::{apply_field, present};

/// Durable descriptive metadata about the device, its dealer, and the
/// credentials last used to reach it.
///
/// Every field is always present in the persisted document (value or
/// `null`). Unknown keys are dropped on load, so saving writes exactly
/// this schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub device_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub auth_token: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub firmware: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub dealer_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub dealer_phone: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub dealer_email: Option<String>,
}

impl Identity {
    /// Whether anything identifying the device is known.
    pub fn has_identity(&self) -> bool {
        self.device_id.is_some() || self.model.is_some() || self.serial.is_some()
    }

    /// Whether this record alone is enough to start polling.
    pub fn can_poll(&self) -> bool {
        self.auth_token.is_some() && self.device_id.is_some()
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &IdentityPatch) {
        apply_field(&mut self.device_id, patch.device_id.as_ref());
        apply_field(&mut self.auth_token, patch.auth_token.as_ref());
        apply_field(&mut self.name, patch.name.as_ref());
        apply_field(&mut self.model, patch.model.as_ref());
        apply_field(&mut self.serial, patch.serial.as_ref());
        apply_field(&mut self.firmware, patch.firmware.as_ref());
        apply_field(&mut self.dealer_name, patch.dealer_name.as_ref());
        apply_field(&mut self.dealer_phone, patch.dealer_phone.as_ref());
        apply_field(&mut self.dealer_email, patch.dealer_email.as_ref());
    }

    /// Copy with the auth token masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            auth_token: self.auth_token.as_ref().map(|_| "****".to_owned()),
            ..self.clone()
        }
    }

    /// True when any of the fields a host shows as device information
    /// differ between `self` and `other`.
    pub fn descriptive_fields_differ(&self, other: &Self) -> bool {
        self.model != other.model
            || self.serial != other.serial
            || self.firmware != other.firmware
            || self.dealer_name != other.dealer_name
            || self.dealer_phone != other.dealer_phone
            || self.dealer_email != other.dealer_email
    }
}

/// Partial update for [`Identity`].
///
/// Per field: `None` leaves the stored value alone, `Some(None)` clears it
/// and `Some(Some(v))` sets it. From JSON, a missing key is `None` and an
/// explicit `null` is `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub serial: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub firmware: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dealer_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dealer_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dealer_email: Option<Option<String>>,
}

impl IdentityPatch {
    /// Turn an optional new value into a patch field that only ever sets:
    /// an absent value leaves the stored one untouched.
    pub fn defined(value: Option<String>) -> Option<Option<String>> {
        value.filter(|v| !v.is_empty()).map(Some)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
