use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{IdentityPatch, SensorReadings, StatusPatch};

/// Normalized view of one successful device-status poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Name as reported by the device, if any.
    pub name: Option<String>,
    /// `name`, else the model, else a generic label.
    pub display_name: String,
    pub serial_number: String,
    pub pretty_model: String,
    pub model: Option<String>,
    pub system_status_name: String,
    /// Percent, clamped to `0..=100`.
    pub capacity_remaining: f64,
    pub salt_lbs: Option<f64>,
    pub max_salt: Option<f64>,
    /// Derived salt fill percentage, clamped to `0..=100`.
    pub salt_pct: f64,
    pub last_regen_date: Option<String>,
    pub regen_time: Option<String>,
    pub as_of: Option<String>,
    pub firmware: Option<String>,
    pub dealer_name: Option<String>,
    pub dealer_phone: Option<String>,
    pub dealer_email: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn is_normal(&self) -> bool {
        self.system_status_name == "Normal"
    }

    pub fn readings(&self) -> SensorReadings {
        SensorReadings::from(self)
    }

    /// Identity fields this snapshot can fill in. Only defined values are
    /// carried; a missing value never clears what is stored.
    pub fn identity_patch(&self) -> IdentityPatch {
        IdentityPatch {
            name: IdentityPatch::defined(self.name.clone()),
            model: IdentityPatch::defined(
                Some(self.pretty_model.clone())
                    .filter(|m| !m.is_empty())
                    .or_else(|| self.model.clone()),
            ),
            serial: IdentityPatch::defined(Some(self.serial_number.clone())),
            firmware: IdentityPatch::defined(self.firmware.clone()),
            dealer_name: IdentityPatch::defined(self.dealer_name.clone()),
            dealer_phone: IdentityPatch::defined(self.dealer_phone.clone()),
            dealer_email: IdentityPatch::defined(self.dealer_email.clone()),
            ..IdentityPatch::default()
        }
    }

    /// Status fields this snapshot can fill in; `regenTime` lands in
    /// `nextRegenTime`.
    pub fn status_patch(&self) -> StatusPatch {
        StatusPatch {
            last_regen_date: IdentityPatch::defined(self.last_regen_date.clone()),
            next_regen_time: IdentityPatch::defined(self.regen_time.clone()),
            as_of: IdentityPatch::defined(self.as_of.clone()),
        }
    }

    /// Replace the display fields with configured overrides, if any.
    pub fn with_overrides(
        mut self,
        name: Option<&str>,
        model: Option<&str>,
        serial: Option<&str>,
    ) -> Self {
        if let Some(name) = name.filter(|v| !v.is_empty()) {
            name.clone_into(&mut self.display_name);
        }
        if let Some(model) = model.filter(|v| !v.is_empty()) {
            model.clone_into(&mut self.pretty_model);
        }
        if let Some(serial) = serial.filter(|v| !v.is_empty()) {
            serial.clone_into(&mut self.serial_number);
        }
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn snapshot() -> Snapshot {
        Snapshot {
            name: Some("Basement".into()),
            display_name: "Basement".into(),
            serial_number: "SN-42".into(),
            pretty_model: "EC5-75-CV".into(),
            model: Some("EC5".into()),
            system_status_name: "Normal".into(),
            capacity_remaining: 80.0,
            salt_lbs: Some(125.0),
            max_salt: Some(250.0),
            salt_pct: 50.0,
            last_regen_date: Some("2025-01-01".into()),
            regen_time: Some("2025-01-05T02:00:00Z".into()),
            as_of: None,
            firmware: Some("2.1".into()),
            dealer_name: Some("Acme Water".into()),
            dealer_phone: None,
            dealer_email: None,
            fetched_at: Utc::now(),
        }
    }
}
