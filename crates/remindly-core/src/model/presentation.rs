use serde::Serialize;
use strum::Display;

use super::Snapshot;

/// Salt fill percentage below which the low-salt flag is raised.
pub const LOW_SALT_THRESHOLD: f64 = 20.0;

/// Coarse system state a host maps to its contact/alert sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusState {
    Normal,
    Alert,
}

/// The handful of values a host exposes as sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    /// Salt percentage rounded for display.
    pub salt_level: f64,
    pub low_salt: bool,
    pub alert: bool,
    pub capacity_remaining: f64,
}

impl SensorReadings {
    pub fn state(&self) -> StatusState {
        if self.alert {
            StatusState::Alert
        } else {
            StatusState::Normal
        }
    }
}

impl From<&Snapshot> for SensorReadings {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            salt_level: snapshot.salt_pct.round(),
            low_salt: snapshot.salt_pct < LOW_SALT_THRESHOLD,
            alert: !snapshot.is_normal(),
            capacity_remaining: snapshot.capacity_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::snapshot::fixtures::snapshot;

    #[test]
    fn low_salt_boundary() {
        let mut snap = snapshot();
        snap.salt_pct = 19.9;
        assert!(snap.readings().low_salt);
        snap.salt_pct = 20.0;
        assert!(!snap.readings().low_salt);
    }

    #[test]
    fn alert_tracks_status_name() {
        let mut snap = snapshot();
        assert_eq!(snap.readings().state(), StatusState::Normal);
        snap.system_status_name = "Service Required".into();
        let readings = snap.readings();
        assert!(readings.alert);
        assert_eq!(readings.state().to_string(), "alert");
    }

    #[test]
    fn salt_level_is_rounded() {
        let mut snap = snapshot();
        snap.salt_pct = 89.6;
        assert!((snap.readings().salt_level - 90.0).abs() < f64::EPSILON);
    }
}
