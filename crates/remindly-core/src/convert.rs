// ── API-to-domain conversions ──
//
// Bridges raw `remindly_api` reply types into the canonical `Snapshot`.
// Vendor field names are folded into stable ones and missing values get
// the same fallbacks everywhere.

use chrono::{DateTime, Utc};

use remindly_api::models::{DeviceStatus, DeviceSummary};

use crate::model::{Session, Snapshot};

/// Tank capacity assumed when the device does not report one.
pub const DEFAULT_MAX_SALT: f64 = 250.0;
pub const FALLBACK_NAME: &str = "RainSoft";
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Hyphen-join model, unit size and resin type into one label.
///
/// A leading `TYPE` on the resin segment is dropped (case-insensitive);
/// empty segments are skipped.
pub fn pretty_model(
    model: Option<&str>,
    unit_size: Option<&str>,
    resin_type: Option<&str>,
) -> String {
    let resin = resin_type.map(str::trim).map(|r| {
        if r.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("TYPE")) {
            r[4..].trim()
        } else {
            r
        }
    });

    [model.map(str::trim), unit_size.map(str::trim), resin]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Salt fill percentage in `0..=100`.
///
/// A missing salt reading yields 0. A missing capacity falls back to
/// [`DEFAULT_MAX_SALT`]; a reported capacity of 0 yields 0.
pub fn salt_pct(salt_lbs: Option<f64>, max_salt: Option<f64>) -> f64 {
    let Some(salt) = salt_lbs else {
        return 0.0;
    };
    let max = max_salt.unwrap_or(DEFAULT_MAX_SALT);
    if max.abs() < f64::EPSILON {
        return 0.0;
    }
    let pct = salt / max * 100.0;
    if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 }
}

pub(crate) fn summary_pretty_model(device: &DeviceSummary) -> String {
    pretty_model(
        device.model.as_deref(),
        device.unit_size_name.as_deref(),
        device.resin_type_name.as_deref(),
    )
}

/// Fold a device-status reply into a [`Snapshot`].
pub fn normalize(
    status: &DeviceStatus,
    session: &Session,
    device_id: &str,
    fetched_at: DateTime<Utc>,
) -> Snapshot {
    let model = status.model.clone();
    let pretty = pretty_model(
        status.model.as_deref(),
        status.unit_size_name.as_deref(),
        status.resin_type_name.as_deref(),
    );

    let serial_number = status
        .serial()
        .map(str::to_owned)
        .or_else(|| session.serial.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| device_id.to_owned());

    let display_name = status
        .name
        .clone()
        .or_else(|| model.clone())
        .unwrap_or_else(|| FALLBACK_NAME.to_owned());

    let dealer = status.dealer.clone().unwrap_or_default();

    Snapshot {
        name: status.name.clone(),
        display_name,
        serial_number,
        pretty_model: pretty,
        model,
        system_status_name: status
            .system_status_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_STATUS.to_owned()),
        capacity_remaining: status
            .capacity_remaining
            .map_or(0.0, |c| c.clamp(0.0, 100.0)),
        salt_lbs: status.salt_lbs,
        max_salt: status.max_salt,
        salt_pct: salt_pct(status.salt_lbs, status.max_salt),
        last_regen_date: status.last_regen_date.clone(),
        regen_time: status.regen_time.clone(),
        as_of: status.as_of.clone(),
        firmware: status.firmware().map(str::to_owned),
        dealer_name: dealer.name,
        dealer_phone: dealer.phone,
        dealer_email: dealer.email,
        fetched_at,
    }
}
