// Remind API wire types
//
// The vendor is loose with types: ids arrive as numbers or strings and
// telemetry values occasionally as numeric strings. Every field here is
// optional and decoded leniently, so one odd value never sinks a payload.

use serde::{Deserialize, Serialize};

/// `POST /login` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub authentication_token: Option<String>,
}

/// `GET /customer` reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
}

/// `GET /locations/{customerId}` reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationList {
    #[serde(default)]
    pub location_list_data: Option<Vec<Location>>,
}

impl LocationList {
    pub fn first(&self) -> Option<&Location> {
        self.location_list_data.as_deref()?.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub devices: Option<Vec<DeviceSummary>>,
}

impl Location {
    pub fn first_device(&self) -> Option<&DeviceSummary> {
        self.devices.as_deref()?.first()
    }
}

/// A device entry as listed under a location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub unit_size_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub resin_type_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub serial_number: Option<String>,
}

/// `GET /device/{deviceId}` reply.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub system_status_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub salt_lbs: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub max_salt: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub capacity_remaining: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub unit_size_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub resin_type_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub serial_number: Option<String>,
    /// Older firmware reports `serial` instead of `serialNumber`.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub serial: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub last_regen_date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub regen_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub as_of: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub firmware_version: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub firmware: Option<String>,
    #[serde(default)]
    pub dealer: Option<Dealer>,
}

impl DeviceStatus {
    /// Serial number under whichever key the device reported it.
    pub fn serial(&self) -> Option<&str> {
        self.serial_number.as_deref().or(self.serial.as_deref())
    }

    /// Firmware version under whichever key the device reported it.
    pub fn firmware(&self) -> Option<&str> {
        self.firmware_version.as_deref().or(self.firmware.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dealer {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub email: Option<String>,
}

/// Raw result of a device-status fetch.
///
/// Never an error: the caller branches on `status`. Transport failures
/// are reported as status `0`.
#[derive(Debug, Clone)]
pub struct DeviceStatusReply {
    pub status: u16,
    pub data: Option<DeviceStatus>,
}

impl DeviceStatusReply {
    pub fn transport_failure() -> Self {
        Self {
            status: 0,
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200 && self.data.is_some()
    }

    /// The token was refused (HTTP 400 or 401).
    pub fn is_rejected(&self) -> bool {
        matches!(self.status, 400 | 401)
    }
}

// ── Lenient decoders ─────────────────────────────────────────────────
//
// Public so the persisted identity/status documents can share them.

pub mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings pass through, numbers become their decimal form, empty
    /// strings and every other shape decode as `None`.
    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Numbers and numeric strings decode to `f64`; anything else is `None`.
    pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(parsed.filter(|v| v.is_finite()))
    }
}
