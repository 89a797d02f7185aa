use serde::{Deserialize, Serialize};

use remindly_api::models::de;

use super::{apply_field, present};

/// Durable record of regeneration timing, distinct from the live snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub last_regen_date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub next_regen_time: Option<String>,
    /// Vendor timestamp of the snapshot that produced these values.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub as_of: Option<String>,
}

impl Status {
    pub fn apply(&mut self, patch: &StatusPatch) {
        apply_field(&mut self.last_regen_date, patch.last_regen_date.as_ref());
        apply_field(&mut self.next_regen_time, patch.next_regen_time.as_ref());
        apply_field(&mut self.as_of, patch.as_of.as_ref());
    }
}

/// Partial update for [`Status`]; same three-state fields as
/// [`IdentityPatch`](super::IdentityPatch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub last_regen_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub next_regen_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub as_of: Option<Option<String>>,
}

impl StatusPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
