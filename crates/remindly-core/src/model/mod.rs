// ── Domain model ──
//
// Canonical types shared by the store, the cloud client and the poller.
// Persisted records (`Identity`, `Status`) use a closed camelCase schema;
// `Snapshot` is ephemeral and produced once per successful poll.

pub mod identity;
pub mod presentation;
pub mod session;
pub mod snapshot;
pub mod status;

pub use identity::{Identity, IdentityPatch};
pub use presentation::{LOW_SALT_THRESHOLD, SensorReadings, StatusState};
pub use session::{AccountInfo, Session};
pub use snapshot::Snapshot;
pub use status::{Status, StatusPatch};

/// Decode a patch field so that a present key (even `null`) is `Some`.
///
/// Paired with `#[serde(default)]`, a missing key stays `None` ("leave
/// unchanged") while `null` becomes `Some(None)` ("clear").
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Apply one patch field onto a record field.
pub(crate) fn apply_field(target: &mut Option<String>, patch: Option<&Option<String>>) {
    if let Some(value) = patch {
        target.clone_from(value);
    }
}
