// Whole-document JSON persistence.
//
// Reads never fail: anything unreadable comes back as the type's blank
// value. Writes never propagate: failures are logged and dropped.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub(super) fn load<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no document yet, using blank record");
            return T::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read document, using blank record");
            return T::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt document, using blank record");
            T::default()
        }
    }
}

pub(super) fn save<T: Serialize>(path: &Path, value: &T) {
    if let Err(e) = try_save(path, value) {
        warn!(path = %path.display(), error = %e, "failed to persist document");
    }
}

fn try_save<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}
