// ── Identity / status persistence ──
//
// Two small JSON documents under `<base>/remindly/`: the device identity
// and the last regeneration status. Every operation is a whole-document
// read-modify-write with no locking; the poller is the only writer while
// it runs.

mod document;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::model::{Identity, IdentityPatch, Status, StatusPatch};

/// Directory created under the storage base.
pub const STORE_DIR: &str = "remindly";
pub const IDENTITY_FILE: &str = "identity.json";
pub const STATUS_FILE: &str = "status.json";

/// Dealer contact and regeneration timing, as one read-only view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub dealer_name: Option<String>,
    pub dealer_phone: Option<String>,
    pub dealer_email: Option<String>,
    pub last_regen_date: Option<String>,
    pub next_regen_time: Option<String>,
    pub as_of: Option<String>,
}

/// File-backed store for [`Identity`] and [`Status`].
#[derive(Debug, Clone)]
pub struct IdentityStore {
    dir: PathBuf,
}

impl IdentityStore {
    /// Store rooted at `<base>/remindly`. Nothing is touched on disk until
    /// the first write.
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            dir: base.as_ref().join(STORE_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn identity_path(&self) -> PathBuf {
        self.dir.join(IDENTITY_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn load_identity(&self) -> Identity {
        document::load(&self.identity_path())
    }

    pub fn save_identity(&self, identity: &Identity) {
        document::save(&self.identity_path(), identity);
    }

    /// Load, apply `patch`, save, and return the merged record.
    pub fn merge_identity(&self, patch: &IdentityPatch) -> Identity {
        let mut identity = self.load_identity();
        identity.apply(patch);
        self.save_identity(&identity);
        debug!("identity merged");
        identity
    }

    // ── Status ───────────────────────────────────────────────────────

    pub fn load_status(&self) -> Status {
        document::load(&self.status_path())
    }

    pub fn save_status(&self, status: &Status) {
        document::save(&self.status_path(), status);
    }

    pub fn merge_status(&self, patch: &StatusPatch) -> Status {
        let mut status = self.load_status();
        status.apply(patch);
        self.save_status(&status);
        debug!("status merged");
        status
    }

    // ── Host views ───────────────────────────────────────────────────

    /// Reset both documents to blank records.
    pub fn clear(&self) {
        self.save_identity(&Identity::default());
        self.save_status(&Status::default());
    }

    pub fn has_identity(&self) -> bool {
        self.load_identity().has_identity()
    }

    pub fn summary(&self) -> StoreSummary {
        let identity = self.load_identity();
        let status = self.load_status();
        StoreSummary {
            dealer_name: identity.dealer_name,
            dealer_phone: identity.dealer_phone,
            dealer_email: identity.dealer_email,
            last_regen_date: status.last_regen_date,
            next_regen_time: status.next_regen_time,
            as_of: status.as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn store() -> (tempfile::TempDir, IdentityStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path());
        (dir, store)
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn missing_documents_load_blank() {
        let (_dir, store) = store();
        assert_eq!(store.load_identity(), Identity::default());
        assert_eq!(store.load_status(), Status::default());
        assert!(!store.has_identity());
    }

    #[test]
    fn corrupt_documents_load_blank() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.identity_path(), "{not json").unwrap();
        std::fs::write(store.status_path(), "\"not an object\"").unwrap();

        assert_eq!(store.load_identity(), Identity::default());
        assert_eq!(store.load_status(), Status::default());
    }

    #[test]
    fn empty_documents_load_blank() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.identity_path(), "").unwrap();
        std::fs::write(store.status_path(), "").unwrap();

        assert_eq!(store.load_identity(), Identity::default());
        assert_eq!(store.load_status(), Status::default());
    }

    #[test]
    fn wrong_types_load_as_null() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.identity_path(),
            r#"{"deviceId": 42, "name": {"x": 1}, "model": "", "serial": true}"#,
        )
        .unwrap();

        let identity = store.load_identity();
        assert_eq!(identity.device_id.as_deref(), Some("42"));
        assert_eq!(identity.name, None);
        assert_eq!(identity.model, None);
        assert_eq!(identity.serial, None);
    }

    #[test]
    fn merge_creates_directory_and_writes_closed_schema() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.identity_path(),
            r#"{"legacy": "drop me", "serial": "SN-1"}"#,
        )
        .unwrap();

        let patch: IdentityPatch = serde_json::from_value(json!({ "model": "EC5" })).unwrap();
        let merged = store.merge_identity(&patch);
        assert_eq!(merged.serial.as_deref(), Some("SN-1"));
        assert_eq!(merged.model.as_deref(), Some("EC5"));

        let on_disk = read_json(&store.identity_path());
        assert_eq!(on_disk.get("legacy"), None);
        assert_eq!(on_disk["model"], json!("EC5"));
        assert_eq!(on_disk["firmware"], Value::Null);
    }

    #[test]
    fn merge_status_from_scratch() {
        let (_dir, store) = store();
        let status = store.merge_status(&StatusPatch {
            as_of: Some(Some("2025-01-02T10:00:00Z".into())),
            ..StatusPatch::default()
        });
        assert_eq!(status.as_of.as_deref(), Some("2025-01-02T10:00:00Z"));
        assert_eq!(store.load_status(), status);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let (dir, _) = store();
        // A file where the store directory should be makes every write fail.
        let blocker = dir.path().join(STORE_DIR);
        std::fs::write(&blocker, "").unwrap();
        let store = IdentityStore::new(dir.path());

        store.save_identity(&Identity::default());
        assert_eq!(store.load_identity(), Identity::default());
    }

    #[test]
    fn clear_blanks_both_documents() {
        let (_dir, store) = store();
        store.merge_identity(&IdentityPatch {
            device_id: Some(Some("42".into())),
            ..IdentityPatch::default()
        });
        store.merge_status(&StatusPatch {
            last_regen_date: Some(Some("2025-01-01".into())),
            ..StatusPatch::default()
        });
        assert!(store.has_identity());

        store.clear();

        assert!(!store.has_identity());
        assert_eq!(store.load_status(), Status::default());
        assert_eq!(read_json(&store.identity_path())["deviceId"], Value::Null);
    }

    #[test]
    fn summary_joins_dealer_and_regen() {
        let (_dir, store) = store();
        store.merge_identity(&IdentityPatch {
            dealer_name: Some(Some("Acme Water".into())),
            ..IdentityPatch::default()
        });
        store.merge_status(&StatusPatch {
            next_regen_time: Some(Some("02:00".into())),
            ..StatusPatch::default()
        });

        let summary = store.summary();
        assert_eq!(summary.dealer_name.as_deref(), Some("Acme Water"));
        assert_eq!(summary.next_regen_time.as_deref(), Some("02:00"));
        assert_eq!(summary.dealer_phone, None);
    }
}
