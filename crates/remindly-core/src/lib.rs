//! Snapshot pipeline between `remindly-api` and a host that exposes
//! water-softener readings.
//!
//! - **[`CloudClient`]** discovers the account behind an email/password and
//!   runs the fetch pipeline: login when needed, read device status, and on
//!   a rejected token re-login and retry once. Every fetch ends in a
//!   [`FetchOutcome`] plus the session to keep.
//!
//! - **[`IdentityStore`]** keeps the last known device identity and
//!   regeneration status as two small JSON documents, so a restart resumes
//!   without rediscovery. Reads never fail and writes never propagate.
//!
//! - **[`Poller`]** owns the session on one background task, scheduling
//!   each tick after the previous one completes. [`start`] is the
//!   composition root; [`PollerHandle`] exposes the latest snapshot, a
//!   subscription stream, explicit refresh, and stop.
//!
//! - **Domain model** ([`model`]): `Identity`/`Status` records with
//!   three-state patches, the normalized `Snapshot`, and `SensorReadings`.

pub mod cloud;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod poller;
pub mod store;

pub use cloud::{CloudClient, FetchOptions, FetchOutcome, FetchResult};
pub use config::{DEFAULT_POLL_INTERVAL, PollerConfig};
pub use error::{CoreError, DiscoveryStep};
pub use model::{
    AccountInfo, Identity, IdentityPatch, LOW_SALT_THRESHOLD, SensorReadings, Session, Snapshot,
    Status, StatusPatch, StatusState,
};
pub use poller::{Poller, PollerHandle, SnapshotSink, start, stop};
pub use store::{IdentityStore, StoreSummary};
