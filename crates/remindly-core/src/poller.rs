// ── Polling orchestrator ──
//
// Bootstraps a session, then runs one background task that owns it. Each
// tick fetches a snapshot, persists what it learned, caches the result in
// a watch channel and delivers it to the host's sink. The next tick is
// scheduled only after the previous one finishes, so ticks never overlap.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cloud::{CloudClient, FetchOptions, FetchOutcome};
use crate::config::PollerConfig;
use crate::error::CoreError;
use crate::model::{Identity, SensorReadings, Session, Snapshot};
use crate::store::IdentityStore;

const REFRESH_CHANNEL_SIZE: usize = 8;

/// Receives every fresh snapshot. Implemented by the host that exposes
/// readings (a CLI printer, a home-automation bridge).
pub trait SnapshotSink: Send + Sync {
    fn on_snapshot(&self, snapshot: &Snapshot, readings: &SensorReadings);

    /// Descriptive device metadata (model, serial, firmware, dealer) changed.
    fn on_identity_changed(&self, _identity: &Identity) {}
}

/// Display overrides applied to delivered snapshots.
#[derive(Debug, Clone, Default)]
struct Overrides {
    name: Option<String>,
    model: Option<String>,
    serial: Option<String>,
}

/// Owns the session and runs ticks.
///
/// Usually driven by [`Poller::spawn`]; hosts that need a single fetch can
/// call [`Poller::tick`] directly.
pub struct Poller {
    cloud: CloudClient,
    store: IdentityStore,
    session: Session,
    sink: Arc<dyn SnapshotSink>,
    interval: Duration,
    force_on_tick: bool,
    overrides: Overrides,
    latest: watch::Sender<Option<Arc<Snapshot>>>,
    last_heartbeat: Option<DateTime<Utc>>,
}

impl Poller {
    /// Build every collaborator from `config` and bootstrap a session.
    pub async fn from_config(
        config: PollerConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, CoreError> {
        let store = IdentityStore::new(&config.storage_dir);
        let cloud = CloudClient::from_config(&config)?;
        let session = bootstrap(&config, &cloud, &store).await?;

        let (latest, _) = watch::channel(None);
        Ok(Self {
            cloud,
            store,
            session,
            sink,
            interval: config.poll_interval,
            force_on_tick: config.force_on_tick,
            overrides: Overrides {
                name: config.name,
                model: config.model,
                serial: config.serial,
            },
            latest,
            last_heartbeat: None,
        })
    }

    /// Fetch once and apply the result.
    ///
    /// Failures are logged here; the error is returned for hosts that want
    /// to report it.
    pub async fn tick(&mut self, force: bool) -> Result<Snapshot, CoreError> {
        let result = self
            .cloud
            .fetch_snapshot(&self.session, FetchOptions { force })
            .await;

        let token_changed = !result.session.same_token(&self.session);
        self.session = result.session;
        if token_changed {
            let patch = self.session.identity_patch();
            with_store(&self.store, move |store| store.merge_identity(&patch)).await;
            info!("persisted refreshed auth token");
        }

        match result.outcome {
            FetchOutcome::Fresh(snapshot) => Ok(self.publish(snapshot).await),
            FetchOutcome::Stale(e) => {
                warn!(error = %e, "poll skipped, keeping last snapshot");
                Err(e)
            }
            FetchOutcome::Fatal(e) => {
                error!(error = %e, "poll cannot proceed");
                Err(e)
            }
        }
    }

    async fn publish(&mut self, snapshot: Snapshot) -> Snapshot {
        let identity_patch = snapshot.identity_patch();
        let status_patch = snapshot.status_patch();
        let (before, identity) = with_store(&self.store, move |store| {
            let before = store.load_identity();
            let identity = store.merge_identity(&identity_patch);
            store.merge_status(&status_patch);
            (before, identity)
        })
        .await;

        let snapshot = snapshot.with_overrides(
            self.overrides.name.as_deref(),
            self.overrides.model.as_deref(),
            self.overrides.serial.as_deref(),
        );
        let readings = snapshot.readings();
        self.heartbeat(&snapshot, &readings);

        let shared = Arc::new(snapshot.clone());
        self.latest.send_replace(Some(Arc::clone(&shared)));
        self.sink.on_snapshot(&shared, &readings);
        if before.descriptive_fields_differ(&identity) {
            debug!("device identity changed");
            self.sink.on_identity_changed(&identity);
        }
        snapshot
    }

    fn heartbeat(&mut self, snapshot: &Snapshot, readings: &SensorReadings) {
        let now = snapshot.fetched_at;
        let due = self
            .last_heartbeat
            .is_none_or(|last| now - last >= TimeDelta::hours(1));
        if due {
            info!(
                salt_pct = format_args!("{:.1}", snapshot.salt_pct),
                capacity = snapshot.capacity_remaining,
                status = %snapshot.system_status_name,
                "heartbeat OK"
            );
            self.last_heartbeat = Some(now);
        } else {
            debug!(
                salt = readings.salt_level,
                capacity = readings.capacity_remaining,
                alert = readings.alert,
                "poll ok"
            );
        }
    }

    /// Move the poller onto a background task.
    pub fn spawn(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_CHANNEL_SIZE);
        let latest = self.latest.subscribe();
        let task = tokio::spawn(self.run(cancel.clone(), refresh_rx));
        PollerHandle {
            latest,
            refresh_tx,
            cancel,
            task,
        }
    }

    async fn run(mut self, cancel: CancellationToken, mut refresh_rx: mpsc::Receiver<bool>) {
        info!(interval = ?self.interval, "starting poll loop");
        let mut force = self.force_on_tick;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.tick(force) => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                request = refresh_rx.recv() => {
                    // Every sender gone means the handle was dropped.
                    let Some(requested) = request else { break };
                    debug!(force = requested, "explicit refresh");
                    force = requested;
                }
                () = tokio::time::sleep(self.interval) => force = self.force_on_tick,
            }
        }

        debug!("poll loop stopped");
    }
}

/// Run store IO on the blocking pool. A panicked store task is logged and
/// reads as blank.
async fn with_store<T, F>(store: &IdentityStore, f: F) -> T
where
    T: Default + Send + 'static,
    F: FnOnce(&IdentityStore) -> T + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "store task failed");
            T::default()
        })
}

/// Decide where this run's token and device id come from.
///
/// Credentials win and trigger discovery; then a configured token and
/// device id; then the stored identity. Email and password stay in the
/// session whenever configured so reauth works on every path.
async fn bootstrap(
    config: &PollerConfig,
    cloud: &CloudClient,
    store: &IdentityStore,
) -> Result<Session, CoreError> {
    let mut session = Session {
        email: config.email.clone().filter(|e| !e.is_empty()),
        password: config.password.clone(),
        force_update: config.force_update,
        ..Session::default()
    };

    if let Some((email, password)) = session.credentials() {
        info!("discovering account from configured credentials");
        let account = cloud.discover_account(email, password).await?;
        let patch = account.identity_patch();
        with_store(store, move |store| store.merge_identity(&patch)).await;
        session.auth_token = Some(account.auth_token);
        session.device_id = Some(account.device_id);
        session.serial = Some(account.serial_number);
        return Ok(session);
    }

    let stored = with_store(store, IdentityStore::load_identity).await;

    if let (Some(token), Some(device_id)) = (&config.auth_token, &config.device_id) {
        info!("using configured auth token and device id");
        session.auth_token = Some(token.clone());
        session.device_id = Some(device_id.clone());
        session.serial = stored.serial;
        let patch = session.identity_patch();
        with_store(store, move |store| store.merge_identity(&patch)).await;
        return Ok(session);
    }

    if !stored.can_poll() {
        warn!("stored identity lacks a token or device id, not polling");
        return Err(CoreError::NoIdentity);
    }

    info!(name = stored.name.as_deref().unwrap_or("unknown"), "using stored identity");
    session.auth_token = stored.auth_token.map(secrecy::SecretString::from);
    session.device_id = stored.device_id;
    session.serial = stored.serial;
    Ok(session)
}

/// Control surface for a running poller.
#[derive(Debug)]
pub struct PollerHandle {
    latest: watch::Receiver<Option<Arc<Snapshot>>>,
    refresh_tx: mpsc::Sender<bool>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Last snapshot delivered, if any.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.borrow().clone()
    }

    /// Stream of snapshots, starting with the current one if present.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<Snapshot>> + use<> {
        WatchStream::new(self.latest.clone()).filter_map(|snapshot| snapshot)
    }

    /// Queue an immediate tick. Returns `false` when the poller is gone or
    /// enough refreshes are already queued.
    pub fn refresh(&self, force: bool) -> bool {
        self.refresh_tx.try_send(force).is_ok()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the loop and wait for the task to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "poll task ended abnormally");
        }
    }
}

/// Build collaborators, bootstrap, and spawn the poll loop.
pub async fn start(
    config: PollerConfig,
    sink: Arc<dyn SnapshotSink>,
) -> Result<PollerHandle, CoreError> {
    Ok(Poller::from_config(config, sink).await?.spawn())
}

pub async fn stop(handle: PollerHandle) {
    handle.stop().await;
}
