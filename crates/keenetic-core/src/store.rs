// ── Snapshot store ──
//
// Latest published values, each behind a `watch` channel. Readers never
// block pollers: they clone an `Arc` out of the channel. A failed cycle
// only touches the status channels, so the last snapshot stays available.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{FirmwareStatus, RouterInfo, Snapshot, WifiCredentials};
use crate::stream::SnapshotStream;

/// Phase of the full-data poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    #[default]
    Idle,
    Fetching,
    Normalizing,
    Published,
    Failed,
}

/// Outcome of the most recent full-data cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStatus {
    /// `None` until the first cycle finishes.
    pub last_update_success: Option<bool>,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
}

pub type WifiMap = IndexMap<String, WifiCredentials>;

/// Central reactive store for one router.
pub struct SnapshotStore {
    pub(crate) snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    pub(crate) router_info: watch::Sender<Option<Arc<RouterInfo>>>,
    pub(crate) firmware: watch::Sender<Option<Arc<FirmwareStatus>>>,
    pub(crate) wifi: watch::Sender<Arc<WifiMap>>,
    pub(crate) poll_state: watch::Sender<PollState>,
    pub(crate) status: watch::Sender<CycleStatus>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(None);
        let (router_info, _) = watch::channel(None);
        let (firmware, _) = watch::channel(None);
        let (wifi, _) = watch::channel(Arc::new(IndexMap::new()));
        let (poll_state, _) = watch::channel(PollState::Idle);
        let (status, _) = watch::channel(CycleStatus::default());

        Self {
            snapshot,
            router_info,
            firmware,
            wifi,
            poll_state,
            status,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    pub fn router_info(&self) -> Option<Arc<RouterInfo>> {
        self.router_info.borrow().clone()
    }

    pub fn firmware(&self) -> Option<Arc<FirmwareStatus>> {
        self.firmware.borrow().clone()
    }

    pub fn wifi_credentials(&self) -> Arc<WifiMap> {
        self.wifi.borrow().clone()
    }

    pub fn poll_state(&self) -> watch::Receiver<PollState> {
        self.poll_state.subscribe()
    }

    pub fn status(&self) -> CycleStatus {
        self.status.borrow().clone()
    }

    pub fn last_update_success(&self) -> Option<bool> {
        self.status.borrow().last_update_success
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub(crate) fn set_poll_state(&self, state: PollState) {
        self.poll_state.send_replace(state);
    }

    pub(crate) fn set_router_info(&self, info: RouterInfo) {
        self.router_info.send_replace(Some(Arc::new(info)));
    }

    /// Publish a new snapshot and mark the cycle successful.
    pub(crate) fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let fetched_at = snapshot.fetched_at;
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(Some(Arc::clone(&snapshot)));
        self.status.send_modify(|status| {
            status.last_update_success = Some(true);
            status.last_error = None;
            status.last_success_at = Some(fetched_at);
        });
        snapshot
    }

    /// Record a failed cycle. The published snapshot is left untouched.
    pub(crate) fn record_failure(&self, error: &str) {
        self.status.send_modify(|status| {
            status.last_update_success = Some(false);
            status.last_error = Some(error.to_owned());
        });
    }

    pub(crate) fn set_firmware(&self, firmware: FirmwareStatus) -> Arc<FirmwareStatus> {
        let firmware = Arc::new(firmware);
        self.firmware.send_replace(Some(Arc::clone(&firmware)));
        firmware
    }

    pub(crate) fn set_wifi(&self, wifi: WifiMap) -> Arc<WifiMap> {
        let wifi = Arc::new(wifi);
        self.wifi.send_replace(Arc::clone(&wifi));
        wifi
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
