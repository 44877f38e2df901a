// ── Controller abstraction ──
//
// Full lifecycle management for one router connection.
// Handles authentication, the three poll loops, command routing,
// and reactive snapshot publishing through the SnapshotStore.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use keenetic_api::transport::{TlsMode, TransportConfig};
use keenetic_api::{HostAccess, RciQuery, RouterClient};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult, Invalidates};
use crate::config::{RouterConfig, TlsVerification};
use crate::convert;
use crate::error::CoreError;
use crate::model::{FirmwareStatus, RouterInfo, Snapshot};
use crate::normalize::{self, Section, Sections};
use crate::store::{CycleStatus, PollState, SnapshotStore, WifiMap};
use crate::stream::SnapshotStream;

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the router session,
/// runs the poll loops and serializes write commands.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: RouterConfig,
    store: Arc<SnapshotStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection. Cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<RouterClient>>,
    /// Held for a whole cycle so cycles of one kind never overlap.
    full_cycle: Mutex<()>,
    firmware_cycle: Mutex<()>,
    wifi_cycle: Mutex<()>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start background tasks.
    pub fn new(config: RouterConfig) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                full_cycle: Mutex::new(()),
                firmware_cycle: Mutex::new(()),
                wifi_cycle: Mutex::new(()),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the router configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Access the underlying SnapshotStore.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the router.
    ///
    /// Authenticates, loads the router identity, performs the first full
    /// refresh (fatal on failure), then best-effort firmware and Wi-Fi
    /// refreshes, and finally spawns the background tasks.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        match self.establish().await {
            Ok(()) => {
                let _ = self.inner.connection_state.send(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                *self.inner.client.lock().await = None;
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    async fn establish(&self) -> Result<(), CoreError> {
        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = RouterClient::new(
            config.url.clone(),
            config.username.clone(),
            config.password.clone(),
            &build_transport(config),
        )?;

        if !client.authenticate().await? {
            return Err(CoreError::AuthenticationFailed {
                message: "router did not accept the session".into(),
            });
        }
        debug!(url = %config.url, "session authentication successful");

        let info = load_router_info(&client).await?;
        info!(
            model = info.display_name(),
            mode = %info.hw_mode,
            release = info.release.as_deref().unwrap_or("unknown"),
            "connected to router"
        );
        let router_mode = info.hw_mode.is_router();
        self.inner.store.set_router_info(info);
        *self.inner.client.lock().await = Some(client);

        // Initial data load
        self.full_refresh().await?;

        if let Err(e) = self.firmware_refresh().await {
            warn!(error = %e, "initial firmware refresh failed (non-fatal)");
        }

        let wifi_enabled = config.wifi_credentials && router_mode;
        if wifi_enabled {
            if let Err(e) = self.wifi_refresh().await {
                warn!(error = %e, "initial Wi-Fi credentials refresh failed (non-fatal)");
            }
        }

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx, child.clone())));
        }

        if let Some(period) = config.effective_scan_interval() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(poll_task(ctrl, Poll::Full, period, child.clone())));
        }

        if !config.firmware_interval.is_zero() {
            let ctrl = self.clone();
            let period = config.firmware_interval;
            handles.push(tokio::spawn(poll_task(ctrl, Poll::Firmware, period, child.clone())));
        }

        if wifi_enabled && !config.wifi_interval.is_zero() {
            let ctrl = self.clone();
            let period = config.wifi_interval;
            handles.push(tokio::spawn(poll_task(ctrl, Poll::Wifi, period, child)));
        }

        debug!(tasks = handles.len(), "background tasks spawned");
        Ok(())
    }

    /// Disconnect from the router.
    ///
    /// Cancels background tasks, drops the session, and resets the
    /// connection state to [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, which allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        // The previous receiver is consumed by the command processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Poll cycles ──────────────────────────────────────────────

    /// Run one full-data cycle and publish the result.
    ///
    /// Waits for a cycle already in flight. On failure the previous
    /// snapshot stays published and the error is recorded in the store.
    pub async fn full_refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let _cycle = self.inner.full_cycle.lock().await;
        let store = &self.inner.store;

        store.set_poll_state(PollState::Fetching);
        let result = bounded(self.inner.config.timeout, self.fetch_snapshot()).await;

        match result {
            Ok(snapshot) => {
                let partial = snapshot.missing_sections.len();
                let published = store.publish(snapshot);
                store.set_poll_state(PollState::Published);
                info!(
                    interfaces = published.interfaces.len(),
                    devices = published.devices.len(),
                    missing = partial,
                    "snapshot published"
                );
                store.set_poll_state(PollState::Idle);
                Ok(published)
            }
            Err(e) => {
                store.set_poll_state(PollState::Failed);
                store.record_failure(&e.to_string());
                warn!(error = %e, "full refresh failed, keeping previous snapshot");
                store.set_poll_state(PollState::Idle);
                Err(e)
            }
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, CoreError> {
        let client = self.client().await?;
        let info = self
            .inner
            .store
            .router_info()
            .ok_or(CoreError::RouterDisconnected)?;

        let sections = Section::for_mode(&info.hw_mode);
        let queries: Vec<RciQuery> = sections.iter().map(|s| s.query()).collect();
        let values = client.execute(&queries).await?;

        self.inner.store.set_poll_state(PollState::Normalizing);
        let batch = Sections::from_batch(&sections, values);
        let mut snapshot = normalize::normalize(&batch, &info.hw_mode, Utc::now());

        let (ids, stat_queries): (Vec<String>, Vec<RciQuery>) =
            normalize::stat_queries(&snapshot).into_iter().unzip();
        if !stat_queries.is_empty() {
            match client.execute(&stat_queries).await {
                Ok(values) => normalize::attach_stats(&mut snapshot, &ids, values),
                Err(e) => {
                    warn!(error = %e, "interface counters unavailable this cycle");
                    snapshot.missing_sections.push("interface_stat".into());
                }
            }
        }

        Ok(snapshot)
    }

    /// Refresh installed and available firmware versions.
    pub async fn firmware_refresh(&self) -> Result<Arc<FirmwareStatus>, CoreError> {
        let _cycle = self.inner.firmware_cycle.lock().await;
        let client = self.client().await?;

        let status = bounded(self.inner.config.timeout, async {
            let version = client.show_version().await?;
            let components = match client.components_list().await {
                Ok(components) => Some(components),
                Err(e) => {
                    debug!(error = %e, "component list unavailable");
                    None
                }
            };
            Ok(convert::firmware_status(&version, components.as_ref()))
        })
        .await?;

        debug!(
            installed = status.installed.as_deref().unwrap_or("unknown"),
            update = status.update_available,
            "firmware status refreshed"
        );
        Ok(self.inner.store.set_firmware(status))
    }

    /// Refresh Wi-Fi access point credentials.
    pub async fn wifi_refresh(&self) -> Result<Arc<WifiMap>, CoreError> {
        let _cycle = self.inner.wifi_cycle.lock().await;
        let client = self.client().await?;

        let wifi = bounded(self.inner.config.timeout, async {
            let raw = client.show_rc_interface().await?;
            Ok(convert::wifi_credentials(&raw))
        })
        .await?;

        debug!(networks = wifi.len(), "Wi-Fi credentials refreshed");
        Ok(self.inner.store.set_wifi(wifi))
    }

    // ── On-demand reads ──────────────────────────────────────────

    /// Named access policies configured on the router.
    pub async fn policies(&self) -> Result<Vec<String>, CoreError> {
        let client = self.client().await?;
        let raw = client.ip_policy_list().await?;
        Ok(convert::policy_names(&raw))
    }

    /// Release notes for the available firmware version.
    ///
    /// Uses the cached firmware status, refreshing it first if none exists.
    pub async fn release_notes(&self) -> Result<Value, CoreError> {
        let firmware = match self.firmware() {
            Some(firmware) => firmware,
            None => self.firmware_refresh().await?,
        };
        let channel = firmware
            .release_notes_channel()
            .ok_or_else(|| CoreError::Unsupported {
                operation: "release notes".into(),
                required: "a stable, preview or draft firmware channel".into(),
            })?;
        let version = firmware
            .notes_version()
            .ok_or_else(|| CoreError::not_found("Firmware version", "installed"))?;

        let client = self.client().await?;
        Ok(client.release_notes(version, channel).await?)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the router.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result. A successful write is followed
    /// by the refresh it invalidates before this returns, so `snapshot()`
    /// already reflects it. A failed refresh is logged, not returned.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::RouterDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::RouterDisconnected)?;

        rx.await.map_err(|_| CoreError::RouterDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables every poll loop since we only need
    /// a single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: RouterConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.scan_interval = Duration::ZERO;
        cfg.firmware_interval = Duration::ZERO;
        cfg.wifi_interval = Duration::ZERO;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Latest published snapshot, if any cycle has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.snapshot()
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn firmware(&self) -> Option<Arc<FirmwareStatus>> {
        self.inner.store.firmware()
    }

    pub fn wifi_credentials(&self) -> Arc<WifiMap> {
        self.inner.store.wifi_credentials()
    }

    pub fn router_info(&self) -> Option<Arc<RouterInfo>> {
        self.inner.store.router_info()
    }

    pub fn poll_state(&self) -> watch::Receiver<PollState> {
        self.inner.store.poll_state()
    }

    /// `None` until the first full cycle completes.
    pub fn last_update_success(&self) -> Option<bool> {
        self.inner.store.last_update_success()
    }

    pub fn cycle_status(&self) -> CycleStatus {
        self.inner.store.status()
    }

    async fn client(&self) -> Result<RouterClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::RouterDisconnected)
    }
}

// ── Background tasks ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Poll {
    Full,
    Firmware,
    Wifi,
}

/// Periodic poll loop for one data family.
///
/// A failed cycle is logged and retried on the next tick; there is no
/// other backoff.
async fn poll_task(controller: Controller, kind: Poll, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!(?kind, "poll tick");
                let result = match kind {
                    Poll::Full => controller.full_refresh().await.map(drop),
                    Poll::Firmware => controller.firmware_refresh().await.map(drop),
                    Poll::Wifi => controller.wifi_refresh().await.map(drop),
                };
                if let Err(e) = result {
                    warn!(?kind, error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, one at a time.
async fn command_processor_task(
    controller: Controller,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let invalidates = envelope.command.invalidates();
                let result = route_command(&controller, envelope.command).await;
                if result.is_ok() {
                    refresh_after_write(&controller, invalidates).await;
                }
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

async fn refresh_after_write(controller: &Controller, invalidates: Invalidates) {
    let result = match invalidates {
        Invalidates::Nothing => return,
        Invalidates::Snapshot => controller.full_refresh().await.map(drop),
        Invalidates::Firmware => controller.firmware_refresh().await.map(drop),
    };
    if let Err(e) = result {
        warn!(error = %e, "refresh after command failed");
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the matching router call.
///
/// Targets are checked against the latest snapshot when one exists, so an
/// unknown interface or rule fails before anything is sent.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;
    let snapshot = controller.snapshot();

    match cmd {
        Command::SetInterface { id, up } => {
            if let Some(snap) = &snapshot {
                if snap.interface(&id).is_none() {
                    return Err(CoreError::not_found("Interface", id));
                }
            }
            client.set_interface_state(&id, up).await?;
            info!(interface = %id, up, "interface state changed");
            Ok(CommandResult::Ok)
        }

        Command::SetPortForwarding { index, enabled } => {
            if let Some(snap) = &snapshot {
                if snap.port_forward(&index).is_none() {
                    return Err(CoreError::not_found("Port forwarding rule", index));
                }
            }
            client.set_port_forwarding(&index, enabled).await?;
            info!(rule = %index, enabled, "port forwarding rule changed");
            Ok(CommandResult::Ok)
        }

        Command::SetUsbPower { port, on } => {
            if port == 0 {
                return Err(CoreError::ValidationFailed {
                    message: "USB ports are numbered from 1".into(),
                });
            }
            if let Some(snap) = &snapshot {
                if !snap.usb_ports.is_empty() && snap.usb_port(port).is_none() {
                    return Err(CoreError::not_found("USB port", port.to_string()));
                }
            }
            client.set_usb_power(port, on).await?;
            info!(port, on, "USB power changed");
            Ok(CommandResult::Ok)
        }

        Command::SetWebConfiguratorAccess { public } => {
            client.set_web_configurator_access(public).await?;
            info!(public, "web configurator access changed");
            Ok(CommandResult::Ok)
        }

        Command::SetHostPolicy { mac, policy } => {
            validate_mac(&mac)?;
            let (access, named) = policy.access();
            let access = HostAccess {
                access: access.to_owned(),
                policy: named.map(ToOwned::to_owned),
            };
            client.set_host_policy(&mac, &access).await?;
            info!(%mac, %policy, "host policy changed");
            Ok(CommandResult::Ok)
        }

        Command::Reboot => {
            client.reboot().await?;
            info!("reboot requested");
            Ok(CommandResult::Ok)
        }

        Command::UpdateFirmware => {
            client.update_firmware().await?;
            info!("firmware update requested");
            Ok(CommandResult::Ok)
        }

        Command::Backup { kinds, folder } => {
            let kinds = if kinds.is_empty() {
                controller.inner.config.backup_kinds.clone()
            } else {
                kinds
            };
            let files = client.backup(&kinds, &folder).await?;
            info!(files = files.len(), folder = %folder.display(), "backup written");
            Ok(CommandResult::Files(files))
        }

        Command::RawRequest {
            method,
            endpoint,
            body,
        } => {
            let decoded = client.raw_request(method, &endpoint, body.as_ref()).await?;
            Ok(CommandResult::Response(decoded.into_json()?))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

async fn load_router_info(client: &RouterClient) -> Result<RouterInfo, CoreError> {
    let identification = client.show_identification().await?;
    let version = client.show_version().await?;
    let mode = client.show_system_mode().await?;
    Ok(convert::router_info(&identification, &version, &mode))
}

/// Bound a future by the configured timeout.
async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(CoreError::Timeout {
            timeout_secs: timeout.as_secs(),
        }))
}

/// Six colon-separated hex octets.
fn validate_mac(mac: &str) -> Result<(), CoreError> {
    let octets: Vec<&str> = mac.split(':').collect();
    let valid = octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed {
            message: format!("invalid MAC address: {mac}"),
        })
    }
}

fn build_transport(config: &RouterConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // RouterClient::new adds one automatically
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_validation() {
        assert!(validate_mac("aa:bb:cc:dd:ee:ff").is_ok());
        assert!(validate_mac("AA:BB:CC:00:11:22").is_ok());
        assert!(validate_mac("aa:bb:cc:dd:ee").is_err());
        assert!(validate_mac("aa-bb-cc-dd-ee-ff").is_err());
        assert!(validate_mac("zz:bb:cc:dd:ee:ff").is_err());
    }

    #[tokio::test]
    async fn execute_requires_connection() {
        let config = RouterConfig::new(
            "http://192.168.1.1".parse().expect("url"),
            "admin",
            "secret".to_owned().into(),
        );
        let controller = Controller::new(config);

        let err = controller
            .execute(Command::Reboot)
            .await
            .expect_err("not connected");
        assert!(matches!(err, CoreError::RouterDisconnected));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_times_out() {
        let err = bounded(Duration::from_secs(2), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, CoreError>(())
        })
        .await
        .expect_err("timed out");
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 2 }));
    }
}
