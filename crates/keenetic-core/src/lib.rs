//! Domain layer between `keenetic-api` and the `keenetic` CLI.
//!
//! - **[`Controller`]**: Lifecycle facade.
//!   [`connect()`](Controller::connect) authenticates, loads the router
//!   identity, publishes a first snapshot, then spawns the poll loops and
//!   the command processor. [`Controller::oneshot()`](Controller::oneshot)
//!   runs a single request-response session for CLI invocations.
//!
//! - **[`SnapshotStore`]**: `tokio::sync::watch` channels holding the
//!   latest [`Snapshot`], firmware status and Wi-Fi credentials. A failed
//!   poll cycle never replaces a published value.
//!
//! - **[`normalize`]**: Batch request planning by hardware mode and the
//!   pure conversion of a batch answer into a [`Snapshot`].
//!
//! - **[`fields`]**: Registry of named readers over a snapshot (CPU load,
//!   WAN address, per-interface counters) used by status views.
//!
//! - **[`Command`]**: Typed write requests routed through an `mpsc`
//!   channel; each successful write forces a refresh of what it changed.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod fields;
pub mod model;
pub mod normalize;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{RouterConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use fields::{FieldValue, INTERFACE_FIELDS, ROUTER_FIELDS};
pub use store::{CycleStatus, PollState, SnapshotStore, WifiMap};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{
    Association, Device, FirmwareStatus, HostPolicy, HwMode, Interface, InterfaceStats,
    PolicyChoice, PortForwardRule, RouterInfo, Snapshot, SystemStatus, UsbPort, WifiCredentials,
};

pub use keenetic_api::BackupKind;
pub use reqwest::Method;
