// ── Domain model ──
//
// Canonical types built from router responses. Every field the router
// may omit is an `Option`; nothing here panics on a missing key.

pub mod device;
pub mod firmware;
pub mod interface;
pub mod policy;
pub mod port_forward;
pub mod router;
pub mod snapshot;
pub mod usb;
pub mod wifi;

pub use device::Device;
pub use firmware::{FirmwareStatus, release_notes_channel};
pub use interface::{Interface, InterfaceStats, friendly_name};
pub use policy::{HostPolicy, PolicyChoice};
pub use port_forward::PortForwardRule;
pub use router::{HwMode, RouterInfo};
pub use snapshot::{Association, Snapshot, SystemStatus};
pub use usb::UsbPort;
pub use wifi::WifiCredentials;
