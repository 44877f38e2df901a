// ── USB ports ──

use serde::{Deserialize, Serialize};

/// A USB port from `show rc system usb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbPort {
    /// 1-based port number.
    pub port: u32,
    /// Powered unless the running config shuts the port down.
    pub powered: bool,
}
