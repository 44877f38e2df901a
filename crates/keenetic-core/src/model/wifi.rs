// ── Wi-Fi credentials ──

use serde::{Deserialize, Serialize};

/// SSID and passphrase of one access-point interface, from `show rc interface`.
///
/// Identity is the interface id. Holds a secret: never log it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub id: String,
    /// Friendly label of the base interface.
    pub name: String,
    /// Segment of `id` before `/`.
    pub base_interface: String,
    pub ssid: Option<String>,
    /// WPA pre-shared key; `None` for open networks.
    pub password: Option<String>,
    pub active: bool,
    pub rename: Option<String>,
    pub description: Option<String>,
}

impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("id", &self.id)
            .field("ssid", &self.ssid)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl WifiCredentials {
    /// Payload for a Wi-Fi join QR code, or `None` without an SSID.
    pub fn qr_payload(&self) -> Option<String> {
        let ssid = self.ssid.as_deref()?;
        Some(match self.password.as_deref() {
            Some(pwd) => format!("WIFI:S:{ssid};T:WPA;P:{pwd};;"),
            None => format!("WIFI:S:{ssid};T:nopass;;;"),
        })
    }

    /// Label shown to users: rename, then description, then SSID, then id.
    pub fn display_name(&self) -> &str {
        self.rename
            .as_deref()
            .or(self.description.as_deref())
            .or(self.ssid.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::WifiCredentials;

    fn creds(password: Option<&str>) -> WifiCredentials {
        WifiCredentials {
            id: "WifiMaster0/AccessPoint0".into(),
            name: "WiFi 2.4g".into(),
            base_interface: "WifiMaster0".into(),
            ssid: Some("Home".into()),
            password: password.map(String::from),
            active: true,
            rename: None,
            description: None,
        }
    }

    #[test]
    fn qr_payload_for_wpa_network() {
        assert_eq!(
            creds(Some("hunter22")).qr_payload().as_deref(),
            Some("WIFI:S:Home;T:WPA;P:hunter22;;")
        );
    }

    #[test]
    fn qr_payload_for_open_network() {
        assert_eq!(
            creds(None).qr_payload().as_deref(),
            Some("WIFI:S:Home;T:nopass;;;")
        );
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", creds(Some("hunter22")));
        assert!(!rendered.contains("hunter22"));
    }
}
