// Router endpoints
//
// Single-purpose reads and the write actions. Reads return the raw JSON
// tree; shaping it into domain types is keenetic-core's job. Writes are
// fire-and-forget: callers refresh their snapshot afterwards.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::RouterClient;
use crate::decode::DecodedBody;
use crate::error::Error;

/// Locale sent with release-notes requests.
const RELEASE_NOTES_LOCALE: &str = "ru";

/// Persist the running configuration; appended to every batched write.
fn save_configuration() -> Value {
    json!({"system": {"configuration": {"save": {}}}})
}

/// `{key: value}` with a runtime key.
fn flag(key: &str, value: impl Into<Value>) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_owned(), value.into());
    Value::Object(map)
}

/// Access/policy pair for a hotspot host.
///
/// A `None` policy clears any named policy (`"policy": false` on the wire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAccess {
    pub access: String,
    pub policy: Option<String>,
}

impl RouterClient {
    // ── Reads ────────────────────────────────────────────────────────

    /// `show identification`: mac and serial number.
    pub async fn show_identification(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/identification").await
    }

    /// `show version`: model, hw_id, device, release, sandbox, title.
    pub async fn show_version(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/version").await
    }

    /// `show system mode`: `active` is `router` or another hardware mode.
    pub async fn show_system_mode(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/system/mode").await
    }

    pub async fn show_system(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/system").await
    }

    pub async fn show_interface(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/interface").await
    }

    /// `show rc interface`: running-config interfaces, including Wi-Fi credentials.
    pub async fn show_rc_interface(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/rc/interface").await
    }

    pub async fn show_associations(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/associations").await
    }

    /// Traffic counters for one interface.
    pub async fn show_interface_stat(&self, name: &str) -> Result<Value, Error> {
        let mut url = self.url("/rci/show/interface/stat")?;
        url.query_pairs_mut().append_pair("name", name);
        let endpoint = format!("{}?{}", url.path(), url.query().unwrap_or_default());
        self.get_json(&endpoint).await
    }

    pub async fn show_ip_hotspot(&self) -> Result<Value, Error> {
        self.get_json("/rci/show/ip/hotspot/host").await
    }

    pub async fn ip_hotspot_host_list(&self) -> Result<Value, Error> {
        self.get_json("/rci/ip/hotspot/host").await
    }

    /// Named IP policies configured on the router.
    pub async fn ip_policy_list(&self) -> Result<Value, Error> {
        self.get_json("/rci/ip/policy").await
    }

    /// Installed and available firmware components.
    pub async fn components_list(&self) -> Result<Value, Error> {
        self.post_json("/rci/components/list", &json!({})).await
    }

    /// Release notes for a firmware version on a release-notes channel.
    pub async fn release_notes(&self, version: &str, channel: &str) -> Result<Value, Error> {
        let body = json!({
            "version": version,
            "locale": RELEASE_NOTES_LOCALE,
            "channel": channel,
        });
        self.post_json("/rci/webhelp/release-notes", &body).await
    }

    /// Legacy component manifest, served as a script assignment list.
    pub async fn ndm_components(&self) -> Result<DecodedBody, Error> {
        self.api(Method::GET, "/ndmComponents.js", None).await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Bring an interface up or down.
    pub async fn set_interface_state(&self, name: &str, up: bool) -> Result<Value, Error> {
        let state = if up { "up" } else { "down" };
        debug!(interface = name, state, "setting interface state");
        let endpoint = format!("/rci/interface/{name}");
        self.post_json(&endpoint, &flag(state, "true")).await
    }

    /// Enable or disable a port-forwarding rule by index.
    pub async fn set_port_forwarding(&self, index: &str, enabled: bool) -> Result<Value, Error> {
        debug!(index, enabled, "setting port forwarding");
        self.post_commands(vec![
            json!({"ip": {"index": index, "static": {"disable": !enabled}}}),
            save_configuration(),
        ])
        .await
    }

    /// Switch power on a USB port (1-based).
    pub async fn set_usb_power(&self, port: u32, on: bool) -> Result<Value, Error> {
        debug!(port, on, "setting USB power");
        self.post_commands(vec![
            json!({"system": {"usb": {"port": port, "power": {"shutdown": !on}}}}),
            save_configuration(),
        ])
        .await
    }

    /// Open or close the web configurator to the public side.
    pub async fn set_web_configurator_access(&self, public: bool) -> Result<Value, Error> {
        let level = if public { "public" } else { "private" };
        debug!(level, "setting web configurator access");
        self.post_commands(vec![
            json!({"ip": {"http": {"security-level": flag(level, true)}}}),
            save_configuration(),
        ])
        .await
    }

    /// Set access and policy for one hotspot host.
    pub async fn set_host_policy(&self, mac: &str, access: &HostAccess) -> Result<Value, Error> {
        let policy = access
            .policy
            .as_ref()
            .map_or(Value::Bool(false), |name| Value::String(name.clone()));
        let body = json!({
            "mac": mac,
            "access": access.access,
            "policy": policy,
        });
        self.post_json("/rci/ip/hotspot/host", &body).await
    }

    pub async fn reboot(&self) -> Result<Value, Error> {
        self.post_json("/rci/system/reboot", &json!({})).await
    }

    /// Commit the pending firmware component set (installs an update).
    pub async fn update_firmware(&self) -> Result<Value, Error> {
        self.post_json("/rci/components/commit", &json!({"reason": "manual"}))
            .await
    }

    /// Arbitrary authenticated request, for endpoints without a typed wrapper.
    pub async fn raw_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<DecodedBody, Error> {
        self.api(method, endpoint, body).await
    }
}
