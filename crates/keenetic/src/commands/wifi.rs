//! Wi-Fi access point handlers.
//!
//! Credentials are fetched on demand; passwords only leave the process
//! when `--show-passwords` is given or a QR payload is requested.

use serde::Serialize;
use tabled::Tabled;

use keenetic_core::{Controller, WifiCredentials};

use crate::cli::{GlobalOpts, WifiArgs, WifiCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Serialized view of an access point, with the password optionally masked.
#[derive(Serialize)]
struct AccessPoint<'a> {
    id: &'a str,
    name: &'a str,
    ssid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    active: bool,
}

impl<'a> AccessPoint<'a> {
    fn new(creds: &'a WifiCredentials, show_password: bool) -> Self {
        Self {
            id: &creds.id,
            name: creds.display_name(),
            ssid: creds.ssid.as_deref(),
            password: creds.password.as_deref().filter(|_| show_password),
            active: creds.active,
        }
    }
}

#[derive(Tabled)]
struct AccessPointRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Password")]
    password: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&AccessPoint<'_>> for AccessPointRow {
    fn from(ap: &AccessPoint<'_>) -> Self {
        Self {
            id: ap.id.to_owned(),
            name: ap.name.to_owned(),
            ssid: util::or_dash(ap.ssid),
            password: ap.password.map_or_else(|| "********".into(), str::to_owned),
            active: util::yes_no(ap.active),
        }
    }
}

pub async fn handle(controller: &Controller, args: WifiArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let wifi = controller.wifi_refresh().await?;

    match args.command {
        WifiCommand::List { show_passwords } => {
            let aps: Vec<AccessPoint<'_>> = wifi
                .values()
                .map(|c| AccessPoint::new(c, show_passwords))
                .collect();
            let out = output::render_list(
                &global.output,
                &aps,
                |ap| AccessPointRow::from(ap),
                |ap| ap.id.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WifiCommand::Qr { id } => {
            let creds = wifi.get(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "Access point".into(),
                identifier: id.clone(),
                list_command: "wifi list".into(),
            })?;
            let payload = creds.qr_payload().ok_or_else(|| CliError::Validation {
                field: "id".into(),
                reason: format!("access point {id} has no SSID"),
            })?;
            output::print_output(&payload, global.quiet);
            Ok(())
        }
    }
}
