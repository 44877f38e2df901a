//! Host (client) command handlers.

use tabled::Tabled;

use keenetic_core::{Controller, Device};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
}

impl From<&Device> for ClientRow {
    fn from(d: &Device) -> Self {
        Self {
            mac: d.mac.clone(),
            name: d.display_name().to_owned(),
            ip: util::or_dash(d.ip.as_deref()),
            interface: util::or_dash(d.interface_id.as_deref()),
            active: util::yes_no(d.active),
            uptime: util::uptime(d.uptime),
        }
    }
}

fn detail(d: &Device) -> String {
    let mut pairs = vec![
        ("MAC", d.mac.clone()),
        ("Name", d.display_name().to_owned()),
        ("Hostname", util::or_dash(d.hostname.as_deref())),
        ("IP", util::or_dash(d.ip.as_deref())),
        ("Interface", util::or_dash(d.interface_id.as_deref())),
        ("Active", util::yes_no(d.active)),
        ("Uptime", util::uptime(d.uptime)),
        ("Received", util::bytes(d.rxbytes)),
        ("Sent", util::bytes(d.txbytes)),
    ];
    if let Some(rssi) = d.rssi {
        pairs.push(("RSSI", format!("{rssi} dBm")));
    }
    output::detail_lines(&pairs)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(controller: &Controller, args: ClientsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = util::snapshot(controller)?;
    match args.command {
        ClientsCommand::List { active } => {
            let devices: Vec<&Device> = snap
                .devices
                .values()
                .filter(|d| !active || d.active)
                .collect();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| ClientRow::from(*d),
                |d| d.mac.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { mac } => {
            let device = snap.device(&mac).ok_or_else(|| CliError::NotFound {
                resource_type: "Host".into(),
                identifier: mac.clone(),
                list_command: "clients list".into(),
            })?;
            let out = output::render_single(&global.output, device, detail, |d| d.mac.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
