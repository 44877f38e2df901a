//! Router identity, system readings and reboot.

use serde::Serialize;

use keenetic_core::{Command as CoreCommand, Controller, FirmwareStatus, RouterInfo, SystemStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

/// Everything the `system` command prints, in one serializable value.
#[derive(Serialize)]
struct SystemView {
    router: Option<RouterInfo>,
    system: Option<SystemStatus>,
    firmware: Option<FirmwareStatus>,
    web_public: Option<bool>,
    wan_ip: Option<String>,
    partial: bool,
}

fn detail(v: &SystemView) -> String {
    let mut pairs = Vec::new();
    if let Some(ref r) = v.router {
        pairs.extend([
            ("Device", r.display_name().to_owned()),
            ("Model", util::or_dash(r.model.as_deref())),
            ("Hardware ID", util::or_dash(r.hw_id.as_deref())),
            ("Serial", util::or_dash(r.serial.as_deref())),
            ("MAC", util::or_dash(r.mac.as_deref())),
            ("Mode", r.hw_mode.to_string()),
        ]);
    }
    if let Some(ref s) = v.system {
        pairs.extend([
            ("Hostname", util::or_dash(s.hostname.as_deref())),
            ("Domain", util::or_dash(s.domainname.as_deref())),
            ("Uptime", util::uptime(s.uptime)),
            (
                "CPU load",
                s.cpuload.map_or_else(|| "-".into(), |c| format!("{c:.0}%")),
            ),
            ("Memory", util::or_dash(s.memory.as_deref())),
        ]);
    }
    pairs.push(("WAN IP", util::or_dash(v.wan_ip.as_deref())));
    if let Some(ref f) = v.firmware {
        pairs.push(("Firmware", util::or_dash(f.installed.as_deref())));
        if f.update_available {
            pairs.push(("Update", util::or_dash(f.available.as_deref())));
        }
    }
    if let Some(public) = v.web_public {
        pairs.push(("Web access", String::from(if public { "public" } else { "home network" })));
    }
    output::detail_lines(&pairs)
}

pub fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let snap = util::snapshot(controller)?;
    let view = SystemView {
        router: controller.router_info().map(|r| r.as_ref().clone()),
        system: snap.system.clone(),
        firmware: controller.firmware().map(|f| f.as_ref().clone()),
        web_public: snap.web_public,
        wan_ip: snap.wan_ip().map(str::to_owned),
        partial: snap.is_partial(),
    };
    let out = output::render_single(&global.output, &view, detail, |v| {
        v.router
            .as_ref()
            .map_or_else(|| "-".into(), |r| r.display_name().to_owned())
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn reboot(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let name = controller
        .router_info()
        .map_or_else(|| "the router".into(), |r| r.display_name().to_owned());
    if !util::confirm(&format!("Reboot {name}?"), "reboot", global.yes)? {
        return Ok(());
    }
    controller.execute(CoreCommand::Reboot).await?;
    if !global.quiet {
        eprintln!("Reboot requested");
    }
    Ok(())
}
