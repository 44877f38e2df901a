//! USB power handlers.

use tabled::Tabled;

use keenetic_core::{Command as CoreCommand, Controller, UsbPort};

use crate::cli::{GlobalOpts, UsbArgs, UsbCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UsbRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Power")]
    power: String,
}

pub async fn handle(controller: &Controller, args: UsbArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (port, on) = match args.command {
        UsbCommand::List => {
            let snap = util::snapshot(controller)?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &snap.usb_ports,
                |p: &UsbPort| UsbRow {
                    port: p.port,
                    power: output::paint_state(if p.powered { "on" } else { "off" }, color),
                },
                |p| p.port.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        UsbCommand::On { port } => (port, true),
        UsbCommand::Off { port } => (port, false),
    };

    controller
        .execute(CoreCommand::SetUsbPower { port, on })
        .await?;
    if !global.quiet {
        eprintln!("USB port {port} powered {}", if on { "on" } else { "off" });
    }
    Ok(())
}
