//! Interface command handlers.

use tabled::Tabled;

use keenetic_core::{Command as CoreCommand, Controller, Interface};

use crate::cli::{GlobalOpts, InterfacesArgs, InterfacesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl InterfaceRow {
    fn new(i: &Interface, color: bool) -> Self {
        Self {
            id: i.id.clone(),
            name: i.name.clone(),
            kind: util::or_dash(i.kind.as_deref()),
            state: output::paint_state(&util::or_dash(i.state.as_deref()), color),
            connected: output::paint_state(&util::or_dash(i.connected.as_deref()), color),
            address: util::or_dash(i.address.as_deref()),
        }
    }
}

fn detail(i: &Interface) -> String {
    let mut pairs = vec![
        ("ID", i.id.clone()),
        ("Name", i.name.clone()),
        ("Type", util::or_dash(i.kind.as_deref())),
        ("Description", util::or_dash(i.description.as_deref())),
        ("State", util::or_dash(i.state.as_deref())),
        ("Link", util::or_dash(i.link.as_deref())),
        ("Connected", util::or_dash(i.connected.as_deref())),
        ("Address", util::or_dash(i.address.as_deref())),
        ("Mask", util::or_dash(i.mask.as_deref())),
        ("Uptime", util::uptime(i.uptime)),
    ];
    if let Some(temp) = i.temperature {
        pairs.push(("Temperature", format!("{temp:.0} °C")));
    }
    if let Some(ref remote) = i.wireguard_remote {
        pairs.push(("Peer", remote.clone()));
    }
    if !i.usedby.is_empty() {
        pairs.push(("Used by", i.usedby.join(", ")));
    }
    output::detail_lines(&pairs)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InterfacesCommand::List => {
            let snap = util::snapshot(controller)?;
            let color = output::should_color(&global.color);
            let interfaces: Vec<&Interface> = snap.interfaces.values().collect();
            let out = output::render_list(
                &global.output,
                &interfaces,
                |i| InterfaceRow::new(i, color),
                |i| i.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Get { id } => {
            let snap = util::snapshot(controller)?;
            let iface = snap.interface(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "Interface".into(),
                identifier: id.clone(),
                list_command: "interfaces list".into(),
            })?;
            let out = output::render_single(&global.output, iface, detail, |i| i.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Up { id } => set_state(controller, id, true, global).await,
        InterfacesCommand::Down { id } => set_state(controller, id, false, global).await,
    }
}

async fn set_state(
    controller: &Controller,
    id: String,
    up: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller
        .execute(CoreCommand::SetInterface { id: id.clone(), up })
        .await?;
    if !global.quiet {
        let state = if up { "up" } else { "down" };
        eprintln!("Interface {id} {state}");
    }
    Ok(())
}
