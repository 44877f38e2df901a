//! Port-forwarding rule handlers.

use tabled::Tabled;

use keenetic_core::{Command as CoreCommand, Controller, PortForwardRule};

use crate::cli::{GlobalOpts, PortForwardingArgs, PortForwardingCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "To")]
    to_host: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl RuleRow {
    fn new(r: &PortForwardRule, color: bool) -> Self {
        Self {
            index: r.index.clone(),
            name: r.name.clone(),
            interface: util::or_dash(r.interface.as_deref()),
            protocol: util::or_dash(r.protocol.as_deref()),
            ports: util::or_dash(r.port_range().as_deref()),
            to_host: util::or_dash(r.to_host.as_deref()),
            enabled: output::paint_state(&util::yes_no(r.enabled()), color),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: PortForwardingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (index, enabled) = match args.command {
        PortForwardingCommand::List => {
            let snap = util::snapshot(controller)?;
            let color = output::should_color(&global.color);
            let rules: Vec<&PortForwardRule> = snap.port_forwards.values().collect();
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RuleRow::new(r, color),
                |r| r.index.clone(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        PortForwardingCommand::Enable { index } => (index, true),
        PortForwardingCommand::Disable { index } => (index, false),
    };

    controller
        .execute(CoreCommand::SetPortForwarding {
            index: index.clone(),
            enabled,
        })
        .await?;
    if !global.quiet {
        let state = if enabled { "enabled" } else { "disabled" };
        eprintln!("Rule {index} {state}");
    }
    Ok(())
}
