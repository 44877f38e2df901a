//! Host access policy handlers.

use serde::Serialize;
use tabled::Tabled;

use keenetic_core::{Command as CoreCommand, Controller, PolicyChoice};

use crate::cli::{GlobalOpts, PolicyArgs, PolicyCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct Assignment {
    mac: String,
    host: String,
    policy: String,
}

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Policy")]
    policy: String,
}

#[derive(Serialize)]
struct PolicyOverview {
    available: Vec<String>,
    assignments: Vec<Assignment>,
}

fn overview_text(o: &PolicyOverview) -> String {
    let mut choices = vec![
        PolicyChoice::Default.to_string(),
        PolicyChoice::NotInternet.to_string(),
    ];
    choices.extend(o.available.iter().cloned());
    let rows: Vec<AssignmentRow> = o
        .assignments
        .iter()
        .map(|a| AssignmentRow {
            mac: a.mac.clone(),
            host: a.host.clone(),
            policy: a.policy.clone(),
        })
        .collect();
    format!(
        "Policies: {}\n\n{}",
        choices.join(", "),
        tabled::Table::new(rows).with(tabled::settings::Style::rounded())
    )
}

pub async fn handle(controller: &Controller, args: PolicyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PolicyCommand::List => {
            let snap = util::snapshot(controller)?;
            let available = controller.policies().await?;
            let assignments = snap
                .host_policies
                .values()
                .map(|p| Assignment {
                    mac: p.mac.clone(),
                    host: snap
                        .device(&p.mac)
                        .map_or_else(|| "-".into(), |d| d.display_name().to_owned()),
                    policy: p.choice().to_string(),
                })
                .collect();
            let overview = PolicyOverview {
                available,
                assignments,
            };
            let out = output::render_single(&global.output, &overview, overview_text, |o| {
                o.available.join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PolicyCommand::Set { mac, policy } => {
            let Ok(choice) = policy.parse::<PolicyChoice>();
            if let PolicyChoice::Named(ref name) = choice {
                let available = controller.policies().await?;
                if !available.iter().any(|p| p == name) {
                    return Err(CliError::Validation {
                        field: "policy".into(),
                        reason: format!(
                            "unknown policy '{name}'. Available: default, not_internet{}",
                            available.iter().map(|p| format!(", {p}")).collect::<String>()
                        ),
                    });
                }
            }

            controller
                .execute(CoreCommand::SetHostPolicy {
                    mac: mac.clone(),
                    policy: choice.clone(),
                })
                .await?;
            if !global.quiet {
                eprintln!("Host {mac} set to {choice}");
            }
            Ok(())
        }
    }
}
