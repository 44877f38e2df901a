//! Firmware status, update and release notes.

use serde_json::Value;

use keenetic_core::{Command as CoreCommand, Controller, FirmwareStatus};

use crate::cli::{FirmwareArgs, FirmwareCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(f: &FirmwareStatus) -> String {
    output::detail_lines(&[
        ("Installed", util::or_dash(f.installed.as_deref())),
        ("Available", util::or_dash(f.available.as_deref())),
        ("Channel", util::or_dash(f.sandbox.as_deref())),
        ("Title", util::or_dash(f.title.as_deref())),
        ("Update", util::yes_no(f.update_available)),
    ])
}

/// Release notes arrive either as plain text or as an object with a
/// text-ish member; anything else is shown as JSON.
fn notes_text(notes: &Value) -> Option<String> {
    match notes {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => ["content", "text", "notes", "body"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_owned),
        _ => None,
    }
}

pub async fn handle(
    controller: &Controller,
    args: FirmwareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FirmwareCommand::Show => {
            let status = match controller.firmware() {
                Some(status) => status,
                None => controller.firmware_refresh().await?,
            };
            let out = output::render_single(&global.output, status.as_ref(), detail, |f| {
                util::or_dash(f.installed.as_deref())
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FirmwareCommand::Update => {
            let status = controller.firmware_refresh().await?;
            if !status.update_available {
                if !global.quiet {
                    eprintln!(
                        "Firmware {} is up to date",
                        util::or_dash(status.installed.as_deref())
                    );
                }
                return Ok(());
            }
            let target = util::or_dash(status.available.as_deref());
            if !util::confirm(
                &format!("Install firmware {target}? The router will reboot."),
                "firmware update",
                global.yes,
            )? {
                return Ok(());
            }
            controller.execute(CoreCommand::UpdateFirmware).await?;
            if !global.quiet {
                eprintln!("Firmware update to {target} started");
            }
            Ok(())
        }

        FirmwareCommand::Notes => {
            let notes = controller.release_notes().await?;
            let out = match (&global.output, notes_text(&notes)) {
                (OutputFormat::Table | OutputFormat::Plain, Some(text)) => text,
                _ => output::render_single(
                    &global.output,
                    &notes,
                    |v| serde_json::to_string_pretty(v).unwrap_or_default(),
                    ToString::to_string,
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
