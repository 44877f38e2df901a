//! Firmware and configuration backups.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use keenetic_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{BackupArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &Controller, args: BackupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    std::fs::create_dir_all(&args.folder)?;

    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {elapsed}") {
            bar.set_style(style);
        }
        bar.set_message(format!("Downloading backup to {}", args.folder.display()));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    };

    let result = controller
        .execute(CoreCommand::Backup {
            kinds: args.kinds,
            folder: args.folder,
        })
        .await;
    spinner.finish_and_clear();

    if let CommandResult::Files(files) = result? {
        let listing = files
            .iter()
            .map(|f| f.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        output::print_output(&listing, global.quiet);
    }
    Ok(())
}
