//! Public web configurator access.

use keenetic_core::{Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, WebAccessArgs, WebAccessCommand};
use crate::error::CliError;

pub async fn handle(
    controller: &Controller,
    args: WebAccessArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let public = matches!(args.command, WebAccessCommand::On);
    if public
        && !super::util::confirm(
            "Expose the web configurator to the internet?",
            "web-access on",
            global.yes,
        )?
    {
        return Ok(());
    }

    controller
        .execute(CoreCommand::SetWebConfiguratorAccess { public })
        .await?;
    if !global.quiet {
        let scope = if public { "the internet" } else { "the home network only" };
        eprintln!("Web configurator reachable from {scope}");
    }
    Ok(())
}
