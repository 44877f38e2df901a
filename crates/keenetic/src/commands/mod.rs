//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod backup;
pub mod clients;
pub mod config_cmd;
pub mod firmware;
pub mod interfaces;
pub mod policy;
pub mod port_forwarding;
pub mod request;
pub mod status;
pub mod system;
pub mod usb;
pub mod util;
pub mod watch;
pub mod web_access;
pub mod wifi;

use keenetic_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => status::handle(controller, &args, global),
        Command::System => system::handle(controller, global),
        Command::Clients(args) => clients::handle(controller, args, global),
        Command::Interfaces(args) => interfaces::handle(controller, args, global).await,
        Command::PortForwarding(args) => port_forwarding::handle(controller, args, global).await,
        Command::Usb(args) => usb::handle(controller, args, global).await,
        Command::WebAccess(args) => web_access::handle(controller, args, global).await,
        Command::Wifi(args) => wifi::handle(controller, args, global).await,
        Command::Policy(args) => policy::handle(controller, args, global).await,
        Command::Firmware(args) => firmware::handle(controller, args, global).await,
        Command::Reboot => system::reboot(controller, global).await,
        Command::Backup(args) => backup::handle(controller, args, global).await,
        Command::Request(args) => request::handle(controller, args, global).await,
        // Config, Completions and Watch are handled before dispatch
        Command::Config(_) | Command::Completions(_) | Command::Watch(_) => Ok(()),
    }
}
