//! Clap derive structures for the `keenetic` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keenetic_core::BackupKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// keenetic -- command-line management for Keenetic routers
#[derive(Debug, Parser)]
#[command(
    name = "keenetic",
    version,
    about = "Manage Keenetic routers from the command line",
    long_about = "Query and control Keenetic routers through the RCI management API.\n\n\
        Reads come from one batched snapshot per invocation; writes are\n\
        saved to the startup configuration.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "KEENETIC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router address (overrides profile)
    #[arg(long, env = "KEENETIC_HOST", global = true)]
    pub host: Option<String>,

    /// Web management port (overrides profile)
    #[arg(long, env = "KEENETIC_PORT", global = true)]
    pub port: Option<u16>,

    /// Connect over HTTPS
    #[arg(long, global = true)]
    pub ssl: bool,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', env = "KEENETIC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KEENETIC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "KEENETIC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "KEENETIC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the router sensor readings (CPU, memory, WAN address, ...)
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Show router identity and system information
    #[command(alias = "sys")]
    System,

    /// List connected hosts
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Inspect and toggle interfaces
    #[command(alias = "if")]
    Interfaces(InterfacesArgs),

    /// Enable or disable port-forwarding rules
    #[command(alias = "pf")]
    PortForwarding(PortForwardingArgs),

    /// Switch USB port power
    Usb(UsbArgs),

    /// Open or close the web configurator to the internet
    WebAccess(WebAccessArgs),

    /// Wi-Fi access points and QR payloads
    #[command(alias = "w")]
    Wifi(WifiArgs),

    /// Assign access policies to hosts
    Policy(PolicyArgs),

    /// Firmware status, updates and release notes
    #[command(alias = "fw")]
    Firmware(FirmwareArgs),

    /// Reboot the router
    Reboot,

    /// Download firmware and/or configuration backups
    Backup(BackupArgs),

    /// Send a raw request to any management endpoint
    Request(RequestArgs),

    /// Poll continuously and print every published snapshot
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Also show counters for the priority interfaces
    #[arg(long, short = 'i')]
    pub interfaces: bool,

    /// Only show these fields (e.g. cpuload, wan_ip_adress)
    #[arg(long, short = 'f', value_delimiter = ',')]
    pub fields: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List known hosts
    #[command(alias = "ls")]
    List {
        /// Only hosts that are currently active
        #[arg(long, short = 'a')]
        active: bool,
    },

    /// Show one host
    Get {
        /// Host MAC address
        mac: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTERFACES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List interfaces
    #[command(alias = "ls")]
    List,

    /// Show one interface
    Get {
        /// Interface id (e.g. GigabitEthernet1, Wireguard0)
        id: String,
    },

    /// Bring an interface up
    Up {
        /// Interface id
        id: String,
    },

    /// Bring an interface down
    Down {
        /// Interface id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PORT FORWARDING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PortForwardingArgs {
    #[command(subcommand)]
    pub command: PortForwardingCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortForwardingCommand {
    /// List port-forwarding rules
    #[command(alias = "ls")]
    List,

    /// Enable a rule
    Enable {
        /// Rule index
        index: String,
    },

    /// Disable a rule
    Disable {
        /// Rule index
        index: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USB
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsbArgs {
    #[command(subcommand)]
    pub command: UsbCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsbCommand {
    /// List USB ports and their power state
    #[command(alias = "ls")]
    List,

    /// Power a port on
    On {
        /// Port number (from 1)
        port: u32,
    },

    /// Power a port off
    Off {
        /// Port number (from 1)
        port: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WEB ACCESS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WebAccessArgs {
    #[command(subcommand)]
    pub command: WebAccessCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebAccessCommand {
    /// Allow access from the internet
    On,
    /// Restrict access to the home network
    Off,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WIFI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WifiArgs {
    #[command(subcommand)]
    pub command: WifiCommand,
}

#[derive(Debug, Subcommand)]
pub enum WifiCommand {
    /// List access points
    #[command(alias = "ls")]
    List {
        /// Include passwords in the output
        #[arg(long)]
        show_passwords: bool,
    },

    /// Print the Wi-Fi QR payload for an access point
    Qr {
        /// Access point interface id (e.g. WifiMaster0/AccessPoint0)
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POLICY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommand,
}

#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// List available policies and host assignments
    #[command(alias = "ls")]
    List,

    /// Assign a policy to a host
    Set {
        /// Host MAC address
        mac: String,

        /// `default`, `not_internet`, or a named policy (e.g. Policy0)
        policy: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FIRMWARE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    #[command(subcommand)]
    pub command: FirmwareCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirmwareCommand {
    /// Installed and available versions
    Show,
    /// Install the available update (the router reboots)
    Update,
    /// Release notes for the available version
    Notes,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BACKUP / REQUEST / WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Destination folder
    #[arg(long, short = 'd', default_value = ".")]
    pub folder: PathBuf,

    /// What to back up (defaults to the profile's backup_types)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub kinds: Vec<BackupKind>,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Endpoint path (e.g. /rci/show/version)
    pub endpoint: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(long, short = 'd', conflicts_with = "from_file")]
    pub data: Option<String>,

    /// Read the JSON request body from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period in seconds (overrides profile scan_interval)
    #[arg(long, short = 'n')]
    pub interval: Option<u64>,

    /// Stop after this many snapshots
    #[arg(long, short = 'c')]
    pub count: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g. host, port, scan_interval, backup_types)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
