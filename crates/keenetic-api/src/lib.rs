// keenetic-api: Async Rust client for the Keenetic router RCI management API

pub mod auth;
pub mod backup;
pub mod client;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod rci;
pub mod transport;

pub use auth::challenge_response;
pub use backup::BackupKind;
pub use client::RouterClient;
pub use decode::{DecodedBody, FailureResponse, parse_assignments};
pub use endpoints::HostAccess;
pub use error::Error;
pub use rci::RciQuery;
pub use transport::{TlsMode, TransportConfig, router_url};
