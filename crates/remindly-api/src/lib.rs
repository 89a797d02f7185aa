// remindly-api: Async Rust client for the RainSoft Remind cloud API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::AUTH_HEADER;
pub use client::{DEFAULT_BASE_URL, RemindClient};
pub use error::Error;
pub use models::{
    Customer, Dealer, DeviceStatus, DeviceStatusReply, DeviceSummary, Location, LocationList,
};
pub use transport::{TlsMode, TransportConfig};
