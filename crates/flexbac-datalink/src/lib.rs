#![allow(async_fn_in_trait)]

pub mod bip;
pub mod route;
pub mod traits;

pub use bip::transport::BacnetIpTransport;
pub use route::local_ip_for;
pub use traits::{DataLink, DataLinkError};

/// Well-known BACnet/IP UDP port (0xBAC0).
pub const BACNET_IP_DEFAULT_PORT: u16 = 47808;
