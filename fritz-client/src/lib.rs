//! Library for interfacing with the \"AVM Home Automation\" API
//! <https://avm.de/fileadmin/user_upload/Global/Service/Schnittstellen/AHA-HTTP-Interface.pdf>.
//!
//! It is used by the `fritz-adapter` bridge that exposes the smart home
//! devices of a fritz box as typed, observable things.
//!
//! ## Example
//!
//! ### Poll devices and watch for changes
//!
//! ```no_run
//! # fn main() -> fritz_client::Result<()> {
//! let client = fritz_client::FritzClient::login("http://fritz.box", "user", "password")?;
//! let colors = client.get_color_defaults()?;
//!
//! let (tx, rx) = flume::unbounded();
//! let mut broadcaster = fritz_client::DeviceStateBroadcaster::new(tx, colors);
//! broadcaster.update(&client)?;
//!
//! for event in rx.drain() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod api;
mod broadcaster;
mod client;
pub mod devices;
pub mod error;
pub mod features;
pub(crate) mod fritz_xml;
pub mod proxies;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpTransport, Session, Transport};
pub use broadcaster::DeviceStateBroadcaster;
pub use client::{Commands, FritzClient};
pub use devices::{ColorDefaults, DeviceInfo};
pub use error::{FritzError, Result};
pub use features::{FeatureFlag, Features};
pub use proxies::{DeviceEvent, DeviceKind, DeviceProxy, PropertyValue};
