//! Backend device library abstractions.
//!
//! # Module Structure
//!
//! - `types` - Status shapes and events reported by devices
//! - `traits` - One control trait per backend library, plus the common [`Device`] identity

pub mod traits;
pub mod types;

pub use traits::{AirPlayDevice, ChromecastDevice, Device, DlnaDevice};
pub use types::{
    AirPlayPlaybackInfo, ChromecastStatus, ChromecastVolume, DeviceEvent, DeviceSummary,
    DlnaStatus, MediaRequest, PlayerState,
};
