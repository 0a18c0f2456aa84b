//! Centralized error types for the CastLink core library.
//!
//! Two families of errors exist:
//! - [`DeviceError`] is what a backend device library reports for a single
//!   request (connect, command, status). These never reach the UI layer; the
//!   control plane either logs them or demotes playback to local.
//! - [`CastError`] is a usage error returned synchronously to the caller of the
//!   control API. It never mutates state and is never written to the error log.

use serde::Serialize;
use thiserror::Error;

use crate::state::{Backend, Location};

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

/// Errors reported by a backend device library.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The request could not be delivered or the device replied with an error object.
    #[error("{0}")]
    Transport(String),

    /// The device answered with a non-success status code.
    #[error("device rejected request with status {status}")]
    Rejected {
        /// Status code returned by the device.
        status: u16,
    },

    /// The control channel to the device is closed.
    #[error("connection closed")]
    Closed,
}

impl ErrorCode for DeviceError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "device_transport_error",
            Self::Rejected { .. } => "device_rejected",
            Self::Closed => "device_closed",
        }
    }
}

/// Convenient Result alias for device library operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Usage errors returned by the cast control API.
#[derive(Debug, Error, Serialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CastError {
    /// `open` was called while a remote connection is pending or established.
    #[error("You can't connect to {requested} when already connected to another device ({current})")]
    AlreadyConnected {
        /// Backend the caller asked for.
        requested: Backend,
        /// Location that was active at the time of the call.
        current: Location,
    },

    /// The backend's registry has no devices yet.
    #[error("No {0} devices available")]
    NoDevices(Backend),

    /// `select_device` was called without a menu from a preceding `open`.
    #[error("No device menu is open")]
    NoMenu,

    /// The selected index is outside the menu snapshot.
    #[error("Device index {index} is out of range ({available} devices in menu)")]
    InvalidSelection {
        /// Requested menu index.
        index: usize,
        /// Number of entries in the menu.
        available: usize,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ErrorCode for CastError {
    fn code(&self) -> &'static str {
        match self {
            Self::AlreadyConnected { .. } => "already_connected",
            Self::NoDevices(_) => "no_devices",
            Self::NoMenu => "no_menu",
            Self::InvalidSelection { .. } => "invalid_selection",
            Self::Configuration(_) => "configuration_error",
        }
    }
}

/// Convenient Result alias for control API operations.
pub type CastResult<T> = Result<T, CastError>;
