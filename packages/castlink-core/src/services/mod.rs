//! Application services layer.
//!
//! These services orchestrate between the public API and the per-backend
//! adapters.

pub mod cast_controller;
pub mod status_poller;

pub use cast_controller::{CastController, CastMenu};
pub use status_poller::StatusPoller;
