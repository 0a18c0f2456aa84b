//! Per-backend device registry.
//!
//! The registry only grows. Discovery libraries do not report devices going
//! away, and the device menu hands out indexes into registry snapshots, so an
//! index taken from a snapshot stays valid for as long as the process runs.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::devices::{Device, DeviceSummary};

/// Append-only list of devices announced by one discovery source.
pub struct DeviceRegistry<D: ?Sized> {
    devices: RwLock<Vec<Arc<D>>>,
}

impl<D: ?Sized> Default for DeviceRegistry<D> {
    fn default() -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
        }
    }
}

impl<D: Device + ?Sized> DeviceRegistry<D> {
    /// Appends a device and returns the registry size afterwards.
    ///
    /// A device announced twice (same `Arc`) is kept once.
    pub fn add(&self, device: Arc<D>) -> usize {
        let mut devices = self.devices.write();
        if !devices.iter().any(|known| Arc::ptr_eq(known, &device)) {
            devices.push(device);
        }
        devices.len()
    }

    /// Snapshot of the known devices. Callers get shared handles; the registry
    /// itself is never modified through them.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<D>> {
        self.devices.read().clone()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Arc<D>> {
        self.devices.read().get(index).cloned()
    }

    #[must_use]
    pub fn summaries(&self) -> Vec<DeviceSummary> {
        self.devices.read().iter().map(|d| d.summary()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}
