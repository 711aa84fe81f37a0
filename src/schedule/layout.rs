use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{BatchId, BatchSlot, DeviceId};

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("No accelerator devices found")]
    NoDevices,

    #[error("At least one accelerator batch is required")]
    NoBatches,
}

/// Assignment of batch units to accelerator devices.
///
/// Batches are binned round-robin (`batch i -> device i % devices`) and then
/// numbered device by device, so all of device 0's batches come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLayout {
    pub devices: usize,
    pub slots: Vec<BatchSlot>,
}

impl DeviceLayout {
    /// # Errors
    ///
    /// Returns `LayoutError::NoDevices` when `devices` is zero and
    /// `LayoutError::NoBatches` when `batches` is zero.
    pub fn round_robin(batches: usize, devices: usize) -> Result<Self, LayoutError> {
        if devices == 0 {
            return Err(LayoutError::NoDevices);
        }
        if batches == 0 {
            return Err(LayoutError::NoBatches);
        }

        let mut per_device = vec![0usize; devices];
        for i in 0..batches {
            per_device[i % devices] += 1;
        }

        let mut slots = Vec::with_capacity(batches);
        for (device, &count) in per_device.iter().enumerate() {
            for _ in 0..count {
                #[allow(clippy::cast_possible_truncation)] // bounded by configured batch count
                slots.push(BatchSlot {
                    id: BatchId(slots.len() as u32),
                    device: DeviceId(device as u32),
                });
            }
        }

        Ok(Self { devices, slots })
    }

    /// Number of batches placed on `device`
    #[must_use]
    pub fn batches_on(&self, device: DeviceId) -> usize {
        self.slots.iter().filter(|s| s.device == device).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_bins_per_device() {
        let layout = DeviceLayout::round_robin(5, 2).unwrap();
        assert_eq!(layout.batches_on(DeviceId(0)), 3);
        assert_eq!(layout.batches_on(DeviceId(1)), 2);

        let devices: Vec<u32> = layout.slots.iter().map(|s| s.device.0).collect();
        assert_eq!(devices, vec![0, 0, 0, 1, 1]);
        let ids: Vec<u32> = layout.slots.iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_more_devices_than_batches() {
        let layout = DeviceLayout::round_robin(2, 4).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.batches_on(DeviceId(3)), 0);
    }

    #[test]
    fn test_no_devices_is_fatal() {
        assert!(matches!(
            DeviceLayout::round_robin(4, 0),
            Err(LayoutError::NoDevices)
        ));
        assert!(matches!(
            DeviceLayout::round_robin(0, 1),
            Err(LayoutError::NoBatches)
        ));
    }
}
