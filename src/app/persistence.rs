//! Calibration persistence on top of [`StoragePort`].
//!
//! Readings are stored as a postcard blob under `soilsense/calib`.

use crate::fsm::context::CalibrationReadings;

use super::ports::{StorageError, StoragePort};

pub const CALIBRATION_NAMESPACE: &str = "soilsense";
pub const CALIBRATION_KEY: &str = "calib";

/// Postcard varint encoding of two `u16`s never exceeds 6 bytes.
const BLOB_CAP: usize = 8;

/// Load the last persisted readings.
pub fn load_readings(storage: &impl StoragePort) -> Result<CalibrationReadings, StorageError> {
    let mut buf = [0u8; BLOB_CAP];
    let len = storage.read(CALIBRATION_NAMESPACE, CALIBRATION_KEY, &mut buf)?;
    postcard::from_bytes(&buf[..len]).map_err(|_| StorageError::Corrupted)
}

/// Load the persisted readings, falling back to zeroes when nothing usable is
/// stored.
pub fn load_readings_or_default(storage: &impl StoragePort) -> CalibrationReadings {
    match load_readings(storage) {
        Ok(r) => {
            log::info!("Calibration restored: dry={} wet={}", r.dry, r.wet);
            r
        }
        Err(StorageError::NotFound) => {
            log::info!("No stored calibration, starting from zero");
            CalibrationReadings::default()
        }
        Err(e) => {
            log::warn!("Stored calibration unreadable ({}), starting from zero", e);
            CalibrationReadings::default()
        }
    }
}

pub fn save_readings(
    storage: &mut impl StoragePort,
    readings: &CalibrationReadings,
) -> Result<(), StorageError> {
    let mut buf = [0u8; BLOB_CAP];
    let used = postcard::to_slice(readings, &mut buf).map_err(|_| StorageError::IoError)?;
    storage.write(CALIBRATION_NAMESPACE, CALIBRATION_KEY, used)
}
