//! iBeacon advertisement payload parser.
//!
//! Pure functions operating on raw `&[u8]` slices — no BLE dependency
//! needed. iBeacons broadcast inside Apple manufacturer data (company id
//! `0x004C`) with a fixed 23-byte frame:
//!
//! | Offset | Field | Type |
//! |--------|-------|------|
//! | 0 | Frame type | `0x02` |
//! | 1 | Frame length | `0x15` (21) |
//! | 2–17 | Proximity uuid | 16 bytes |
//! | 18–19 | Major | u16 BE |
//! | 20–21 | Minor | u16 BE |
//! | 22 | Calibrated TX power at 1 m | i8 dBm |

use zonekit_domain::beacon::Beacon;

use crate::error::{BleError, PayloadParseError};

/// Apple's Bluetooth SIG company identifier.
pub const APPLE_COMPANY_ID: u16 = 0x004C;

const IBEACON_FRAME_TYPE: u8 = 0x02;
const IBEACON_FRAME_LEN: u8 = 0x15;
const IBEACON_PAYLOAD_LEN: usize = 23;

/// A parsed iBeacon advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconAdvertisement {
    /// The advertised beacon identity.
    pub beacon: Beacon,
    /// Calibrated received power at one meter, in dBm.
    pub tx_power_dbm: i8,
}

/// Parse one manufacturer-data entry into an iBeacon advertisement.
///
/// # Errors
///
/// Returns [`BleError::PayloadParse`] when the company id is not Apple's,
/// the frame is not an iBeacon frame, or the payload length is wrong.
pub fn parse_manufacturer_data(
    company_id: u16,
    data: &[u8],
) -> Result<BeaconAdvertisement, BleError> {
    if company_id != APPLE_COMPANY_ID {
        return Err(BleError::PayloadParse(
            PayloadParseError::UnsupportedManufacturer(company_id),
        ));
    }
    if data.len() != IBEACON_PAYLOAD_LEN {
        return Err(BleError::PayloadParse(PayloadParseError::WrongLength {
            expected: IBEACON_PAYLOAD_LEN,
            actual: data.len(),
        }));
    }
    if data[0] != IBEACON_FRAME_TYPE || data[1] != IBEACON_FRAME_LEN {
        return Err(BleError::PayloadParse(PayloadParseError::NotIBeacon));
    }

    let mut uuid_bytes = [0u8; 16];
    uuid_bytes.copy_from_slice(&data[2..18]);
    let uuid = uuid::Uuid::from_bytes(uuid_bytes);

    let major = u16::from_be_bytes([data[18], data[19]]);
    let minor = u16::from_be_bytes([data[20], data[21]]);
    #[allow(clippy::cast_possible_wrap)]
    let tx_power_dbm = data[22] as i8;

    Ok(BeaconAdvertisement {
        beacon: Beacon::new(uuid, major, minor),
        tx_power_dbm,
    })
}
