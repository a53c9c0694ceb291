//! Bluetooth Sensor Location characteristic.

use thiserror::Error;
use tracing::debug;
use zerocopy::TryFromBytes;

use crate::sans::layout::Truncated;

/// 16-bit UUID of the Sensor Location characteristic.
pub const UUID: u16 = 0x2A5D;

/// Where on the bicycle or body a sensor is mounted.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, TryFromBytes)]
pub enum SensorLocation {
    /// Also used for values outside the defined range.
    #[default]
    Other = 0,
    TopOfShoe = 1,
    InShoe = 2,
    Hip = 3,
    FrontWheel = 4,
    LeftCrank = 5,
    RightCrank = 6,
    LeftPedal = 7,
    RightPedal = 8,
    FrontHub = 9,
    RearDropout = 10,
    Chainstay = 11,
    RearWheel = 12,
    RearHub = 13,
    Chest = 14,
    Spider = 15,
    ChainRing = 16,
}

/// A location byte outside the defined range.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Sensor location {0} is outside the defined range.")]
pub struct OutOfRange(pub u8);

impl TryFrom<u8> for SensorLocation {
    type Error = OutOfRange;

    fn try_from(x: u8) -> Result<Self, Self::Error> {
        let location: Result<Self, _> = zerocopy::try_transmute!(x);
        location.map_err(|_| OutOfRange(x))
    }
}

impl From<SensorLocation> for u8 {
    fn from(location: SensorLocation) -> Self {
        location as u8
    }
}

/// Decode the Sensor Location characteristic.
///
/// Values outside the defined range decode to [`SensorLocation::Other`].
pub fn decode_location(r: &[u8]) -> Result<SensorLocation, Truncated> {
    let &x = r.first().ok_or(Truncated {
        offset: 0,
        width: 1,
        len: r.len(),
    })?;

    Ok(SensorLocation::try_from(x).unwrap_or_else(|OutOfRange(x)| {
        debug!(location = x, "sensor location out of range, using other");
        SensorLocation::Other
    }))
}
