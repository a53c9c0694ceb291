//! ANT+ stride-based speed and distance monitor (device type 124).
//!
//! Page 1 carries time, distance, speed and stride count. Pages 2 to 15 carry
//! cadence, speed and the sensor status, and page 3 adds calories. Each page
//! only updates the fields it carries.

use tartan_bitfield::bitfield;

use crate::{
    avec::FromReading,
    sans::{layout::Field, units::fixed_point},
};

pub const DEVICE_TYPE: u8 = 124;

pub const TIME_FRACTIONAL: u8 = 0;
pub const TIME_INTEGER: u8 = 1;
pub const DISTANCE_INTEGER: u8 = 2;
pub const DISTANCE_FRACTIONAL: u8 = 3;
pub const SPEED_INTEGER: u8 = 4;
pub const SPEED_FRACTIONAL: u8 = 5;
pub const STRIDE_COUNT: u8 = 6;
pub const UPDATE_LATENCY: u8 = 7;
pub const CADENCE_INTEGER: u8 = 8;
pub const CADENCE_FRACTIONAL: u8 = 9;
pub const STATUS: u8 = 10;
pub const CALORIES: u8 = 11;

/// Page 1: time, distance, speed and stride count.
pub const BASE_PAGE: &[Field] = &[
    Field::unsigned(1, TIME_FRACTIONAL),
    Field::unsigned(1, TIME_INTEGER),
    Field::unsigned(1, DISTANCE_INTEGER),
    Field::split(1, 4, SPEED_INTEGER, DISTANCE_FRACTIONAL),
    Field::unsigned(1, SPEED_FRACTIONAL),
    Field::unsigned(1, STRIDE_COUNT),
    Field::unsigned(1, UPDATE_LATENCY),
];

/// Pages 2 and 4 to 15: cadence, speed and status.
pub const STATUS_PAGE: &[Field] = &[
    Field::reserved(2),
    Field::unsigned(1, CADENCE_INTEGER),
    Field::split(1, 4, SPEED_INTEGER, CADENCE_FRACTIONAL),
    Field::unsigned(1, SPEED_FRACTIONAL),
    Field::reserved(1),
    Field::unsigned(1, STATUS),
];

/// Page 3: the status page, with calories in place of its reserved byte.
pub const CALORIES_PAGE: &[Field] = &[
    Field::reserved(2),
    Field::unsigned(1, CADENCE_INTEGER),
    Field::split(1, 4, SPEED_INTEGER, CADENCE_FRACTIONAL),
    Field::unsigned(1, SPEED_FRACTIONAL),
    Field::unsigned(1, CALORIES),
    Field::unsigned(1, STATUS),
];

/// Select the field schema of a data page, if the profile defines one.
///
/// Schemas begin at payload offset 1, after the page number.
pub fn schema(page: u8) -> Option<&'static [Field]> {
    match page {
        1 => Some(BASE_PAGE),
        3 => Some(CALORIES_PAGE),
        2..=15 => Some(STATUS_PAGE),
        _ => None,
    }
}

bitfield! {
    /// The sensor status byte of pages 2 to 15.
    pub struct Status(u8) {
        /// 0 inactive, 1 active.
        [0..2] pub use_state: u8,
        /// 0 OK, 1 error, 2 warning.
        [2..4] pub health: u8,
        /// 0 new, 1 good, 2 OK, 3 low.
        [4..6] pub battery: u8,
        /// 0 laces, 1 midsole, 2 other, 3 ankle.
        [6..8] pub location: u8,
    }
}

/// Accumulated state of a stride-based speed and distance monitor.
///
/// Fields hold the raw page values; the accessors combine integer and
/// fractional parts into physical units.
#[derive(Debug, Default, Clone, PartialEq, FromReading)]
pub struct StrideState {
    #[field(TIME_FRACTIONAL)]
    pub time_fractional: Option<u8>,
    #[field(TIME_INTEGER)]
    pub time_integer: Option<u8>,
    #[field(DISTANCE_INTEGER)]
    pub distance_integer: Option<u8>,
    #[field(DISTANCE_FRACTIONAL)]
    pub distance_fractional: Option<u8>,
    #[field(SPEED_INTEGER)]
    pub speed_integer: Option<u8>,
    #[field(SPEED_FRACTIONAL)]
    pub speed_fractional: Option<u8>,
    #[field(STRIDE_COUNT)]
    pub stride_count: Option<u8>,
    #[field(UPDATE_LATENCY)]
    pub update_latency: Option<u8>,
    #[field(CADENCE_INTEGER)]
    pub cadence_integer: Option<u8>,
    #[field(CADENCE_FRACTIONAL)]
    pub cadence_fractional: Option<u8>,
    #[field(STATUS)]
    pub status: Option<u8>,
    #[field(CALORIES)]
    pub calories: Option<u8>,
}

impl StrideState {
    /// Accumulated time in seconds, rolling over at 256.
    pub fn time(&self) -> Option<f64> {
        Some(fixed_point(self.time_integer?, self.time_fractional?, 200.0))
    }

    /// Accumulated distance in metres, rolling over at 256.
    pub fn distance(&self) -> Option<f64> {
        Some(fixed_point(
            self.distance_integer?,
            self.distance_fractional?,
            16.0,
        ))
    }

    /// Instantaneous speed in metres per second.
    pub fn speed(&self) -> Option<f64> {
        Some(fixed_point(self.speed_integer?, self.speed_fractional?, 256.0))
    }

    /// Instantaneous cadence in strides per minute.
    pub fn cadence(&self) -> Option<f64> {
        Some(fixed_point(
            self.cadence_integer?,
            self.cadence_fractional?,
            16.0,
        ))
    }

    /// Time between the last speed/distance computation and the transmission
    /// of page 1, in seconds.
    pub fn latency(&self) -> Option<f64> {
        self.update_latency.map(|l| l as f64 / 32.0)
    }

    pub fn status(&self) -> Option<Status> {
        self.status.map(Status)
    }
}
