//! ANT+ bicycle power (device type 11), standard power-only page.

use tartan_bitfield::bitfield;

use crate::{avec::FromReading, sans::layout::Field};

pub const DEVICE_TYPE: u8 = 11;

/// The standard power-only main data page.
pub const POWER_ONLY_PAGE: u8 = 0x10;

pub const EVENT_COUNT: u8 = 0;
pub const PEDAL_POWER: u8 = 1;
pub const CADENCE: u8 = 2;
pub const ACCUMULATED_POWER: u8 = 3;
pub const POWER: u8 = 4;

/// Value marking an unavailable single-byte field.
pub const INVALID: u8 = 0xFF;

pub const POWER_ONLY: &[Field] = &[
    Field::unsigned(1, EVENT_COUNT),
    Field::unsigned(1, PEDAL_POWER),
    Field::unsigned(1, CADENCE),
    Field::unsigned(2, ACCUMULATED_POWER),
    Field::unsigned(2, POWER),
];

/// Select the field schema of a data page, if one is supported.
pub fn schema(page: u8) -> Option<&'static [Field]> {
    match page {
        POWER_ONLY_PAGE => Some(POWER_ONLY),
        _ => None,
    }
}

bitfield! {
    /// The pedal power byte of the power-only page.
    pub struct PedalPower(u8) {
        /// Share of the total power contributed by one pedal, in percent.
        [0..7] pub percent: u8,
        /// Set when `percent` refers to the right pedal.
        [7] pub is_right,
    }
}

/// Accumulated state of a bicycle power sensor.
#[derive(Debug, Default, Clone, PartialEq, FromReading)]
pub struct BicyclePowerState {
    #[field(EVENT_COUNT)]
    pub event_count: Option<u8>,
    #[field(PEDAL_POWER)]
    pub pedal_power: Option<u8>,
    #[field(CADENCE)]
    pub cadence: Option<u8>,
    /// Watts, rolling over at 65536.
    #[field(ACCUMULATED_POWER)]
    pub accumulated_power: Option<u16>,
    /// Watts.
    #[field(POWER)]
    pub power: Option<u16>,
}

impl BicyclePowerState {
    /// The pedal power split, if the sensor measures one.
    pub fn pedal_balance(&self) -> Option<PedalPower> {
        self.pedal_power
            .filter(|&p| p != INVALID)
            .map(PedalPower)
    }

    /// Crank cadence in revolutions per minute, if the sensor measures one.
    pub fn cadence_rpm(&self) -> Option<u8> {
        self.cadence.filter(|&c| c != INVALID)
    }
}
