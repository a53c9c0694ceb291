//! Bluetooth cycling power service: feature and measurement characteristics.
//!
//! Both characteristics are self-describing. The feature characteristic is a
//! bare capability mask. The measurement characteristic opens with a flag mask
//! that gates every optional field after the mandatory power value, so a
//! notification decodes on its own and replaces the previous one.

use crate::{
    avec::FromReading,
    sans::{
        flags::{CapabilitySet, FlagValue, decode_flags},
        layout::{Field, Reading, Truncated, decode_fields},
        units::{ByteOrder, read_uint},
    },
};

use self::measurement as m;

/// 16-bit UUID of the Cycling Power Feature characteristic.
pub const FEATURE_UUID: u16 = 0x2A65;
/// 16-bit UUID of the Cycling Power Measurement characteristic.
pub const MEASUREMENT_UUID: u16 = 0x2A63;

/// Flags of the Cycling Power Feature characteristic.
pub mod feature {
    use crate::sans::flags::Flag;

    pub const PEDAL_POWER_BALANCE: Flag = Flag::bit(0, "pedal_power_balance");
    pub const ACCUMULATED_TORQUE: Flag = Flag::bit(1, "accumulated_torque");
    pub const WHEEL_REVOLUTION_DATA: Flag = Flag::bit(2, "wheel_revolution_data");
    pub const CRANK_REVOLUTION_DATA: Flag = Flag::bit(3, "crank_revolution_data");
    pub const EXTREME_MAGNITUDES: Flag = Flag::bit(4, "extreme_magnitudes");
    pub const EXTREME_ANGLES: Flag = Flag::bit(5, "extreme_angles");
    pub const DEAD_SPOT_ANGLES: Flag = Flag::bit(6, "dead_spot_angles");
    pub const ACCUMULATED_ENERGY: Flag = Flag::bit(7, "accumulated_energy");
    pub const OFFSET_COMPENSATION_INDICATOR: Flag =
        Flag::bit(8, "offset_compensation_indicator");
    pub const OFFSET_COMPENSATION: Flag = Flag::bit(9, "offset_compensation");
    pub const CONTENT_MASKING: Flag = Flag::bit(10, "content_masking");
    pub const MULTIPLE_SENSOR_LOCATIONS: Flag = Flag::bit(11, "multiple_sensor_locations");
    pub const CRANK_LENGTH_ADJUSTMENT: Flag = Flag::bit(12, "crank_length_adjustment");
    pub const CHAIN_LENGTH_ADJUSTMENT: Flag = Flag::bit(13, "chain_length_adjustment");
    pub const CHAIN_WEIGHT_ADJUSTMENT: Flag = Flag::bit(14, "chain_weight_adjustment");
    pub const SPAN_LENGTH_ADJUSTMENT: Flag = Flag::bit(15, "span_length_adjustment");
    pub const MEASUREMENT_CONTEXT: Flag =
        Flag::select(16, "measurement_context", &["force", "torque"]);
    pub const INSTANTANEOUS_DIRECTION: Flag = Flag::bit(17, "instantaneous_direction");
    pub const FACTORY_CALIBRATION_DATE: Flag = Flag::bit(18, "factory_calibration_date");
    pub const ENHANCED_OFFSET_COMPENSATION: Flag =
        Flag::bit(19, "enhanced_offset_compensation");
    /// Value 3 is reserved.
    pub const DISTRIBUTED_SYSTEM: Flag = Flag::group(
        20,
        2,
        "distributed_system",
        &["unspecified", "not_distributed", "distributed"],
    );

    pub const FLAGS: &[Flag] = &[
        PEDAL_POWER_BALANCE,
        ACCUMULATED_TORQUE,
        WHEEL_REVOLUTION_DATA,
        CRANK_REVOLUTION_DATA,
        EXTREME_MAGNITUDES,
        EXTREME_ANGLES,
        DEAD_SPOT_ANGLES,
        ACCUMULATED_ENERGY,
        OFFSET_COMPENSATION_INDICATOR,
        OFFSET_COMPENSATION,
        CONTENT_MASKING,
        MULTIPLE_SENSOR_LOCATIONS,
        CRANK_LENGTH_ADJUSTMENT,
        CHAIN_LENGTH_ADJUSTMENT,
        CHAIN_WEIGHT_ADJUSTMENT,
        SPAN_LENGTH_ADJUSTMENT,
        MEASUREMENT_CONTEXT,
        INSTANTANEOUS_DIRECTION,
        FACTORY_CALIBRATION_DATE,
        ENHANCED_OFFSET_COMPENSATION,
        DISTRIBUTED_SYSTEM,
    ];
}

/// Flags opening the Cycling Power Measurement characteristic.
pub mod measurement {
    use crate::sans::flags::Flag;

    pub const PEDAL_POWER_PRESENT: Flag = Flag::bit(0, "pedal_power_present");
    /// Set when the pedal power balance refers to the left pedal.
    pub const PEDAL_POWER_BALANCE: Flag = Flag::bit(1, "pedal_power_balance");
    pub const ACCUMULATED_TORQUE_PRESENT: Flag = Flag::bit(2, "accumulated_torque_present");
    pub const TORQUE_SOURCE: Flag = Flag::select(3, "torque_source", &["wheel", "crank"]);
    pub const WHEEL_REVOLUTION_PRESENT: Flag = Flag::bit(4, "wheel_revolution_present");
    pub const CRANK_REVOLUTION_PRESENT: Flag = Flag::bit(5, "crank_revolution_present");
    pub const EXTREME_FORCE_PRESENT: Flag = Flag::bit(6, "extreme_force_present");
    pub const EXTREME_TORQUE_PRESENT: Flag = Flag::bit(7, "extreme_torque_present");
    pub const EXTREME_ANGLES_PRESENT: Flag = Flag::bit(8, "extreme_angles_present");
    pub const TOP_DEAD_SPOT_PRESENT: Flag = Flag::bit(9, "top_dead_spot_present");
    pub const BOTTOM_DEAD_SPOT_PRESENT: Flag = Flag::bit(10, "bottom_dead_spot_present");
    pub const ACCUMULATED_ENERGY_PRESENT: Flag = Flag::bit(11, "accumulated_energy_present");
    pub const OFFSET_COMPENSATION: Flag = Flag::bit(12, "offset_compensation");

    pub const FLAGS: &[Flag] = &[
        PEDAL_POWER_PRESENT,
        PEDAL_POWER_BALANCE,
        ACCUMULATED_TORQUE_PRESENT,
        TORQUE_SOURCE,
        WHEEL_REVOLUTION_PRESENT,
        CRANK_REVOLUTION_PRESENT,
        EXTREME_FORCE_PRESENT,
        EXTREME_TORQUE_PRESENT,
        EXTREME_ANGLES_PRESENT,
        TOP_DEAD_SPOT_PRESENT,
        BOTTOM_DEAD_SPOT_PRESENT,
        ACCUMULATED_ENERGY_PRESENT,
        OFFSET_COMPENSATION,
    ];
}

pub const POWER: u8 = 0;
pub const PEDAL_POWER_BALANCE: u8 = 1;
pub const ACCUMULATED_TORQUE: u8 = 2;
pub const WHEEL_REVOLUTIONS: u8 = 3;
pub const WHEEL_EVENT_TIME: u8 = 4;
pub const CRANK_REVOLUTIONS: u8 = 5;
pub const CRANK_EVENT_TIME: u8 = 6;
pub const MAX_FORCE: u8 = 7;
pub const MIN_FORCE: u8 = 8;
pub const MAX_TORQUE: u8 = 9;
pub const MIN_TORQUE: u8 = 10;
pub const MAX_ANGLE: u8 = 11;
pub const MIN_ANGLE: u8 = 12;
pub const TOP_DEAD_SPOT: u8 = 13;
pub const BOTTOM_DEAD_SPOT: u8 = 14;
pub const ACCUMULATED_ENERGY: u8 = 15;

/// Offset of the first field after the flag mask.
pub const MEASUREMENT_START: usize = 2;

/// Fields of the measurement characteristic, in wire order.
pub const MEASUREMENT: &[Field] = &[
    Field::signed(2, POWER),
    Field::unsigned(1, PEDAL_POWER_BALANCE)
        .when(m::PEDAL_POWER_PRESENT)
        .scaled(2.0),
    Field::unsigned(2, ACCUMULATED_TORQUE)
        .when(m::ACCUMULATED_TORQUE_PRESENT)
        .scaled(2.0),
    Field::unsigned(4, WHEEL_REVOLUTIONS).when(m::WHEEL_REVOLUTION_PRESENT),
    Field::unsigned(2, WHEEL_EVENT_TIME)
        .when(m::WHEEL_REVOLUTION_PRESENT)
        .scaled(2048.0),
    Field::unsigned(2, CRANK_REVOLUTIONS).when(m::CRANK_REVOLUTION_PRESENT),
    Field::unsigned(2, CRANK_EVENT_TIME)
        .when(m::CRANK_REVOLUTION_PRESENT)
        .scaled(1024.0),
    Field::signed(2, MAX_FORCE).when(m::EXTREME_FORCE_PRESENT),
    Field::signed(2, MIN_FORCE).when(m::EXTREME_FORCE_PRESENT),
    Field::signed(2, MAX_TORQUE)
        .when(m::EXTREME_TORQUE_PRESENT)
        .scaled(32.0),
    Field::signed(2, MIN_TORQUE)
        .when(m::EXTREME_TORQUE_PRESENT)
        .scaled(32.0),
    Field::split(3, 12, MAX_ANGLE, MIN_ANGLE).when(m::EXTREME_ANGLES_PRESENT),
    Field::unsigned(2, TOP_DEAD_SPOT).when(m::TOP_DEAD_SPOT_PRESENT),
    Field::unsigned(2, BOTTOM_DEAD_SPOT).when(m::BOTTOM_DEAD_SPOT_PRESENT),
    Field::unsigned(2, ACCUMULATED_ENERGY).when(m::ACCUMULATED_ENERGY_PRESENT),
];

/// Decode the Cycling Power Feature characteristic.
pub fn decode_features(r: &[u8]) -> Result<CapabilitySet, Truncated> {
    let raw = read_uint(r, 0, 4, ByteOrder::Little).ok_or(Truncated {
        offset: 0,
        width: 4,
        len: r.len(),
    })?;

    Ok(decode_flags(raw, feature::FLAGS))
}

/// Decode the Cycling Power Measurement characteristic.
///
/// Fails only if the flag mask itself is cut short. Otherwise returns the
/// measurement flags, the reading, and the outcome of the field walk.
pub fn decode_measurement(
    r: &[u8],
) -> Result<(CapabilitySet, Reading, Result<usize, Truncated>), Truncated> {
    let raw = read_uint(r, 0, 2, ByteOrder::Little).ok_or(Truncated {
        offset: 0,
        width: 2,
        len: r.len(),
    })?;

    let flags = decode_flags(raw, measurement::FLAGS);
    let (reading, end) = decode_fields(r, MEASUREMENT_START, &flags, MEASUREMENT);

    Ok((flags, reading, end))
}

/// One cycling power measurement notification.
///
/// Every field is absent unless the notification's flags gated it in.
#[derive(Debug, Default, Clone, PartialEq, FromReading)]
pub struct PowerMeasurement {
    /// The flags this measurement was decoded with.
    pub flags: CapabilitySet,
    /// Watts.
    #[field(POWER)]
    pub power: Option<i16>,
    /// Percent of the total power, for the pedal the flags name.
    #[field(PEDAL_POWER_BALANCE)]
    pub pedal_power_balance: Option<f64>,
    #[field(ACCUMULATED_TORQUE)]
    pub accumulated_torque: Option<f64>,
    #[field(WHEEL_REVOLUTIONS)]
    pub wheel_revolutions: Option<u32>,
    /// Seconds, rolling over at 32.
    #[field(WHEEL_EVENT_TIME)]
    pub wheel_event_time: Option<f64>,
    #[field(CRANK_REVOLUTIONS)]
    pub crank_revolutions: Option<u16>,
    /// Seconds, rolling over at 64.
    #[field(CRANK_EVENT_TIME)]
    pub crank_event_time: Option<f64>,
    /// Newtons.
    #[field(MAX_FORCE)]
    pub max_force: Option<i16>,
    #[field(MIN_FORCE)]
    pub min_force: Option<i16>,
    /// Newton metres.
    #[field(MAX_TORQUE)]
    pub max_torque: Option<f64>,
    #[field(MIN_TORQUE)]
    pub min_torque: Option<f64>,
    /// Degrees.
    #[field(MAX_ANGLE)]
    pub max_angle: Option<u16>,
    #[field(MIN_ANGLE)]
    pub min_angle: Option<u16>,
    #[field(TOP_DEAD_SPOT)]
    pub top_dead_spot: Option<u16>,
    #[field(BOTTOM_DEAD_SPOT)]
    pub bottom_dead_spot: Option<u16>,
    /// Kilojoules.
    #[field(ACCUMULATED_ENERGY)]
    pub accumulated_energy: Option<u16>,
}

impl PowerMeasurement {
    /// Build a measurement from a decoded reading.
    pub fn new(flags: CapabilitySet, reading: &Reading) -> Self {
        let mut measurement = Self {
            flags,
            ..Default::default()
        };

        crate::avec::merge(&mut measurement, reading);
        measurement
    }

    /// The torque source named by the flags.
    pub fn torque_source(&self) -> Option<&'static str> {
        match self.flags.get(m::TORQUE_SOURCE.name()) {
            Some(FlagValue::Choice { label, .. }) => label,
            _ => None,
        }
    }

    /// Whether the pedal power balance refers to the left pedal.
    pub fn balance_is_left(&self) -> bool {
        self.flags.covers(m::PEDAL_POWER_BALANCE) && self.flags.contains(m::PEDAL_POWER_BALANCE)
    }
}
