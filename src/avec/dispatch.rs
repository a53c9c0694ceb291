//! Routing of frames to their decode routine.

use thiserror::Error;

use crate::{
    profile::{
        bicycle_power,
        cycling_power::{self, PowerMeasurement},
        location::{self, SensorLocation},
        stride,
    },
    sans::{
        flags::CapabilitySet,
        layout::{Reading, Truncated, decode_fields},
    },
};

/// ANT+ device profiles with page decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AntProfile {
    StrideSpeedDistance,
    BicyclePower,
}

impl AntProfile {
    /// Look up a profile by the device type of the channel it was received on.
    pub fn from_device_type(device_type: u8) -> Option<Self> {
        match device_type {
            stride::DEVICE_TYPE => Some(Self::StrideSpeedDistance),
            bicycle_power::DEVICE_TYPE => Some(Self::BicyclePower),
            _ => None,
        }
    }

    pub fn device_type(self) -> u8 {
        match self {
            Self::StrideSpeedDistance => stride::DEVICE_TYPE,
            Self::BicyclePower => bicycle_power::DEVICE_TYPE,
        }
    }
}

/// GATT characteristics, as resolved by the transport from their UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    CyclingPowerFeature,
    CyclingPowerMeasurement,
    SensorLocation,
    /// Any characteristic without a decoder, by 16-bit UUID.
    Unknown(u16),
}

impl From<u16> for Characteristic {
    fn from(uuid: u16) -> Self {
        match uuid {
            cycling_power::FEATURE_UUID => Self::CyclingPowerFeature,
            cycling_power::MEASUREMENT_UUID => Self::CyclingPowerMeasurement,
            location::UUID => Self::SensorLocation,
            _ => Self::Unknown(uuid),
        }
    }
}

impl From<Characteristic> for u16 {
    fn from(characteristic: Characteristic) -> Self {
        match characteristic {
            Characteristic::CyclingPowerFeature => cycling_power::FEATURE_UUID,
            Characteristic::CyclingPowerMeasurement => cycling_power::MEASUREMENT_UUID,
            Characteristic::SensorLocation => location::UUID,
            Characteristic::Unknown(uuid) => uuid,
        }
    }
}

/// Selects the decode routine for a frame.
///
/// For ANT+ frames the page number is read from the first payload byte; for
/// GATT frames the characteristic is supplied by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminator {
    Ant(AntProfile),
    Gatt(Characteristic),
}

/// An error decoding a single frame.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame ended before any value could be decoded.
    #[error("Truncated frame: {0}")]
    TruncatedFrame(#[from] Truncated),
    /// No decoder is registered for the page or characteristic.
    #[error("Unknown page or characteristic.")]
    UnknownDiscriminator,
}

/// What one frame contributes to a device's state.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Merged field by field into the stride facet.
    Stride(Reading),
    /// Merged field by field into the bicycle power facet.
    BicyclePower(Reading),
    /// Replaces the reported features.
    Features(CapabilitySet),
    /// Replaces the current measurement.
    Measurement(PowerMeasurement),
    /// Replaces the sensor location.
    Location(SensorLocation),
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub update: Update,
    /// Set if the frame ended early and only its leading values were decoded.
    pub truncated: Option<Truncated>,
}

/// Decode a frame, without touching any device state.
pub fn decode(discriminator: Discriminator, r: &[u8]) -> Result<Decoded, DecodeError> {
    match discriminator {
        Discriminator::Ant(profile) => decode_page(profile, r),
        Discriminator::Gatt(characteristic) => decode_characteristic(characteristic, r),
    }
}

fn decode_page(profile: AntProfile, r: &[u8]) -> Result<Decoded, DecodeError> {
    let &page = r.first().ok_or(Truncated {
        offset: 0,
        width: 1,
        len: r.len(),
    })?;

    let schema = match profile {
        AntProfile::StrideSpeedDistance => stride::schema(page),
        AntProfile::BicyclePower => bicycle_power::schema(page),
    }
    .ok_or(DecodeError::UnknownDiscriminator)?;

    let (reading, end) = decode_fields(r, 1, &CapabilitySet::EMPTY, schema);
    let truncated = partial(&reading, end)?;

    let update = match profile {
        AntProfile::StrideSpeedDistance => Update::Stride(reading),
        AntProfile::BicyclePower => Update::BicyclePower(reading),
    };

    Ok(Decoded { update, truncated })
}

fn decode_characteristic(
    characteristic: Characteristic,
    r: &[u8],
) -> Result<Decoded, DecodeError> {
    let (update, truncated) = match characteristic {
        Characteristic::CyclingPowerFeature => {
            let features = cycling_power::decode_features(r)?;
            (Update::Features(features), None)
        }
        Characteristic::CyclingPowerMeasurement => {
            let (flags, reading, end) = cycling_power::decode_measurement(r)?;
            let truncated = partial(&reading, end)?;
            let measurement = PowerMeasurement::new(flags, &reading);
            (Update::Measurement(measurement), truncated)
        }
        Characteristic::SensorLocation => {
            let location = location::decode_location(r)?;
            (Update::Location(location), None)
        }
        Characteristic::Unknown(_) => Err(DecodeError::UnknownDiscriminator)?,
    };

    Ok(Decoded { update, truncated })
}

/// Separate a usable partial reading from one that decoded nothing.
fn partial(reading: &Reading, end: Result<usize, Truncated>) -> Result<Option<Truncated>, Truncated> {
    match end {
        Ok(_) => Ok(None),
        Err(truncated) if reading.is_empty() => Err(truncated),
        Err(truncated) => Ok(Some(truncated)),
    }
}
