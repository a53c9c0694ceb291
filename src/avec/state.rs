//! Per-device state records.

use crate::{
    profile::{
        bicycle_power::BicyclePowerState, cycling_power::PowerMeasurement,
        location::SensorLocation, stride::StrideState,
    },
    sans::flags::CapabilitySet,
};

use super::{dispatch::Update, merge};

/// The most recent value of every field observed for one device.
///
/// Page-based facets (`stride`, `bicycle_power`) are merged field by field,
/// so each page only overwrites the fields it carries. The remaining facets
/// come from self-contained characteristics and are replaced whole.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeviceState {
    pub stride: StrideState,
    pub bicycle_power: BicyclePowerState,
    pub features: Option<CapabilitySet>,
    pub measurement: PowerMeasurement,
    pub location: Option<SensorLocation>,
}

impl DeviceState {
    /// Merge the contribution of one frame.
    pub fn apply(&mut self, update: &Update) {
        match update {
            Update::Stride(reading) => merge(&mut self.stride, reading),
            Update::BicyclePower(reading) => merge(&mut self.bicycle_power, reading),
            Update::Features(features) => self.features = Some(*features),
            Update::Measurement(measurement) => self.measurement = measurement.clone(),
            Update::Location(location) => self.location = Some(*location),
        }
    }
}

/// Received signal quality, as reported by a scanning transport.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SignalQuality {
    /// Received signal strength, in dBm.
    pub rssi: i8,
    /// The receiver's proximity threshold, in dBm.
    pub threshold: i8,
}
