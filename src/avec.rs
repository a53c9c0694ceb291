//! Convenience interfaces: dispatch of incoming frames and per-device state.
//!
//! The [`Registry`] routes each frame to the decode routine for its
//! discriminator, merges the result into the state of the device it came from,
//! and publishes the updated state to an [`registry::Observer`]. Threaded
//! hosts can use [`shared::SharedRegistry`] instead.
//!
//! Readings reach state records through the [`FromReading`] trait, which can be
//! derived. See the [`FromReading`](macro@FromReading) macro for details.

pub mod dispatch;
pub mod registry;
#[cfg(feature = "std")]
pub mod shared;
pub mod state;

pub use dispatch::{AntProfile, Characteristic, Discriminator, decode};
pub use registry::{Ingest, Observer, Registry};
#[cfg(feature = "std")]
pub use shared::SharedRegistry;
pub use state::DeviceState;

use crate::sans::layout::Reading;

/// Derive [`FromReading`] for a struct accumulating slot values.
///
/// # Example
///
/// To receive a slot, add the `field(N)` attribute to an `Option<T>` struct
/// field, where `N` is the slot number (an integer literal, or a path to a
/// `u8` constant in scope) and `T` is a numeric primitive. Values are
/// converted with an `as` cast, and later values for the same slot replace
/// earlier ones. A path that does not resolve is a compile error.
///
/// ```
/// #[derive(Debug, Default, FromReading)]
/// struct Wheel {
///     #[field(0)]
///     revolutions: Option<u32>,
///     #[field(EVENT_TIME)]
///     event_time: Option<f64>,
/// }
/// ```
///
/// To decode into arbitrary types, supply an accumulator closure. The second
/// argument must be typed as `f64`.
///
/// ```
/// #[derive(Debug, Default, FromReading)]
/// struct Placement {
///     #[field(0, |v, x: f64| *v = Some(SensorLocation::from(x as u8)))]
///     location: Option<SensorLocation>,
/// }
/// ```
pub use chainring_derive::FromReading;

/// Receive slot values from a reading.
///
/// Only present slots are published; absent slots leave the receiver
/// untouched, which is what carries earlier values forward.
///
/// The default implementation ignores received values.
///
/// See the [`FromReading`](macro@FromReading) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromReading {
    /// Add the value of a slot.
    fn add_value(&mut self, slot: u8, _: f64) {}
}

/// Publish every present slot of `reading` to a receiver.
pub fn merge<O: FromReading + ?Sized>(o: &mut O, reading: &Reading) {
    for (slot, value) in reading.present() {
        o.add_value(slot, value);
    }
}
