//! Decoding of field sequences against a field schema.

use core::fmt;

use thiserror::Error;

use super::{
    flags::{CapabilitySet, Flag},
    units::{self, ByteOrder},
};

/// Number of value slots in a [`Reading`].
pub const SLOTS: usize = 16;

/// How the bytes of a field are turned into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// An unsigned integer.
    Unsigned,
    /// A two's complement integer.
    Signed,
    /// Two unsigned sub-fields of `bits` bits each, sharing one read. The low
    /// bits go to the field's slot, the next `bits` to slot `high`.
    Split { bits: u8, high: u8 },
    /// Bytes the profile reserves. They are consumed without producing a value.
    Reserved,
}

/// A field descriptor: one entry of a field schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    gate: Option<Flag>,
    width: u8,
    order: ByteOrder,
    encoding: Encoding,
    divisor: f64,
    slot: u8,
}

impl Field {
    const fn new(width: u8, encoding: Encoding, slot: u8) -> Self {
        Self {
            gate: None,
            width,
            order: ByteOrder::Little,
            encoding,
            divisor: 1.0,
            slot,
        }
    }

    /// An unsigned integer of `width` bytes, stored in `slot`.
    pub const fn unsigned(width: u8, slot: u8) -> Self {
        Self::new(width, Encoding::Unsigned, slot)
    }

    /// A two's complement integer of `width` bytes, stored in `slot`.
    pub const fn signed(width: u8, slot: u8) -> Self {
        Self::new(width, Encoding::Signed, slot)
    }

    /// Two `bits`-wide sub-fields packed into `width` bytes, low part first.
    pub const fn split(width: u8, bits: u8, low: u8, high: u8) -> Self {
        Self::new(width, Encoding::Split { bits, high }, low)
    }

    /// `width` reserved bytes.
    pub const fn reserved(width: u8) -> Self {
        Self::new(width, Encoding::Reserved, 0)
    }

    /// Gate this field on `flag`: it is only present when the flag is set.
    pub const fn when(mut self, flag: Flag) -> Self {
        self.gate = Some(flag);
        self
    }

    /// Divide decoded values by `divisor` to reach the physical unit.
    pub const fn scaled(mut self, divisor: f64) -> Self {
        self.divisor = divisor;
        self
    }

    pub const fn big_endian(mut self) -> Self {
        self.order = ByteOrder::Big;
        self
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    pub const fn gate(&self) -> Option<Flag> {
        self.gate
    }

    /// Whether this field is present under `capabilities`.
    pub fn is_present(&self, capabilities: &CapabilitySet) -> bool {
        self.gate.is_none_or(|flag| capabilities.contains(flag))
    }
}

/// Decoding stopped because the frame ended inside a field.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Frame of {len} bytes ended before the {width}-byte field at offset {offset}.")]
pub struct Truncated {
    pub offset: usize,
    pub width: u8,
    pub len: usize,
}

/// The values one frame contributed, by slot.
///
/// An absent slot is `None`; a slot decoded as zero is `Some(0.0)`.
#[derive(Clone, Copy, PartialEq)]
pub struct Reading {
    values: [Option<f64>; SLOTS],
}

impl Reading {
    /// A reading with every slot absent.
    pub const fn absent() -> Self {
        Self {
            values: [None; SLOTS],
        }
    }

    pub fn get(&self, slot: u8) -> Option<f64> {
        self.values.get(slot as usize).copied().flatten()
    }

    /// Whether no slot holds a value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Iterate over the slots holding a value.
    pub fn present(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.map(|v| (slot as u8, v)))
    }

    fn set(&mut self, slot: u8, value: f64) {
        debug_assert!((slot as usize) < SLOTS, "slot {slot} out of range");

        if let Some(v) = self.values.get_mut(slot as usize) {
            *v = Some(value);
        }
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::absent()
    }
}

impl fmt::Debug for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.present()).finish()
    }
}

/// Decode the fields of `schema` from `r`, beginning at offset `start`.
///
/// Returns the reading, and either the offset just past the last present
/// field or the point at which the frame ran out. A truncated reading keeps
/// every value decoded before the cut.
pub fn decode_fields(
    r: &[u8],
    start: usize,
    capabilities: &CapabilitySet,
    schema: &[Field],
) -> (Reading, Result<usize, Truncated>) {
    let mut reading = Reading::absent();
    let mut i = start;

    for field in schema.iter().filter(|f| f.is_present(capabilities)) {
        let Some(raw) = units::read_uint(r, i, field.width, field.order) else {
            let truncated = Truncated {
                offset: i,
                width: field.width,
                len: r.len(),
            };

            return (reading, Err(truncated));
        };

        i += field.width as usize;

        match field.encoding {
            Encoding::Unsigned => reading.set(field.slot, raw as f64 / field.divisor),
            Encoding::Signed => {
                let value = units::sign_extend(raw, field.width);
                reading.set(field.slot, value as f64 / field.divisor);
            }
            Encoding::Split { bits, high } => {
                let bits = bits as u32;
                let low_value = units::bits(raw, 0, bits);
                let high_value = units::bits(raw, bits, bits);

                reading.set(field.slot, low_value as f64 / field.divisor);
                reading.set(high, high_value as f64 / field.divisor);
            }
            Encoding::Reserved => {}
        }
    }

    (reading, Ok(i))
}

/// The offset a complete frame reaches after the fields of `schema`.
pub fn frame_len(capabilities: &CapabilitySet, start: usize, schema: &[Field]) -> usize {
    schema
        .iter()
        .filter(|f| f.is_present(capabilities))
        .fold(start, |i, f| i + f.width as usize)
}
