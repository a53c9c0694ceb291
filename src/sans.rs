//! Schema-driven decoding engine.
//!
//! This module is intended for applications decoding payloads outside of a
//! [`crate::avec::Registry`], or describing profiles of their own. See
//! [`crate::profile`] for the tables covering the supported profiles.
//!
//! # Architecture
//!
//! A message is described by two tables. A flag schema (a slice of
//! [`flags::Flag`]) names the bits of the capability mask the message carries,
//! if any. A field schema (a slice of [`layout::Field`]) lists every field in
//! wire order, each gated on one of those flags or always present.
//!
//! Decoding first turns the raw mask into a [`flags::CapabilitySet`], then
//! walks the field schema with a cursor, reading only the fields whose gate is
//! set. Values land in numbered slots of a [`layout::Reading`], scaled to
//! physical units.
//!
//! Because the cursor only advances over gated-in fields, the number of bytes
//! a message occupies is a function of its capability set alone. The order of
//! the field schema is the wire order and must be kept field-for-field.

pub mod flags;
pub mod layout;
pub mod units;

pub use flags::decode_flags;
pub use layout::decode_fields;
