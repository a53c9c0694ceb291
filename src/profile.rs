//! Flag and field schemas for the supported device profiles.
//!
//! Each profile module holds the wire tables for its messages, the slot
//! numbers its readings use, and the state record its readings merge into.
//! Bit positions, field widths and scale divisors follow the published ANT+
//! device profiles and Bluetooth SIG characteristic definitions.

pub mod bicycle_power;
pub mod cycling_power;
pub mod location;
pub mod stride;
