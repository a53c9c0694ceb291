#![no_std]

//! A decoding engine for ANT+ data pages and Bluetooth cycling sensor
//! characteristics.
//!
//! Chainring turns raw payloads, already lifted out of their transport frame,
//! into typed readings and merges them into per-device state. It never talks
//! to a radio: channel management, GATT discovery and notification plumbing
//! stay with the caller.
//!
//! Most users should begin with the [`avec::Registry`], feeding it
//! `(device, discriminator, payload)` tuples as they arrive. The schema-driven
//! engine underneath is exposed in the [`sans`] module, and the field tables
//! for each supported profile in the [`profile`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable the lock-sharded [`avec::shared::SharedRegistry`] (default).

extern crate alloc;

pub mod avec;
pub mod profile;
pub mod sans;
