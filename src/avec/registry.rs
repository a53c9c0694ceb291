//! Single-owner device registry.

use alloc::collections::BTreeMap;
use core::fmt::Debug;

use tracing::{debug, trace};

use crate::sans::layout::Truncated;

use super::{
    dispatch::{DecodeError, Discriminator, decode},
    state::{DeviceState, SignalQuality},
};

/// Receive device state after each decoded frame.
pub trait Observer<K> {
    fn publish(&mut self, id: &K, state: &DeviceState);
}

impl<K, F: FnMut(&K, &DeviceState)> Observer<K> for F {
    fn publish(&mut self, id: &K, state: &DeviceState) {
        self(id, state)
    }
}

/// An observer discarding every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl<K> Observer<K> for Silent {
    fn publish(&mut self, _: &K, _: &DeviceState) {}
}

/// The outcome of ingesting one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest<S> {
    /// The frame was decoded in full and merged.
    Updated(S),
    /// The frame ended early. The values before the cut were merged.
    Partial(S, Truncated),
    /// No decoder is registered for the frame. Nothing changed.
    Ignored,
    /// The frame ended before any value. Nothing changed.
    Rejected(Truncated),
}

impl<S> Ingest<S> {
    /// The updated state, if the frame changed it.
    pub fn state(self) -> Option<S> {
        match self {
            Self::Updated(s) | Self::Partial(s, _) => Some(s),
            Self::Ignored | Self::Rejected(_) => None,
        }
    }
}

/// Decoded state of every device seen, keyed by a caller-chosen identifier.
///
/// A device is tracked from the first frame that decodes to at least one
/// value. The registry never evicts devices on its own; see
/// [`Registry::remove`].
#[derive(Debug)]
pub struct Registry<K, O = Silent> {
    devices: BTreeMap<K, DeviceState>,
    signal: BTreeMap<K, SignalQuality>,
    observer: O,
}

impl<K: Ord> Registry<K> {
    pub fn new() -> Self {
        Self::with_observer(Silent)
    }
}

impl<K: Ord> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, O> Registry<K, O> {
    /// Create a registry publishing updated state to `observer`.
    pub fn with_observer(observer: O) -> Self {
        Self {
            devices: BTreeMap::new(),
            signal: BTreeMap::new(),
            observer,
        }
    }

    pub fn get(&self, id: &K) -> Option<&DeviceState> {
        self.devices.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &DeviceState)> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Stop tracking a device, returning its last state.
    pub fn remove(&mut self, id: &K) -> Option<DeviceState> {
        let state = self.devices.remove(id);
        self.signal.remove(id);
        state
    }

    /// Record the signal quality a scanning transport observed for a device.
    pub fn record_signal(&mut self, id: K, signal: SignalQuality) {
        self.signal.insert(id, signal);
    }

    pub fn signal(&self, id: &K) -> Option<&SignalQuality> {
        self.signal.get(id)
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<K: Ord + Clone + Debug, O: Observer<K>> Registry<K, O> {
    /// Decode a frame and merge it into the state of device `id`.
    ///
    /// The observer is called once if the state changed, and not at all
    /// otherwise.
    pub fn ingest(&mut self, id: K, discriminator: Discriminator, r: &[u8]) -> Ingest<&DeviceState> {
        let decoded = match decode(discriminator, r) {
            Ok(decoded) => decoded,
            Err(DecodeError::UnknownDiscriminator) => {
                trace!(?id, ?discriminator, "no decoder for frame");
                return Ingest::Ignored;
            }
            Err(DecodeError::TruncatedFrame(truncated)) => {
                debug!(?id, ?discriminator, %truncated, "dropped truncated frame");
                return Ingest::Rejected(truncated);
            }
        };

        if let Some(truncated) = &decoded.truncated {
            debug!(?id, ?discriminator, %truncated, "merging partial frame");
        }

        let state = self.devices.entry(id.clone()).or_default();
        state.apply(&decoded.update);
        self.observer.publish(&id, state);

        let state = &*state;

        match decoded.truncated {
            None => Ingest::Updated(state),
            Some(truncated) => Ingest::Partial(state, truncated),
        }
    }
}
