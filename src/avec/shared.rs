//! Device registry for concurrent hosts.
//!
//! _Requires Cargo feature `std`._

use core::{fmt, hash::Hash};
use std::boxed::Box;

use dashmap::{DashMap, mapref::one::Ref};
use tracing::{debug, trace};

use super::{
    dispatch::{DecodeError, Discriminator, decode},
    registry::Ingest,
    state::{DeviceState, SignalQuality},
};

extern crate std;

type Publish<K> = Box<dyn Fn(&K, &DeviceState) + Send + Sync>;

/// A [`Registry`](super::Registry) that can be shared between threads.
///
/// Frames from different devices are ingested in parallel. Frames for one
/// device are applied in the order their ingest calls take the device's
/// entry. The observer runs after the entry is released, so it may read the
/// registry freely; when one device's frames are ingested from several
/// threads at once, their snapshots can reach the observer out of merge
/// order.
///
/// _Requires Cargo feature `std`._
pub struct SharedRegistry<K> {
    devices: DashMap<K, DeviceState>,
    signal: DashMap<K, SignalQuality>,
    observer: Option<Publish<K>>,
}

/// A read guard on one device's state.
pub type DeviceRef<'a, K> = Ref<'a, K, DeviceState>;

impl<K: Eq + Hash> SharedRegistry<K> {
    pub fn new() -> Self {
        Self {
            devices: DashMap::new(),
            signal: DashMap::new(),
            observer: None,
        }
    }

    /// Create a registry publishing a snapshot of each updated state to
    /// `observer`. No lock is held while it runs.
    pub fn with_observer(observer: impl Fn(&K, &DeviceState) + Send + Sync + 'static) -> Self {
        Self {
            observer: Some(Box::new(observer)),
            ..Self::new()
        }
    }

    /// Read a device's state. The guard blocks writers to the same shard.
    pub fn get(&self, id: &K) -> Option<DeviceRef<'_, K>> {
        self.devices.get(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Stop tracking a device, returning its last state.
    pub fn remove(&self, id: &K) -> Option<DeviceState> {
        let state = self.devices.remove(id).map(|(_, state)| state);
        self.signal.remove(id);
        state
    }

    /// Record the signal quality a scanning transport observed for a device.
    pub fn record_signal(&self, id: K, signal: SignalQuality) {
        self.signal.insert(id, signal);
    }

    pub fn signal(&self, id: &K) -> Option<SignalQuality> {
        self.signal.get(id).map(|s| *s)
    }
}

impl<K: Eq + Hash + Clone + fmt::Debug> SharedRegistry<K> {
    /// Decode a frame and merge it into the state of device `id`.
    ///
    /// Returns a snapshot of the state right after this frame was applied,
    /// the same snapshot the observer receives.
    pub fn ingest(&self, id: K, discriminator: Discriminator, r: &[u8]) -> Ingest<DeviceState> {
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

        let state = {
            let mut entry = self.devices.entry(id.clone()).or_default();
            entry.apply(&decoded.update);
            entry.value().clone()
        };

        if let Some(observer) = &self.observer {
            observer(&id, &state);
        }

        match decoded.truncated {
            None => Ingest::Updated(state),
            Some(truncated) => Ingest::Partial(state, truncated),
        }
    }
}

impl<K: Eq + Hash> Default for SharedRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + fmt::Debug> fmt::Debug for SharedRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("devices", &self.devices)
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}
