use chainring::{
    avec::{
        AntProfile, Characteristic, DeviceState, Discriminator, Ingest, Observer, Registry,
        state::SignalQuality,
    },
    profile::location::SensorLocation,
};

const SDM: Discriminator = Discriminator::Ant(AntProfile::StrideSpeedDistance);
const MEASUREMENT: Discriminator = Discriminator::Gatt(Characteristic::CyclingPowerMeasurement);
const LOCATION: Discriminator = Discriminator::Gatt(Characteristic::SensorLocation);

const PAGE_1: [u8; 8] = [0x01, 0x12, 0x34, 0x56, 0x7A, 0x9B, 0x02, 0x05];
const PAGE_2: [u8; 8] = [0x02, 0xFF, 0xFF, 0x5A, 0x3B, 0x80, 0x00, 0x91];

/// Power, crank revolutions and crank event time.
const CRANK_MEASUREMENT: [u8; 8] = [0x20, 0x00, 0x96, 0x00, 0x10, 0x00, 0x00, 0x04];
/// Power and pedal power balance.
const PEDAL_MEASUREMENT: [u8; 5] = [0x01, 0x00, 0xFB, 0xFF, 0xC8];

#[derive(Default)]
struct Log(Vec<(u16, DeviceState)>);

impl Observer<u16> for Log {
    fn publish(&mut self, id: &u16, state: &DeviceState) {
        self.0.push((*id, state.clone()));
    }
}

#[test]
fn publishes_once_per_update() {
    let mut registry = Registry::with_observer(Log::default());

    registry.ingest(1u16, SDM, &PAGE_1);
    registry.ingest(2u16, SDM, &PAGE_2);
    registry.ingest(1u16, SDM, &PAGE_2);

    let log = &registry.observer().0;
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].0, 1);
    assert_eq!(log[1].0, 2);
    assert_eq!(log[2].0, 1);

    assert_eq!(Some(&log[2].1), registry.get(&1));
    assert_eq!(log[2].1.stride.stride_count, Some(2));
    assert_eq!(log[1].1.stride.stride_count, None);
}

#[test]
fn publishes_nothing_without_change() {
    let mut published = 0;
    let mut registry = Registry::with_observer(|_: &u16, _: &DeviceState| published += 1);

    assert_eq!(registry.ingest(1u16, SDM, &[0x50, 0xFF]), Ingest::Ignored);
    assert!(matches!(registry.ingest(1u16, SDM, &[]), Ingest::Rejected(_)));
    assert!(matches!(
        registry.ingest(1u16, MEASUREMENT, &[0x00]),
        Ingest::Rejected(_)
    ));
    assert!(matches!(registry.ingest(1u16, SDM, &PAGE_1[..4]), Ingest::Partial(..)));
    assert!(matches!(registry.ingest(1u16, SDM, &PAGE_1), Ingest::Updated(_)));

    assert_eq!(registry.len(), 1);
    drop(registry);
    assert_eq!(published, 2);
}

#[test]
fn devices_are_independent() {
    let mut registry = Registry::new();

    registry.ingest("left", SDM, &PAGE_1);
    registry.ingest("right", SDM, &PAGE_2);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(&"left").unwrap().stride.cadence_integer, None);
    assert_eq!(registry.get(&"right").unwrap().stride.stride_count, None);

    let ids: Vec<_> = registry.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, ["left", "right"]);
}

#[test]
fn measurement_is_replaced() {
    let mut registry = Registry::new();

    registry.ingest(1u8, MEASUREMENT, &CRANK_MEASUREMENT);
    let state = registry.get(&1).unwrap();
    assert_eq!(state.measurement.power, Some(150));
    assert_eq!(state.measurement.crank_revolutions, Some(16));
    assert_eq!(state.measurement.crank_event_time, Some(1.0));

    let state = registry.ingest(1u8, MEASUREMENT, &PEDAL_MEASUREMENT).state().unwrap();
    assert_eq!(state.measurement.power, Some(-5));
    assert_eq!(state.measurement.pedal_power_balance, Some(100.0));
    assert_eq!(state.measurement.crank_revolutions, None);
}

#[test]
fn facets_accumulate() {
    let mut registry = Registry::new();

    registry.ingest(1u8, LOCATION, &[5]);
    registry.ingest(1u8, SDM, &PAGE_1);
    registry.ingest(1u8, Discriminator::Gatt(Characteristic::CyclingPowerFeature), &[1, 0, 0, 0]);

    let state = registry.get(&1).unwrap();
    assert_eq!(state.location, Some(SensorLocation::LeftCrank));
    assert_eq!(state.stride.stride_count, Some(2));
    assert_eq!(state.features.map(|f| f.bits()), Some(1));
}

#[test]
fn signal_side_records() {
    let mut registry = Registry::new();
    let signal = SignalQuality {
        rssi: -60,
        threshold: -70,
    };

    registry.record_signal(1u8, signal);
    assert_eq!(registry.signal(&1), Some(&signal));
    assert!(registry.get(&1).is_none());

    registry.ingest(1u8, SDM, &PAGE_1);
    assert_eq!(registry.signal(&1), Some(&signal));

    let removed = registry.remove(&1).unwrap();
    assert_eq!(removed.stride.stride_count, Some(2));
    assert_eq!(registry.signal(&1), None);
    assert!(registry.is_empty());
}

#[test]
fn removing_a_signal_only_device() {
    let mut registry = Registry::new();

    registry.record_signal(
        7u8,
        SignalQuality {
            rssi: -80,
            threshold: -90,
        },
    );

    assert!(registry.remove(&7).is_none());
    assert_eq!(registry.signal(&7), None);
    assert!(registry.is_empty());
}

#[cfg(feature = "std")]
mod shared {
    use std::{
        sync::{
            Arc, OnceLock,
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
        thread,
        time::Duration,
    };

    use chainring::avec::{DeviceState, Ingest, SharedRegistry, state::SignalQuality};

    use super::{PAGE_1, PAGE_2, SDM};

    #[test]
    fn ingest_across_threads() {
        let published = Arc::new(AtomicUsize::new(0));
        let counter = published.clone();

        let registry = Arc::new(SharedRegistry::with_observer(
            move |_: &u8, _: &DeviceState| {
                counter.fetch_add(1, Ordering::Relaxed);
            },
        ));

        let handles: Vec<_> = (1..=4u8)
            .map(|id| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        registry.ingest(id, SDM, &PAGE_2);
                        registry.ingest(0, SDM, &PAGE_1);
                        registry.ingest(0, SDM, &[0x50]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(published.load(Ordering::Relaxed), 400);
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get(&0).unwrap().stride.stride_count, Some(2));
        assert_eq!(registry.get(&3).unwrap().stride.cadence_integer, Some(90));
    }

    #[test]
    fn returns_snapshots() {
        let registry = SharedRegistry::new();

        let Ingest::Updated(first) = registry.ingest(1u8, SDM, &PAGE_1) else {
            panic!("expected an update");
        };
        registry.ingest(1u8, SDM, &PAGE_2);

        assert_eq!(first.stride.cadence_integer, None);
        assert_eq!(registry.get(&1).unwrap().stride.cadence_integer, Some(90));
        assert_eq!(registry.ingest(1u8, SDM, &[]).state(), None);

        let signal = SignalQuality {
            rssi: -48,
            threshold: -90,
        };
        registry.record_signal(1, signal);
        assert_eq!(registry.signal(&1), Some(signal));

        assert!(registry.remove(&1).is_some());
        assert_eq!(registry.signal(&1), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn observer_reads_the_registry() {
        static REGISTRY: OnceLock<SharedRegistry<u8>> = OnceLock::new();
        static SEEN: AtomicUsize = AtomicUsize::new(0);

        let registry = REGISTRY.get_or_init(|| {
            SharedRegistry::with_observer(|id: &u8, _: &DeviceState| {
                let Some(registry) = REGISTRY.get() else {
                    return;
                };
                let others = (0..16).filter(|other| other != id);
                let seen = others.filter(|other| registry.get(other).is_some()).count();
                SEEN.store(seen + registry.len(), Ordering::Relaxed);
            })
        });

        for id in 2..16 {
            registry.ingest(id, SDM, &PAGE_2);
        }

        let (done, finished) = mpsc::channel();
        thread::spawn(move || {
            registry.ingest(1, SDM, &PAGE_1);
            registry.ingest(1, SDM, &PAGE_2);
            done.send(()).unwrap();
        });

        finished
            .recv_timeout(Duration::from_secs(5))
            .expect("ingest blocked on its own observer");
        assert_eq!(SEEN.load(Ordering::Relaxed), 14 + 15);
        assert_eq!(registry.get(&1).unwrap().stride.stride_count, Some(2));
    }

    #[test]
    fn removing_a_signal_only_device() {
        let registry = SharedRegistry::<u8>::new();

        registry.record_signal(
            7,
            SignalQuality {
                rssi: -80,
                threshold: -90,
            },
        );

        assert!(registry.remove(&7).is_none());
        assert_eq!(registry.signal(&7), None);
        assert!(registry.is_empty());
    }
}
