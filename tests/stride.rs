use csv::ReaderBuilder;

use chainring::{
    avec::{
        AntProfile, Discriminator, FromReading, Ingest, Registry,
        dispatch::{DecodeError, Decoded, Update, decode},
        merge,
    },
    profile::stride::{self, StrideState},
    sans::layout::Truncated,
};

const SDM: Discriminator = Discriminator::Ant(AntProfile::StrideSpeedDistance);

const PAGE_1: [u8; 8] = [0x01, 0x12, 0x34, 0x56, 0x7A, 0x9B, 0x02, 0x05];
const PAGE_2: [u8; 8] = [0x02, 0xFF, 0xFF, 0x5A, 0x3B, 0x80, 0x00, 0x91];

#[test]
fn base_page() {
    let mut registry = Registry::new();
    let state = registry.ingest(1u16, SDM, &PAGE_1).state().unwrap();

    let expected = StrideState {
        time_fractional: Some(0x12),
        time_integer: Some(0x34),
        distance_integer: Some(0x56),
        distance_fractional: Some(7),
        speed_integer: Some(10),
        speed_fractional: Some(0x9B),
        stride_count: Some(2),
        update_latency: Some(5),
        ..Default::default()
    };

    assert_eq!(state.stride, expected);
    assert_eq!(state.stride.distance(), Some(86.4375));
    assert_eq!(state.stride.speed(), Some(10.60546875));
    assert_eq!(state.stride.latency(), Some(0.15625));
    assert!((state.stride.time().unwrap() - 52.09).abs() < 1e-9);
    assert_eq!(state.stride.cadence(), None);
}

#[test]
fn status_page() {
    let mut registry = Registry::new();
    let state = registry.ingest(1u16, SDM, &PAGE_2).state().unwrap();

    assert_eq!(state.stride.cadence_integer, Some(90));
    assert_eq!(state.stride.cadence_fractional, Some(3));
    assert_eq!(state.stride.cadence(), Some(90.1875));
    assert_eq!(state.stride.speed(), Some(11.5));
    assert_eq!(state.stride.calories, None);
    assert_eq!(state.stride.stride_count, None);

    let status = state.stride.status().unwrap();
    assert_eq!(status.use_state(), 1);
    assert_eq!(status.health(), 0);
    assert_eq!(status.battery(), 1);
    assert_eq!(status.location(), 2);
}

#[test]
fn page_carries_earlier_fields_forward() {
    let mut registry = Registry::new();
    registry.ingest(1u16, SDM, &PAGE_1);
    let state = registry.ingest(1u16, SDM, &PAGE_2).state().unwrap();

    assert_eq!(state.stride.stride_count, Some(2));
    assert_eq!(state.stride.distance(), Some(86.4375));
    assert_eq!(state.stride.speed_integer, Some(11));
    assert_eq!(state.stride.speed_fractional, Some(0x80));
    assert_eq!(state.stride.cadence_integer, Some(90));
}

#[test]
fn repeated_page_is_idempotent() {
    let mut registry = Registry::new();
    registry.ingest(1u16, SDM, &PAGE_1);
    let once = registry.ingest(1u16, SDM, &PAGE_2).state().unwrap().clone();
    let twice = registry.ingest(1u16, SDM, &PAGE_2).state().unwrap();

    assert_eq!(&once, twice);
}

#[test]
fn page_schemas() {
    assert_eq!(stride::schema(1), Some(stride::BASE_PAGE));
    assert_eq!(stride::schema(2), Some(stride::STATUS_PAGE));
    assert_eq!(stride::schema(3), Some(stride::CALORIES_PAGE));
    assert_eq!(stride::schema(15), Some(stride::STATUS_PAGE));
    assert_eq!(stride::schema(0), None);
    assert_eq!(stride::schema(0x50), None);
}

#[test]
fn unknown_page_is_ignored() {
    let mut registry = Registry::new();
    let common_page = [0x50, 0xFF, 0xFF, 0x01, 0x0F, 0x00, 0x85, 0x83];

    assert_eq!(registry.ingest(1u16, SDM, &common_page), Ingest::Ignored);
    assert!(registry.is_empty());
}

#[test]
fn empty_frame_is_rejected() {
    let mut registry = Registry::new();
    let truncated = Truncated {
        offset: 0,
        width: 1,
        len: 0,
    };

    assert_eq!(registry.ingest(1u16, SDM, &[]), Ingest::Rejected(truncated));
    assert!(registry.is_empty());
}

#[test]
fn page_number_alone_is_rejected() {
    let mut registry = Registry::new();
    let truncated = Truncated {
        offset: 1,
        width: 1,
        len: 1,
    };

    assert_eq!(registry.ingest(1u16, SDM, &[0x01]), Ingest::Rejected(truncated));
    assert!(registry.get(&1).is_none());
}

#[test]
fn truncated_page_keeps_leading_fields() {
    let mut registry = Registry::new();
    let truncated = Truncated {
        offset: 3,
        width: 1,
        len: 3,
    };

    let Ingest::Partial(state, cut) = registry.ingest(1u16, SDM, &PAGE_1[..3]) else {
        panic!("expected a partial update");
    };

    assert_eq!(cut, truncated);
    assert_eq!(state.stride.time_fractional, Some(0x12));
    assert_eq!(state.stride.time_integer, Some(0x34));
    assert_eq!(state.stride.distance_integer, None);
    assert_eq!(registry.len(), 1);
}

#[test]
fn decode_page_sequence() {
    const PATH: &str = "fixtures/stride-pages.csv";

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(PATH)
        .unwrap();

    let mut registry = Registry::new();

    for record in reader.records() {
        let mut fields: Vec<String> = record.unwrap().iter().map(str::to_string).collect();
        let payload = hex(&fields.remove(0));
        let mut validator = Validator(fields);

        match decode(SDM, &payload) {
            Ok(Decoded {
                update: Update::Stride(reading),
                truncated: None,
            }) => merge(&mut validator, &reading),
            Err(DecodeError::UnknownDiscriminator) => {}
            other => panic!("unexpected decode result: {other:?}"),
        }

        assert!(validator.0.is_empty(), "missing values: {:?}", validator.0);
        registry.ingest(7u8, SDM, &payload);
    }

    let state = &registry.get(&7).unwrap().stride;
    assert_eq!(state.stride_count, Some(3));
    assert_eq!(state.distance(), Some(96.5));
    assert_eq!(state.speed(), Some(12.125));
    assert_eq!(state.cadence(), Some(91.25));
    assert_eq!(state.calories, Some(42));
    assert_eq!(state.status, Some(145));
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

/// Checks each received slot against the remaining `slot, value` columns.
struct Validator(Vec<String>);

impl FromReading for Validator {
    fn add_value(&mut self, slot: u8, value: f64) {
        assert_eq!(self.0.remove(0), slot.to_string());
        assert_eq!(self.0.remove(0), value.to_string());
    }
}
