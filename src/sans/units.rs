//! Numeric helpers shared by the layout engine and profile accessors.

/// Byte order of a multi-byte field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Used by every ANT+ and Bluetooth SIG profile field.
    #[default]
    Little,
    Big,
}

/// Read an unsigned integer of `width` bytes (1 to 4) at offset `at`.
///
/// Returns `None` if the slice ends before the field does.
pub fn read_uint(r: &[u8], at: usize, width: u8, order: ByteOrder) -> Option<u32> {
    debug_assert!((1..=4).contains(&width));

    let bytes = r.get(at..at.checked_add(width as usize)?)?;
    let fold = |acc: u32, b: &u8| (acc << 8) | *b as u32;

    Some(match order {
        ByteOrder::Little => bytes.iter().rev().fold(0, fold),
        ByteOrder::Big => bytes.iter().fold(0, fold),
    })
}

/// Interpret the low `width` bytes of `raw` as a two's complement integer.
pub fn sign_extend(raw: u32, width: u8) -> i32 {
    let shift = 32 - 8 * width as u32;
    ((raw << shift) as i32) >> shift
}

/// Extract `width` bits of `raw` starting at bit `lo`.
pub fn bits(raw: u32, lo: u32, width: u32) -> u32 {
    (raw >> lo) & ((1 << width) - 1)
}

/// Combine an integer part with a fraction counted in `1 / denominator` steps.
pub fn fixed_point(integer: impl Into<u32>, fraction: impl Into<u32>, denominator: f64) -> f64 {
    integer.into() as f64 + fraction.into() as f64 / denominator
}
