//! Decoding of capability bitmasks into named flag sets.

use core::fmt;

/// A named flag occupying one bit, or a group of bits, of a capability mask.
///
/// Single-bit flags without labels are booleans. Flags carrying labels are
/// small enumerations: the value of their bit group indexes the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag {
    name: &'static str,
    mask: u32,
    labels: &'static [&'static str],
}

impl Flag {
    /// A boolean flag at bit `n`.
    pub const fn bit(n: u32, name: &'static str) -> Self {
        Self {
            name,
            mask: 1 << n,
            labels: &[],
        }
    }

    /// A single bit at `n` choosing between two named alternatives.
    pub const fn select(n: u32, name: &'static str, labels: &'static [&'static str; 2]) -> Self {
        Self {
            name,
            mask: 1 << n,
            labels,
        }
    }

    /// A group of `width` bits starting at bit `lo`, interpreted as an index
    /// into `labels`.
    pub const fn group(
        lo: u32,
        width: u32,
        name: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            mask: ((1 << width) - 1) << lo,
            labels,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn mask(&self) -> u32 {
        self.mask
    }

    fn shift(&self) -> u32 {
        self.mask.trailing_zeros()
    }
}

/// The value of one flag within a [`CapabilitySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue {
    /// A boolean flag.
    Set(bool),
    /// An enumerated flag. `label` is `None` for values the schema reserves.
    Choice {
        index: u32,
        label: Option<&'static str>,
    },
}

/// An immutable set of flags decoded from one capability mask.
///
/// Only the bits covered by the schema are retained.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    bits: u32,
    schema: &'static [Flag],
}

impl CapabilitySet {
    /// A set with no flags, for messages whose layout is fixed.
    pub const EMPTY: Self = Self {
        bits: 0,
        schema: &[],
    };

    /// The recognised bits of the mask this set was decoded from.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn schema(&self) -> &'static [Flag] {
        self.schema
    }

    /// Whether this set's schema defines `flag`.
    pub fn covers(&self, flag: Flag) -> bool {
        self.schema.contains(&flag)
    }

    /// Whether any bit of `flag` is set.
    ///
    /// Testing a flag outside this set's schema is a schema error. It panics
    /// in debug builds and reads as unset otherwise.
    pub fn contains(&self, flag: Flag) -> bool {
        self.value(flag) != 0
    }

    /// The raw value of `flag`'s bit group.
    ///
    /// As with [`CapabilitySet::contains`], a flag outside this set's schema
    /// panics in debug builds and reads as zero otherwise.
    pub fn value(&self, flag: Flag) -> u32 {
        debug_assert!(
            self.covers(flag),
            "flag `{}` is not part of this capability schema",
            flag.name
        );

        if !self.covers(flag) {
            return 0;
        }

        (self.bits & flag.mask) >> flag.shift()
    }

    /// Look up a flag's value by name.
    pub fn get(&self, name: &str) -> Option<FlagValue> {
        self.schema
            .iter()
            .find(|f| f.name == name)
            .map(|f| self.flag_value(f))
    }

    /// Iterate over every flag of the schema, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FlagValue)> + '_ {
        self.schema.iter().map(|f| (f.name, self.flag_value(f)))
    }

    fn flag_value(&self, flag: &Flag) -> FlagValue {
        let index = self.value(*flag);

        if flag.labels.is_empty() {
            FlagValue::Set(index != 0)
        } else {
            FlagValue::Choice {
                index,
                label: flag.labels.get(index as usize).copied(),
            }
        }
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Decode a capability mask against a flag schema.
///
/// Never fails. Bits the schema does not cover are dropped, so masks from
/// later protocol revisions decode to the flags this schema knows about.
pub fn decode_flags(raw: u32, schema: &'static [Flag]) -> CapabilitySet {
    let known = schema.iter().fold(0, |acc, f| acc | f.mask);

    CapabilitySet {
        bits: raw & known,
        schema,
    }
}
