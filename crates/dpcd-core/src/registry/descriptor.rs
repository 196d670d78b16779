use crate::fields::{FieldError, RecordBuilder};

/// Decodes one record's bytes into fields.
pub type DecodeFn = fn(&mut RecordBuilder<'_>) -> Result<(), FieldError>;

/// Looks at the bytes at an address and returns the discriminant they carry.
pub type ProbeFn = fn(u32, &[u8]) -> Option<u8>;

/// How a descriptor claims an address.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Only at the first address of the interval.
    ExactStart,
    /// Anywhere inside the interval.
    InRange,
    /// Anywhere inside the interval, when `probe` returns `value`.
    Discriminant { probe: ProbeFn, value: u8 },
}

/// How many bytes a matched descriptor consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// The whole interval, `end - start + 1` bytes.
    Fixed,
    /// From the matched address to the end of the interval, clipped to the
    /// buffer.
    ToEnd,
    /// Whatever the decode function reads.
    Variable,
}

/// Immutable rule mapping an address interval to a decode function.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
    pub length: Length,
    pub matcher: Matcher,
    pub decode: DecodeFn,
}

impl Descriptor {
    /// A fixed register occupying `start..=end`.
    pub const fn register(name: &'static str, start: u32, end: u32, decode: DecodeFn) -> Self {
        Self {
            name,
            start,
            end,
            length: Length::Fixed,
            matcher: Matcher::ExactStart,
            decode,
        }
    }

    /// A block matched at any address inside it.
    pub const fn range(name: &'static str, start: u32, end: u32, decode: DecodeFn) -> Self {
        Self {
            name,
            start,
            end,
            length: Length::ToEnd,
            matcher: Matcher::InRange,
            decode,
        }
    }

    /// A variable-length message selected by a content probe.
    pub const fn message(
        name: &'static str,
        start: u32,
        end: u32,
        probe: ProbeFn,
        value: u8,
        decode: DecodeFn,
    ) -> Self {
        Self {
            name,
            start,
            end,
            length: Length::Variable,
            matcher: Matcher::Discriminant { probe, value },
            decode,
        }
    }

    pub fn contains(&self, address: u32) -> bool {
        (self.start..=self.end).contains(&address)
    }

    /// Declared size of the whole interval.
    pub fn byte_len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Bytes between `address` and the end of the interval.
    pub fn bytes_to_end(&self, address: u32) -> usize {
        (self.end - address) as usize + 1
    }
}
