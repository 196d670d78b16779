//! DPCD register and sideband message decoding.
//!
//! This crate turns raw bytes read from a DisplayPort AUX channel into
//! labelled field reports. A byte buffer and its base address go through the
//! dispatch loop, which asks the registry for the descriptor matching each
//! address (and, inside the sideband reply window, the message type embedded
//! in the bytes). The descriptor's decode function extracts fields through the
//! bit-field layer and the loop collects one [`DecodeRecord`] per match.
//! Bytes that nothing matches land in the report's unparsed map.
//!
//! Invariants:
//! - Record byte spans and unparsed addresses partition the input exactly.
//! - Records appear in scan order; fields in declaration order.
//! - Decoding is pure; the registry is immutable and shared read-only.
//!
//! Trace parsing (`source`) and transaction batching (`decode_trace_file`)
//! sit on top of the core and are the only places that touch I/O.
//!
//! # Examples
//! ```
//! let report = dpcd_core::decode(&[0x11, 0x14], 0)?;
//! assert_eq!(report.records[0].name, "DPCD_REV");
//! assert_eq!(report.records[1].fields[0].formatted_value, "5.4 Gpbs");
//! # Ok::<(), dpcd_core::DecodeError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod analysis;
mod decode;
pub mod fields;
pub mod registers;
pub mod registry;
pub mod sideband;
pub mod source;

pub use analysis::{
    AnalysisError, DecodeOptions, DirectionFilter, TransactionReport, coalesce,
    decode_source, decode_trace_file, decode_transactions,
};
pub use decode::DecodeError;
pub use registry::{Descriptor, Registry};
pub use source::{Direction, SourceError, TraceSource, Transaction, TransactionSource};

/// Decodes `buffer` as DPCD bytes starting at `base_address` using the
/// built-in registry.
pub fn decode(buffer: &[u8], base_address: u32) -> Result<Report, DecodeError> {
    Registry::builtin().decode(buffer, base_address)
}

/// Result of one decode invocation.
///
/// # Examples
/// ```
/// use dpcd_core::Report;
///
/// let report = Report::default();
/// assert!(report.records.is_empty());
/// assert!(report.unparsed.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Decoded registers and messages in scan order.
    pub records: Vec<DecodeRecord>,
    /// Bytes no descriptor matched, keyed by absolute address.
    pub unparsed: BTreeMap<u32, u8>,
}

impl Report {
    /// Number of input bytes this report accounts for.
    pub fn byte_count(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.raw_bytes.len())
            .sum::<usize>()
            + self.unparsed.len()
    }
}

/// One matched register or sideband message.
///
/// # Examples
/// ```
/// use dpcd_core::DecodeRecord;
///
/// let record = DecodeRecord {
///     name: "DPCD_REV".to_string(),
///     address: 0,
///     raw_bytes: vec![0x12],
///     fields: Vec::new(),
/// };
/// assert_eq!(record.end_address(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeRecord {
    /// Register or message name.
    pub name: String,
    /// Absolute address of the first byte.
    pub address: u32,
    /// Bytes consumed by this record.
    pub raw_bytes: Vec<u8>,
    /// Decoded fields in declaration order.
    pub fields: Vec<FieldEntry>,
}

impl DecodeRecord {
    /// Address of the last byte covered by the record.
    pub fn end_address(&self) -> u32 {
        self.address
            .wrapping_add(self.raw_bytes.len().saturating_sub(1) as u32)
    }

    /// First field carrying `label`.
    pub fn field(&self, label: &str) -> Option<&FieldEntry> {
        self.fields.iter().find(|field| field.label == label)
    }
}

/// One extracted bit range.
///
/// `start_bit > end_bit` marks a field read in the descending (big-endian,
/// high-bit-first) convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub label: String,
    /// Byte offset of the field inside its record.
    pub offset: usize,
    pub start_bit: u8,
    pub end_bit: u8,
    /// Serialized as a `0x`-prefixed hex string to keep 128-bit values exact.
    #[serde(with = "hex_u128")]
    pub raw_value: u128,
    pub formatted_value: String,
}

mod hex_u128 {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        u128::from_str_radix(digits, 16).map_err(de::Error::custom)
    }
}
