//! Bit-field extraction.
//!
//! Fields follow the same layering as the rest of the crate:
//! - `bits`: pure extraction over one byte or a byte span
//! - `reader`: bounds-checked access to a record's byte slice, recording
//!   every extracted field in declaration order
//! - `format`: value formatters shared by register and message decoders
//! - `error`: range and offset errors
//!
//! Bits inside a byte are numbered low-bit-first. A span whose start bit is
//! greater than its end bit is read in the descending convention: bytes are
//! assembled big-endian and the field is numbered high-bit-first across them.

pub mod bits;
pub mod error;
pub mod format;
pub mod reader;

pub use bits::{multi_byte_field, single_byte_field};
pub use error::FieldError;
pub use reader::RecordBuilder;
