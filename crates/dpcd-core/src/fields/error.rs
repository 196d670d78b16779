use thiserror::Error;

/// Errors returned by bit-field extraction.
///
/// `InvalidRange` and `OffsetOutOfRange` mean a decoder asked for bits its own
/// byte slice cannot hold. `TooShort` means the input ended before a
/// variable-length layout was complete.
///
/// # Examples
/// ```
/// use dpcd_core::fields::{FieldError, single_byte_field};
///
/// let err = single_byte_field(0xff, 4, 2).unwrap_err();
/// assert!(matches!(err, FieldError::InvalidRange { .. }));
/// assert!(err.to_string().contains("invalid bit range"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid bit range {start}:{end}: {reason}")]
    InvalidRange {
        start: u8,
        end: u8,
        reason: &'static str,
    },
    #[error("offset {offset} out of range for a {len}-byte slice")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
