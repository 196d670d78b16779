//! Pure bit-range extraction.

use super::error::FieldError;

/// Widest span a multi-byte field may cover.
pub const MAX_SPAN_BITS: u8 = 128;

/// Extracts bits `start..=end` of `byte`, shifted down to bit 0.
///
/// # Examples
/// ```
/// use dpcd_core::fields::single_byte_field;
///
/// assert_eq!(single_byte_field(0x11, 4, 7).unwrap(), 1);
/// assert_eq!(single_byte_field(0x84, 0, 4).unwrap(), 4);
/// ```
pub fn single_byte_field(byte: u8, start: u8, end: u8) -> Result<u8, FieldError> {
    if end < start {
        return Err(FieldError::InvalidRange {
            start,
            end,
            reason: "end bit below start bit",
        });
    }
    if end > 7 {
        return Err(FieldError::InvalidRange {
            start,
            end,
            reason: "bit outside an 8-bit value",
        });
    }
    let end_mask = ((1u16 << (end + 1)) - 1) as u8;
    let start_mask = ((1u16 << start) - 1) as u8;
    Ok((byte & (start_mask ^ end_mask)) >> start)
}

/// Extracts a field that may cross byte boundaries, starting at `offset`.
///
/// With `start < end` the bytes are assembled little-endian and bits
/// `start..=end` are returned. With `start > end` the bytes covering bit
/// `start` are assembled big-endian and bits `end..=start` are returned.
///
/// # Examples
/// ```
/// use dpcd_core::fields::multi_byte_field;
///
/// let bytes = [0xAB, 0xCD];
/// assert_eq!(multi_byte_field(&bytes, 0, 15, 0).unwrap(), 0xABCD);
/// assert_eq!(multi_byte_field(&bytes, 0, 0, 15).unwrap(), 0xCDAB);
/// ```
pub fn multi_byte_field(bytes: &[u8], offset: usize, start: u8, end: u8) -> Result<u128, FieldError> {
    if start == end {
        return Err(FieldError::InvalidRange {
            start,
            end,
            reason: "single-bit field passed to the multi-byte form",
        });
    }
    if offset >= bytes.len() {
        return Err(FieldError::OffsetOutOfRange {
            offset,
            len: bytes.len(),
        });
    }
    let descending = start > end;
    let (low, high) = if descending { (end, start) } else { (start, end) };
    if high >= MAX_SPAN_BITS {
        return Err(FieldError::InvalidRange {
            start,
            end,
            reason: "span wider than 128 bits",
        });
    }

    let span = usize::from(high / 8) + 1;
    let window = bytes
        .get(offset..offset + span)
        .ok_or(FieldError::InvalidRange {
            start,
            end,
            reason: "span exceeds the available bytes",
        })?;

    let assembled = if descending {
        window
            .iter()
            .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte))
    } else {
        window
            .iter()
            .enumerate()
            .fold(0u128, |acc, (i, &byte)| acc | (u128::from(byte) << (8 * i)))
    };
    Ok(extract(assembled, low, high))
}

fn extract(value: u128, low: u8, high: u8) -> u128 {
    let width = u32::from(high - low) + 1;
    let mask = if width >= u128::BITS {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    (value >> low) & mask
}
