use super::bits::{multi_byte_field, single_byte_field};
use super::error::FieldError;
use super::format;
use crate::FieldEntry;

/// Bounds-checked view over one record's bytes.
///
/// Decoders never index the slice directly; every field goes through this
/// builder, which appends it to the record in declaration order and tracks
/// how many bytes the record has used so far.
pub struct RecordBuilder<'a> {
    bytes: &'a [u8],
    fields: Vec<FieldEntry>,
    consumed: usize,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            fields: Vec::new(),
            consumed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes consumed by the fields read so far (one past the furthest byte).
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldEntry> {
        self.fields
    }

    /// Fails with `TooShort` when the input ends before `needed` bytes.
    pub fn require_len(&self, needed: usize) -> Result<(), FieldError> {
        if self.bytes.len() < needed {
            return Err(FieldError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FieldError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(FieldError::OffsetOutOfRange {
                offset,
                len: self.bytes.len(),
            })
    }

    /// Reads bits `start..=end` of the byte at `offset` without recording them.
    pub fn peek(&self, offset: usize, start: u8, end: u8) -> Result<u8, FieldError> {
        single_byte_field(self.read_u8(offset)?, start, end)
    }

    pub fn bit(&mut self, label: impl Into<String>, offset: usize, bit: u8) -> Result<u128, FieldError> {
        self.field(label, offset, bit, bit)
    }

    pub fn bit_with<F>(
        &mut self,
        label: impl Into<String>,
        offset: usize,
        bit: u8,
        formatter: F,
    ) -> Result<u128, FieldError>
    where
        F: Fn(u128) -> String,
    {
        self.field_with(label, offset, bit, bit, formatter)
    }

    pub fn field(
        &mut self,
        label: impl Into<String>,
        offset: usize,
        start: u8,
        end: u8,
    ) -> Result<u128, FieldError> {
        self.field_with(label, offset, start, end, format::decimal)
    }

    pub fn field_with<F>(
        &mut self,
        label: impl Into<String>,
        offset: usize,
        start: u8,
        end: u8,
        formatter: F,
    ) -> Result<u128, FieldError>
    where
        F: Fn(u128) -> String,
    {
        let value = u128::from(self.peek(offset, start, end)?);
        self.push(label.into(), offset, 1, start, end, value, formatter(value));
        Ok(value)
    }

    /// Records a field spanning several bytes; see [`multi_byte_field`] for
    /// the meaning of `start > end`.
    pub fn span(
        &mut self,
        label: impl Into<String>,
        offset: usize,
        start: u8,
        end: u8,
    ) -> Result<u128, FieldError> {
        self.span_with(label, offset, start, end, format::decimal)
    }

    pub fn span_with<F>(
        &mut self,
        label: impl Into<String>,
        offset: usize,
        start: u8,
        end: u8,
        formatter: F,
    ) -> Result<u128, FieldError>
    where
        F: Fn(u128) -> String,
    {
        let value = multi_byte_field(self.bytes, offset, start, end)?;
        let width = usize::from(start.max(end) / 8) + 1;
        self.push(label.into(), offset, width, start, end, value, formatter(value));
        Ok(value)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        label: String,
        offset: usize,
        width: usize,
        start_bit: u8,
        end_bit: u8,
        raw_value: u128,
        formatted_value: String,
    ) {
        self.consumed = self.consumed.max(offset + width);
        self.fields.push(FieldEntry {
            label,
            offset,
            start_bit,
            end_bit,
            raw_value,
            formatted_value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::RecordBuilder;
    use crate::fields::error::FieldError;
    use crate::fields::format;

    #[test]
    fn fields_keep_declaration_order() {
        let bytes = [0x11];
        let mut builder = RecordBuilder::new(&bytes);
        builder.field("Major rev", 0, 4, 7).unwrap();
        builder.field("Minor rev", 0, 0, 3).unwrap();
        let fields = builder.into_fields();
        assert_eq!(fields[0].label, "Major rev");
        assert_eq!(fields[0].start_bit, 4);
        assert_eq!(fields[1].label, "Minor rev");
        assert_eq!(fields[1].raw_value, 1);
    }

    #[test]
    fn consumed_tracks_furthest_byte() {
        let bytes = [0u8; 8];
        let mut builder = RecordBuilder::new(&bytes);
        builder.span("Counter", 2, 15, 0).unwrap();
        assert_eq!(builder.consumed(), 4);
        builder.bit("Flag", 0, 7).unwrap();
        assert_eq!(builder.consumed(), 4);
    }

    #[test]
    fn descending_span_records_reversed_bits() {
        let bytes = [0x01, 0x2c];
        let mut builder = RecordBuilder::new(&bytes);
        builder.span("PBN", 0, 15, 0).unwrap();
        let field = &builder.fields()[0];
        assert!(field.start_bit > field.end_bit);
        assert_eq!(field.raw_value, 300);
    }

    #[test]
    fn formatter_receives_raw_value() {
        let bytes = [0x5b];
        let mut builder = RecordBuilder::new(&bytes);
        builder.field_with("CRC", 0, 0, 7, format::hex).unwrap();
        assert_eq!(builder.fields()[0].formatted_value, "0x5b");
    }

    #[test]
    fn read_past_slice_is_offset_error() {
        let bytes = [0u8; 1];
        let mut builder = RecordBuilder::new(&bytes);
        let err = builder.bit("Missing", 1, 0).unwrap_err();
        assert!(matches!(err, FieldError::OffsetOutOfRange { offset: 1, len: 1 }));
    }

    #[test]
    fn require_len_reports_too_short() {
        let bytes = [0u8; 3];
        let builder = RecordBuilder::new(&bytes);
        let err = builder.require_len(5).unwrap_err();
        assert_eq!(err, FieldError::TooShort { needed: 5, actual: 3 });
    }
}
