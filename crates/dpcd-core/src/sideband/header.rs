use super::layout;
use crate::fields::format;
use crate::fields::{FieldError, RecordBuilder};

/// Common header shared by every sideband message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebandHeader {
    pub link_count_total: u8,
    pub link_count_remaining: u8,
    /// One 4-bit port number per hop, in path order.
    pub relative_addresses: Vec<u8>,
    pub broadcast: bool,
    pub path: bool,
    /// Body bytes including the trailing body CRC.
    pub body_length: u8,
    pub start_of_message: bool,
    pub end_of_message: bool,
    pub sequence: u8,
    pub header_crc: u8,
    /// Offset of the message body.
    pub header_len: usize,
}

/// Returns the request id embedded after the header, if `address` is a slot
/// boundary and the bytes are long enough to hold it.
pub fn probe(address: u32, bytes: &[u8]) -> Option<u8> {
    if address % layout::SLOT_SIZE != 0 {
        return None;
    }
    let link_count_total = bytes.first()? >> 4;
    if link_count_total == 0 {
        return None;
    }
    bytes.get(layout::header_len(link_count_total)).copied()
}

/// Decodes the header fields into `b` and returns them.
///
/// Relative addresses are packed two per byte, high nibble first. Nibbles
/// left over in the relative-address bytes are padding.
pub fn decode_header(b: &mut RecordBuilder<'_>) -> Result<SidebandHeader, FieldError> {
    b.require_len(1)?;
    let link_count_total = b.field("Link count total", 0, 4, 7)? as u8;
    let link_count_remaining = b.field("Link count remaining", 0, 0, 3)? as u8;

    let header_len = layout::header_len(link_count_total);
    b.require_len(header_len)?;

    let hops = usize::from(link_count_total.saturating_sub(1));
    let mut relative_addresses = Vec::with_capacity(hops);
    for hop in 0..hops {
        let offset = 1 + hop / 2;
        let (start, end) = if hop % 2 == 0 { (4, 7) } else { (0, 3) };
        let label = format!("Relative address {}", hop + 1);
        relative_addresses.push(b.field(label, offset, start, end)? as u8);
    }

    let flags = header_len - 2;
    let broadcast = b.bit("Broadcast message", flags, 7)? != 0;
    let path = b.bit("Path message", flags, 6)? != 0;
    let body_length = b.field("Body length", flags, 0, 5)? as u8;

    let tail = header_len - 1;
    let start_of_message = b.bit("Start of message", tail, 7)? != 0;
    let end_of_message = b.bit("End of message", tail, 6)? != 0;
    b.bit("Reserved", tail, 5)?;
    let sequence = b.bit("Sequence number", tail, 4)? as u8;
    let header_crc = b.field_with("Header CRC", tail, 0, 3, format::hex)? as u8;

    Ok(SidebandHeader {
        link_count_total,
        link_count_remaining,
        relative_addresses,
        broadcast,
        path,
        body_length,
        start_of_message,
        end_of_message,
        sequence,
        header_crc,
        header_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reads_request_id_after_header() {
        let bytes = [0x10, 0x00, 0x05, 0xc0, 0x12];
        assert_eq!(probe(0x1400, &bytes), Some(0x12));
    }

    #[test]
    fn probe_requires_slot_alignment() {
        let bytes = [0x10, 0x00, 0x05, 0xc0, 0x12];
        assert_eq!(probe(0x1401, &bytes), None);
        assert_eq!(probe(0x1410, &bytes), Some(0x12));
    }

    #[test]
    fn probe_rejects_zero_link_count() {
        assert_eq!(probe(0x1400, &[0x00, 0, 0, 0, 0x12]), None);
    }

    #[test]
    fn probe_needs_request_byte() {
        assert_eq!(probe(0x1400, &[0x10, 0x00, 0x05, 0xc0]), None);
    }

    #[test]
    fn single_hop_header() {
        let bytes = [0x10, 0x00, 0x45, 0xd7, 0x12];
        let mut b = RecordBuilder::new(&bytes);
        let header = decode_header(&mut b).unwrap();
        assert_eq!(header.link_count_total, 1);
        assert!(header.relative_addresses.is_empty());
        assert!(header.path);
        assert!(!header.broadcast);
        assert_eq!(header.body_length, 5);
        assert!(header.start_of_message);
        assert!(header.end_of_message);
        assert_eq!(header.sequence, 1);
        assert_eq!(header.header_crc, 0x7);
        assert_eq!(header.header_len, 4);
    }

    #[test]
    fn relative_addresses_unpack_high_nibble_first() {
        // LCT=4, LCR=3, hops 1, 2, 8 then one pad nibble
        let bytes = [0x43, 0x12, 0x80, 0x03, 0xc0, 0x01];
        let mut b = RecordBuilder::new(&bytes);
        let header = decode_header(&mut b).unwrap();
        assert_eq!(header.relative_addresses, vec![1, 2, 8]);
        assert_eq!(header.link_count_remaining, 3);
        assert_eq!(header.header_len, 5);
        assert_eq!(header.body_length, 3);
    }

    #[test]
    fn short_header_is_too_short() {
        let bytes = [0x40, 0x12];
        let mut b = RecordBuilder::new(&bytes);
        let err = decode_header(&mut b).unwrap_err();
        assert_eq!(err, FieldError::TooShort { needed: 5, actual: 2 });
    }
}
