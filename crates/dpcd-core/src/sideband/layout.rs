use std::ops::RangeInclusive;

/// DOWN_REP message window.
pub const DOWN_REP_WINDOW: RangeInclusive<u32> = 0x1400..=0x15ff;
/// Messages start on slot boundaries.
pub const SLOT_SIZE: u32 = 16;

pub const REQ_GET_MESSAGE_TRANSACTION_VERSION: u8 = 0x00;
pub const REQ_LINK_ADDRESS: u8 = 0x01;
pub const REQ_ENUM_PATH_RESOURCES: u8 = 0x10;
pub const REQ_ALLOCATE_PAYLOAD: u8 = 0x11;
pub const REQ_QUERY_PAYLOAD: u8 = 0x12;
pub const REQ_REMOTE_DPCD_READ: u8 = 0x20;

pub const GUID_LEN: usize = 16;
/// Reply id, GUID and port-count byte.
pub const LINK_ADDRESS_FIXED_LEN: usize = 1 + GUID_LEN + 1;
pub const PORT_BASE_LEN: usize = 2;
pub const PORT_CAPS_LEN: usize = 16;
/// DPCD revision and stream-count bytes carried by output ports, giving a
/// 4-byte non-branch output record. The wider 20-byte GUID/stream-count
/// region some port descriptions list is not modelled.
pub const PORT_OUTPUT_LEN: usize = 2;
pub const PEER_DEVICE_MST_BRANCH: u8 = 5;

pub const ENUM_PATH_RESOURCES_LEN: usize = 6;
pub const ALLOCATE_PAYLOAD_LEN: usize = 5;
pub const QUERY_PAYLOAD_LEN: usize = 4;
pub const REMOTE_DPCD_READ_FIXED_LEN: usize = 3;
pub const TRANSACTION_VERSION_LEN: usize = 2;

/// Header size for a given link count total: the LCT/LCR byte, the
/// relative-address bytes, and the two flag bytes.
pub fn header_len(link_count_total: u8) -> usize {
    1 + usize::from(link_count_total).div_ceil(2) + 2
}

#[cfg(test)]
mod tests {
    use super::header_len;

    #[test]
    fn header_len_grows_every_other_hop() {
        assert_eq!(header_len(1), 4);
        assert_eq!(header_len(2), 4);
        assert_eq!(header_len(3), 5);
        assert_eq!(header_len(15), 11);
    }
}
