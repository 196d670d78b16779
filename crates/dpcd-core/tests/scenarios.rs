use dpcd_core::fields::multi_byte_field;
use dpcd_core::{Registry, decode};

#[test]
fn dpcd_rev_at_address_zero() {
    let report = decode(&[0x11], 0).expect("decode");
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.name, "DPCD_REV");
    assert_eq!(record.field("Major rev").map(|f| f.raw_value), Some(1));
    assert_eq!(record.field("Minor rev").map(|f| f.raw_value), Some(1));
    assert!(report.unparsed.is_empty());
}

#[test]
fn max_link_rate_formats_gbps() {
    let report = decode(&[0x14], 1).expect("decode");
    let record = &report.records[0];
    assert_eq!(record.name, "MAX_LINK_RATE");
    assert_eq!(record.fields[0].formatted_value, "5.4 Gpbs");
}

#[test]
fn reserved_interval_never_lands_in_unparsed() {
    for base in [0x040u32, 0x05a, 0x07f, 0x0f0, 0x0fe] {
        let report = decode(&[0xde, 0xad], base).expect("decode");
        assert_eq!(report.records[0].name, "RESERVED", "at {base:#x}");
        assert!(!report.unparsed.contains_key(&base), "at {base:#x}");
    }
}

#[test]
fn reserved_block_stops_at_its_end() {
    let report = decode(&[0x00, 0x00, 0x00], 0x07e).expect("decode");
    assert_eq!(report.records[0].raw_bytes.len(), 2);
    assert_eq!(report.unparsed.get(&0x080), Some(&0x00));
}

#[test]
fn descending_and_ascending_spans_differ() {
    let bytes = [0xab, 0xcd];
    assert_eq!(multi_byte_field(&bytes, 0, 15, 0).unwrap(), 0xabcd);
    assert_eq!(multi_byte_field(&bytes, 0, 0, 15).unwrap(), 0xcdab);
}

#[test]
fn capability_block_decodes_contiguously() {
    let bytes = [
        0x12, 0x14, 0xc4, 0x01, 0x01, 0x01, 0x01, 0x80, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00,
    ];
    let report = decode(&bytes, 0).expect("decode");
    assert!(report.unparsed.is_empty());
    let names: Vec<_> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names[0], "DPCD_REV");
    assert!(names.contains(&"RECEIVE_PORT0_CAP"));
    assert_eq!(report.byte_count(), bytes.len());
}

#[test]
fn registry_lists_registers_before_sideband_messages() {
    let names: Vec<_> = Registry::builtin()
        .descriptors()
        .iter()
        .map(|d| d.name)
        .collect();
    let first_message = names.iter().position(|n| *n == "LINK_ADDRESS").expect("sideband");
    assert!(names[..first_message].contains(&"DPCD_REV"));
}
