use super::header::{SidebandHeader, decode_header};
use super::layout;
use crate::fields::format::{self, choice};
use crate::fields::{FieldError, RecordBuilder};

type BodyFn = fn(&mut RecordBuilder<'_>, usize) -> Result<usize, FieldError>;

pub fn transaction_version(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, transaction_version_body)
}

pub fn link_address(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, link_address_body)
}

pub fn enum_path_resources(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, enum_path_resources_body)
}

pub fn allocate_payload(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, allocate_payload_body)
}

pub fn query_payload(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, query_payload_body)
}

pub fn remote_dpcd_read(b: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
    decode_message(b, remote_dpcd_read_body)
}

/// Header, then the body at the offset the header reports, then the body CRC
/// when it sits right after the decoded body.
///
/// Bodies cut off by the end of the buffer keep the fields that fit; a
/// clipped body returns `b.len()` so no CRC is read from its last byte.
fn decode_message(b: &mut RecordBuilder<'_>, body: BodyFn) -> Result<(), FieldError> {
    let header = decode_header(b)?;
    let cursor = body(b, header.header_len)?;
    decode_body_crc(b, &header, cursor)
}

fn decode_body_crc(
    b: &mut RecordBuilder<'_>,
    header: &SidebandHeader,
    cursor: usize,
) -> Result<(), FieldError> {
    if header.body_length == 0 {
        return Ok(());
    }
    let crc_offset = header.header_len + usize::from(header.body_length) - 1;
    if crc_offset == cursor && cursor < b.len() {
        b.field_with("Body CRC", cursor, 0, 7, format::hex)?;
    }
    Ok(())
}

/// True when the record holds `end` bytes. Logs the clip otherwise.
fn fits(b: &RecordBuilder<'_>, message: &str, end: usize) -> bool {
    if end <= b.len() {
        return true;
    }
    log::debug!("{message} clipped: body needs {end} bytes, {} available", b.len());
    false
}

fn reply_id(b: &mut RecordBuilder<'_>, offset: usize) -> Result<(), FieldError> {
    b.bit_with("Reply type", offset, 7, choice("NAK", "ACK"))?;
    b.field_with("Request ID", offset, 0, 6, request_name)?;
    Ok(())
}

fn request_name(value: u128) -> String {
    let name = match u8::try_from(value) {
        Ok(layout::REQ_GET_MESSAGE_TRANSACTION_VERSION) => "GET_MESSAGE_TRANSACTION_VERSION",
        Ok(layout::REQ_LINK_ADDRESS) => "LINK_ADDRESS",
        Ok(layout::REQ_ENUM_PATH_RESOURCES) => "ENUM_PATH_RESOURCES",
        Ok(layout::REQ_ALLOCATE_PAYLOAD) => "ALLOCATE_PAYLOAD",
        Ok(layout::REQ_QUERY_PAYLOAD) => "QUERY_PAYLOAD",
        Ok(layout::REQ_REMOTE_DPCD_READ) => "REMOTE_DPCD_READ",
        _ => return format::hex(value),
    };
    name.to_string()
}

fn transaction_version_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "GET_MESSAGE_TRANSACTION_VERSION", body + layout::TRANSACTION_VERSION_LEN) {
        return Ok(b.len());
    }
    b.field("Transaction version", body + 1, 0, 7)?;
    Ok(body + layout::TRANSACTION_VERSION_LEN)
}

fn link_address_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "LINK_ADDRESS", body + 1 + layout::GUID_LEN) {
        return Ok(b.len());
    }
    b.span_with("Global unique ID", body + 1, 127, 0, format::hex128)?;
    if !fits(b, "LINK_ADDRESS", body + layout::LINK_ADDRESS_FIXED_LEN) {
        return Ok(b.len());
    }
    let ports = b.field("Number of ports", body + 1 + layout::GUID_LEN, 0, 3)? as usize;

    let mut cursor = body + layout::LINK_ADDRESS_FIXED_LEN;
    for port in 0..ports {
        let Some(port_len) = port_record_len(b, cursor)? else {
            log::debug!(
                "LINK_ADDRESS clipped: port {port} of {ports} starts past the available bytes"
            );
            break;
        };
        if cursor + port_len > b.len() {
            log::debug!(
                "LINK_ADDRESS clipped: port {port} needs {port_len} bytes, {} available",
                b.len() - cursor
            );
            break;
        }
        decode_port(b, port, cursor)?;
        cursor += port_len;
    }
    Ok(cursor)
}

/// Size of the port record at `cursor`, which depends on the port's own
/// input flag and peer device type.
fn port_record_len(b: &RecordBuilder<'_>, cursor: usize) -> Result<Option<usize>, FieldError> {
    if cursor + layout::PORT_BASE_LEN > b.len() {
        return Ok(None);
    }
    let input = b.peek(cursor, 7, 7)? != 0;
    let peer_device_type = b.peek(cursor, 4, 6)?;

    let mut len = layout::PORT_BASE_LEN;
    if peer_device_type == layout::PEER_DEVICE_MST_BRANCH {
        len += layout::PORT_CAPS_LEN;
    }
    if !input {
        len += layout::PORT_OUTPUT_LEN;
    }
    Ok(Some(len))
}

fn decode_port(b: &mut RecordBuilder<'_>, port: usize, cursor: usize) -> Result<(), FieldError> {
    let prefix = format!("Port {port}");
    let input = b.bit_with(format!("{prefix} input"), cursor, 7, choice("Input", "Output"))? != 0;
    let peer_device_type = b.field_with(
        format!("{prefix} peer device type"),
        cursor,
        4,
        6,
        peer_device_name,
    )?;
    b.field(format!("{prefix} number"), cursor, 0, 3)?;
    b.bit(format!("{prefix} messaging capability"), cursor + 1, 7)?;
    b.bit_with(
        format!("{prefix} plug status"),
        cursor + 1,
        6,
        choice("Plugged", "Unplugged"),
    )?;
    b.bit(format!("{prefix} legacy plug status"), cursor + 1, 5)?;

    let mut offset = cursor + layout::PORT_BASE_LEN;
    if peer_device_type == u128::from(layout::PEER_DEVICE_MST_BRANCH) {
        b.span_with(
            format!("{prefix} current capabilities"),
            offset,
            127,
            0,
            format::hex128,
        )?;
        offset += layout::PORT_CAPS_LEN;
    }
    if !input {
        b.field_with(format!("{prefix} DPCD revision"), offset, 0, 7, format::revision)?;
        b.field(format!("{prefix} SDP streams"), offset + 1, 4, 7)?;
        b.field(format!("{prefix} SDP stream sinks"), offset + 1, 0, 3)?;
    }
    Ok(())
}

fn peer_device_name(value: u128) -> String {
    match value {
        0 => "No device",
        1 => "Source device",
        2 => "SST branch device",
        3 => "SST sink device",
        4 => "DP-to-legacy converter",
        5 => "MST branch device",
        _ => "Reserved",
    }
    .to_string()
}

fn enum_path_resources_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "ENUM_PATH_RESOURCES", body + 2) {
        return Ok(b.len());
    }
    b.field("Port number", body + 1, 0, 3)?;
    if !fits(b, "ENUM_PATH_RESOURCES", body + 4) {
        return Ok(b.len());
    }
    b.span("Available bandwidth", body + 2, 15, 0)?;
    if !fits(b, "ENUM_PATH_RESOURCES", body + layout::ENUM_PATH_RESOURCES_LEN) {
        return Ok(b.len());
    }
    b.span("Payload bandwidth", body + 4, 15, 0)?;
    Ok(body + layout::ENUM_PATH_RESOURCES_LEN)
}

fn allocate_payload_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "ALLOCATE_PAYLOAD", body + 2) {
        return Ok(b.len());
    }
    b.field("Port number", body + 1, 4, 7)?;
    if !fits(b, "ALLOCATE_PAYLOAD", body + 3) {
        return Ok(b.len());
    }
    b.field("Virtual channel payload ID", body + 2, 0, 7)?;
    if !fits(b, "ALLOCATE_PAYLOAD", body + layout::ALLOCATE_PAYLOAD_LEN) {
        return Ok(b.len());
    }
    b.span("Allocated PBN", body + 3, 0, 15)?;
    Ok(body + layout::ALLOCATE_PAYLOAD_LEN)
}

fn query_payload_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "QUERY_PAYLOAD", body + 2) {
        return Ok(b.len());
    }
    b.field("Port number", body + 1, 4, 7)?;
    if !fits(b, "QUERY_PAYLOAD", body + layout::QUERY_PAYLOAD_LEN) {
        return Ok(b.len());
    }
    b.span("Allocated PBN", body + 2, 15, 0)?;
    Ok(body + layout::QUERY_PAYLOAD_LEN)
}

fn remote_dpcd_read_body(b: &mut RecordBuilder<'_>, body: usize) -> Result<usize, FieldError> {
    reply_id(b, body)?;
    if !fits(b, "REMOTE_DPCD_READ", body + 2) {
        return Ok(b.len());
    }
    b.field("Port number", body + 1, 4, 7)?;
    if !fits(b, "REMOTE_DPCD_READ", body + layout::REMOTE_DPCD_READ_FIXED_LEN) {
        return Ok(b.len());
    }
    let requested = b.field("Bytes read", body + 2, 0, 7)? as usize;

    let data = body + layout::REMOTE_DPCD_READ_FIXED_LEN;
    let count = requested.min(b.len() - data);
    if count < requested {
        log::debug!("REMOTE_DPCD_READ clipped: {requested} bytes declared, {count} available");
    }
    for index in 0..count {
        b.field_with(format!("Data {index}"), data + index, 0, 7, format::hex)?;
    }
    Ok(data + count)
}
