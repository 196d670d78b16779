//! Sideband reply messages.
//!
//! Replies share the DOWN_REP window, so neither their type nor their length
//! follows from the address. The window's probe decodes just enough of the
//! common header to find the request id, and the registry maps that id to a
//! message decoder. Each decoder re-reads the header into the record, then
//! walks its body with a running cursor.
//!
//! Decoders only see the bytes of one buffer. A reply whose body continues
//! past those bytes is clipped: LINK_ADDRESS stops after the last complete
//! port and REMOTE_DPCD_READ after the last available data byte. Replies read
//! through several AUX transactions need to be joined first (see
//! [`crate::coalesce`]).

pub mod header;
pub mod layout;
pub mod parser;

pub use header::{SidebandHeader, decode_header, probe};

use crate::registry::{DecodeFn, Descriptor};

pub fn descriptors() -> Vec<Descriptor> {
    let (start, end) = (*layout::DOWN_REP_WINDOW.start(), *layout::DOWN_REP_WINDOW.end());
    let message = |name: &'static str, request: u8, decode: DecodeFn| {
        Descriptor::message(name, start, end, probe, request, decode)
    };
    vec![
        message(
            "GET_MESSAGE_TRANSACTION_VERSION",
            layout::REQ_GET_MESSAGE_TRANSACTION_VERSION,
            parser::transaction_version,
        ),
        message("LINK_ADDRESS", layout::REQ_LINK_ADDRESS, parser::link_address),
        message(
            "ENUM_PATH_RESOURCES",
            layout::REQ_ENUM_PATH_RESOURCES,
            parser::enum_path_resources,
        ),
        message(
            "ALLOCATE_PAYLOAD",
            layout::REQ_ALLOCATE_PAYLOAD,
            parser::allocate_payload,
        ),
        message("QUERY_PAYLOAD", layout::REQ_QUERY_PAYLOAD, parser::query_payload),
        message(
            "REMOTE_DPCD_READ",
            layout::REQ_REMOTE_DPCD_READ,
            parser::remote_dpcd_read,
        ),
    ]
}
