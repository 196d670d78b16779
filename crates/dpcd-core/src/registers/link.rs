//! MST capability, link configuration and sink status registers.

use crate::fields::format::{self, choice};
use crate::fields::{FieldError, RecordBuilder};

type Result = std::result::Result<(), FieldError>;

pub fn mstm_cap(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved", 0, 2, 7)?;
    b.bit("Single-stream sideband messaging", 0, 1)?;
    b.bit_with("MST capability", 0, 0, choice("MST", "SST only"))?;
    Ok(())
}

/// 16-byte GUID, numbered high-bit-first across the block.
pub fn guid(b: &mut RecordBuilder<'_>) -> Result {
    b.span_with("GUID", 0, 127, 0, format::hex128)?;
    Ok(())
}

pub fn link_bw_set(b: &mut RecordBuilder<'_>) -> Result {
    b.field_with("Link bandwidth", 0, 0, 7, format::link_rate)?;
    Ok(())
}

pub fn lane_count_set(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Enhanced framing enabled", 0, 7)?;
    b.bit("Reserved", 0, 6)?;
    b.bit("Post-LT adjust request granted", 0, 5)?;
    b.field("Lane count", 0, 0, 4)?;
    Ok(())
}

pub fn mstm_ctrl(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved", 0, 3, 7)?;
    b.bit("Upstream is source", 0, 2)?;
    b.bit("Up request enable", 0, 1)?;
    b.bit("MST enable", 0, 0)?;
    Ok(())
}

pub fn sink_count(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Sink count bit 6", 0, 7)?;
    b.bit("CP ready", 0, 6)?;
    b.field("Sink count", 0, 0, 5)?;
    Ok(())
}

/// Reserved blocks may be matched mid-interval, so the slice length varies.
pub fn reserved(b: &mut RecordBuilder<'_>) -> Result {
    for offset in 0..b.len() {
        b.field_with("Reserved", offset, 0, 7, format::hex)?;
    }
    Ok(())
}
