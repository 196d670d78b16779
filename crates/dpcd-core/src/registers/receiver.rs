//! Receiver capability block, `0x000..=0x00e`.

use crate::fields::format::{self, choice};
use crate::fields::{FieldError, RecordBuilder};

type Result = std::result::Result<(), FieldError>;

pub fn dpcd_rev(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Major rev", 0, 4, 7)?;
    b.field("Minor rev", 0, 0, 3)?;
    Ok(())
}

pub fn max_link_rate(b: &mut RecordBuilder<'_>) -> Result {
    b.field_with("Max link rate", 0, 0, 7, format::link_rate)?;
    Ok(())
}

pub fn max_lane_count(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Enhanced frame caps", 0, 7)?;
    b.bit("Supports TPS3 pattern", 0, 6)?;
    b.bit("Supports post-lt adjust", 0, 5)?;
    b.field("Max lane count", 0, 0, 4)?;
    Ok(())
}

pub fn max_downspread(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Supports TPS4 pattern", 0, 7)?;
    b.bit("Requires AUX for sync", 0, 6)?;
    b.field("Reserved", 0, 2, 5)?;
    b.bit("Supports stream regen bit", 0, 1)?;
    b.bit_with("Max downspread", 0, 0, choice("<=0.5%", "None"))?;
    Ok(())
}

pub fn receive_ports(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Capable of 18V", 0, 7)?;
    b.bit("Capable of 12V", 0, 6)?;
    b.bit("Capable of 5V", 0, 5)?;
    b.field("Reserved", 0, 2, 4)?;
    b.bit("CRC 3D supported", 0, 1)?;
    b.bit("Number recv ports", 0, 0)?;
    Ok(())
}

pub fn downstream_port_present(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved", 0, 5, 7)?;
    b.bit("Detailed capability available", 0, 4)?;
    b.bit("Branch converts format", 0, 3)?;
    b.field_with("Downstream facing port type", 0, 1, 2, downstream_port_type)?;
    b.bit("Downstream facing port present", 0, 0)?;
    Ok(())
}

fn downstream_port_type(value: u128) -> String {
    match value {
        0 => "DisplayPort",
        1 => "Analog VGA",
        2 => "HDMI/DVI/DP++",
        _ => "Others",
    }
    .to_string()
}

pub fn main_link_channel_coding(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved", 0, 2, 7)?;
    b.bit("Supports 128b/132b encoding", 0, 1)?;
    b.bit("Supports 8b/10b encoding", 0, 0)?;
    Ok(())
}

pub fn downstream_port_count(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("IEEE unique ID support", 0, 7)?;
    b.bit("Sink requires MSA timing", 0, 6)?;
    b.field("Reserved", 0, 4, 5)?;
    b.field("Downstream port count", 0, 0, 3)?;
    Ok(())
}

/// Shared by both receive ports; the two registers have the same layout.
pub fn receive_port_cap(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved", 0, 6, 7)?;
    b.bit_with("Buffer size per-lane/port", 0, 5, choice("Per port", "Per lane"))?;
    b.bit_with("Buffer size units", 0, 4, choice("Bytes", "Pixels"))?;
    b.bit("HBlank expansion supported", 0, 3)?;
    b.bit_with("usage", 0, 2, choice("Secondary stream", "Primary stream"))?;
    b.bit("Local EDID present", 0, 1)?;
    b.bit("Reserved", 0, 0)?;
    b.field_with("Buffer Size", 1, 0, 7, |value| ((value + 1) * 32).to_string())?;
    Ok(())
}

pub fn i2c_speed_cap(b: &mut RecordBuilder<'_>) -> Result {
    b.field_with("I2C speed support", 0, 0, 7, i2c_speeds)?;
    Ok(())
}

fn i2c_speeds(value: u128) -> String {
    const SPEEDS: [(u128, &str); 6] = [
        (0x01, "1 Kbps"),
        (0x02, "5 Kbps"),
        (0x04, "10 Kbps"),
        (0x08, "100 Kbps"),
        (0x10, "400 Kbps"),
        (0x20, "1 Mbps"),
    ];
    if value == 0 {
        return "No physical i2c bus".to_string();
    }
    let mut speeds: Vec<&str> = SPEEDS
        .iter()
        .filter(|(mask, _)| value & mask != 0)
        .map(|(_, label)| *label)
        .collect();
    if value & 0xc0 != 0 {
        speeds.push("RESERVED");
    }
    speeds.join("/")
}

// TODO: decode the individual eDP configuration bits
pub fn edp_configuration_cap(b: &mut RecordBuilder<'_>) -> Result {
    b.field("Reserved for eDP", 0, 0, 7)?;
    Ok(())
}

pub fn training_aux_rd_interval(b: &mut RecordBuilder<'_>) -> Result {
    b.bit("Extended receiver caps available", 0, 7)?;
    b.field_with("Training AUX read interval", 0, 0, 6, aux_rd_interval)?;
    Ok(())
}

fn aux_rd_interval(value: u128) -> String {
    let channel_eq_us = match value {
        0 => 400,
        1..=4 => value * 4000,
        _ => return "Reserved".to_string(),
    };
    format!("ClockReqDone=100us / ChannelEqDone={channel_eq_us}us")
}
