//! Fixed DPCD registers.
//!
//! Each register is one descriptor pointing at one decode function. Addresses
//! live in `layout`; decoders are grouped by block. The catalogue here is a
//! representative subset; further registers are added as more descriptor
//! entries with the same shape.

pub mod layout;
pub mod link;
pub mod receiver;

use std::ops::RangeInclusive;

use crate::registry::{DecodeFn, Descriptor};

/// Fixed registers first, reserved blocks last so that a register declared
/// inside a reserved block still wins.
pub fn descriptors() -> Vec<Descriptor> {
    let single = |name: &'static str, address: u32, decode: DecodeFn| {
        Descriptor::register(name, address, address, decode)
    };
    let block = |name: &'static str, range: RangeInclusive<u32>, decode: DecodeFn| {
        Descriptor::register(name, *range.start(), *range.end(), decode)
    };

    let mut descriptors = vec![
        single("DPCD_REV", layout::DPCD_REV, receiver::dpcd_rev),
        single("MAX_LINK_RATE", layout::MAX_LINK_RATE, receiver::max_link_rate),
        single("MAX_LANE_COUNT", layout::MAX_LANE_COUNT, receiver::max_lane_count),
        single("MAX_DOWNSPREAD", layout::MAX_DOWNSPREAD, receiver::max_downspread),
        single("NORP/DP_PWR_VOLTAGE_CAP", layout::NORP, receiver::receive_ports),
        single(
            "DOWN_STREAM_PORT_PRESENT",
            layout::DOWN_STREAM_PORT_PRESENT,
            receiver::downstream_port_present,
        ),
        single(
            "MAIN_LINK_CHANNEL_CODING",
            layout::MAIN_LINK_CHANNEL_CODING,
            receiver::main_link_channel_coding,
        ),
        single(
            "DOWN_STREAM_PORT_COUNT",
            layout::DOWN_STREAM_PORT_COUNT,
            receiver::downstream_port_count,
        ),
        block("RECEIVE_PORT0_CAP", layout::RECEIVE_PORT0_CAP, receiver::receive_port_cap),
        block("RECEIVE_PORT1_CAP", layout::RECEIVE_PORT1_CAP, receiver::receive_port_cap),
        single(
            "I2C Speed Control Capabilities Bit Map",
            layout::I2C_SPEED_CAP,
            receiver::i2c_speed_cap,
        ),
        single(
            "eDP_CONFIGURATION_CAP",
            layout::EDP_CONFIGURATION_CAP,
            receiver::edp_configuration_cap,
        ),
        single(
            "TRAINING_AUX_RD_INTERVAL",
            layout::TRAINING_AUX_RD_INTERVAL,
            receiver::training_aux_rd_interval,
        ),
        single("MSTM_CAP", layout::MSTM_CAP, link::mstm_cap),
        block("GUID", layout::GUID, link::guid),
        single("LINK_BW_SET", layout::LINK_BW_SET, link::link_bw_set),
        single("LANE_COUNT_SET", layout::LANE_COUNT_SET, link::lane_count_set),
        single("MSTM_CTRL", layout::MSTM_CTRL, link::mstm_ctrl),
        single("SINK_COUNT", layout::SINK_COUNT, link::sink_count),
    ];

    descriptors.extend(
        layout::RESERVED_BLOCKS
            .into_iter()
            .map(|range| Descriptor::range("RESERVED", *range.start(), *range.end(), link::reserved)),
    );
    descriptors
}
