pub const DPCD_REV: u32 = 0x000;
pub const MAX_LINK_RATE: u32 = 0x001;
pub const MAX_LANE_COUNT: u32 = 0x002;
pub const MAX_DOWNSPREAD: u32 = 0x003;
pub const NORP: u32 = 0x004;
pub const DOWN_STREAM_PORT_PRESENT: u32 = 0x005;
pub const MAIN_LINK_CHANNEL_CODING: u32 = 0x006;
pub const DOWN_STREAM_PORT_COUNT: u32 = 0x007;
pub const RECEIVE_PORT0_CAP: std::ops::RangeInclusive<u32> = 0x008..=0x009;
pub const RECEIVE_PORT1_CAP: std::ops::RangeInclusive<u32> = 0x00a..=0x00b;
pub const I2C_SPEED_CAP: u32 = 0x00c;
pub const EDP_CONFIGURATION_CAP: u32 = 0x00d;
pub const TRAINING_AUX_RD_INTERVAL: u32 = 0x00e;

pub const MSTM_CAP: u32 = 0x021;
pub const GUID: std::ops::RangeInclusive<u32> = 0x030..=0x03f;

pub const LINK_BW_SET: u32 = 0x100;
pub const LANE_COUNT_SET: u32 = 0x101;
pub const MSTM_CTRL: u32 = 0x111;
pub const SINK_COUNT: u32 = 0x200;

pub const RESERVED_BLOCKS: [std::ops::RangeInclusive<u32>; 2] = [0x040..=0x07f, 0x0f0..=0x0ff];
