//! Value formatters for decoded fields.

pub fn decimal(value: u128) -> String {
    value.to_string()
}

pub fn hex(value: u128) -> String {
    format!("{value:#x}")
}

/// Fixed-width hex, used for GUIDs and capability blocks.
pub fn hex128(value: u128) -> String {
    format!("{value:032x}")
}

/// Picks a label for a one-bit flag.
pub fn choice(set: &'static str, clear: &'static str) -> impl Fn(u128) -> String {
    move |value| (if value != 0 { set } else { clear }).to_string()
}

/// Link rate codes are multiples of 0.27 Gbps.
///
/// # Examples
/// ```
/// use dpcd_core::fields::format::link_rate;
///
/// assert_eq!(link_rate(0x14), "5.4 Gpbs");
/// assert_eq!(link_rate(0x06), "1.62 Gpbs");
/// ```
pub fn link_rate(value: u128) -> String {
    let centi = value * 27;
    let whole = centi / 100;
    let frac = centi % 100;
    if frac == 0 {
        format!("{whole} Gpbs")
    } else if frac % 10 == 0 {
        format!("{whole}.{} Gpbs", frac / 10)
    } else {
        format!("{whole}.{frac:02} Gpbs")
    }
}

/// Revision byte split into major and minor nibbles.
pub fn revision(value: u128) -> String {
    format!("{}.{}", value >> 4, value & 0xf)
}
