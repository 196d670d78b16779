//! Plain-text layout for decoded reports.

use std::fmt::{self, Write};

use dpcd_core::{Report, TransactionReport};

pub fn report_text(report: &Report) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

pub fn trace_text(reports: &[TransactionReport]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for (index, entry) in reports.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write!(out, "# line {}", entry.line)?;
        if let Some(timestamp) = entry.timestamp {
            write!(out, " [{timestamp:.6}]")?;
        }
        let direction = match entry.direction {
            dpcd_core::Direction::Read => "read",
            dpcd_core::Direction::Write => "write",
        };
        writeln!(out, " {} {} {:#x}", entry.port, direction, entry.address)?;

        match (&entry.report, &entry.error) {
            (Some(report), _) => write_report(&mut out, report)?,
            (None, Some(error)) => writeln!(out, "  error: {error}")?,
            (None, None) => {}
        }
    }
    Ok(out)
}

fn write_report(out: &mut impl Write, report: &Report) -> fmt::Result {
    for record in &report.records {
        writeln!(
            out,
            "{:<#10x}{:<41}[{}]",
            record.address,
            record.name,
            hex_list(&record.raw_bytes)
        )?;
        for field in &record.fields {
            writeln!(
                out,
                "  [{:<3}{}:{}] {:40}{}",
                field.offset, field.start_bit, field.end_bit, field.label, field.formatted_value
            )?;
        }
    }
    for (address, value) in &report.unparsed {
        writeln!(out, "{:<#10x}{:<41}[{:#x}]", address, "UNKNOWN", value)?;
    }
    Ok(())
}

fn hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:#x}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_header_and_field_columns() {
        let report = dpcd_core::decode(&[0x11], 0).expect("decode");
        let text = report_text(&report).expect("render");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], format!("{:<10}{:<41}[0x11]", "0x0", "DPCD_REV"));
        assert_eq!(lines[1], format!("  [0  4:7] {:40}1", "Major rev"));
        assert_eq!(lines[2], format!("  [0  0:3] {:40}1", "Minor rev"));
    }

    #[test]
    fn unparsed_bytes_render_as_unknown() {
        let report = dpcd_core::decode(&[0x5a], 0x300).expect("decode");
        let text = report_text(&report).expect("render");
        assert_eq!(text, format!("{:<10}{:<41}[0x5a]\n", "0x300", "UNKNOWN"));
    }

    #[test]
    fn multi_byte_record_lists_every_byte() {
        let report = dpcd_core::decode(&[0x02, 0x07], 0x008).expect("decode");
        let text = report_text(&report).expect("render");
        assert!(text.starts_with(&format!("{:<10}{:<41}[0x2, 0x7]", "0x8", "RECEIVE_PORT0_CAP")));
    }
}
