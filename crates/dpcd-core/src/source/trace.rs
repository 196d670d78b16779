use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{Direction, SourceError, Transaction, TransactionSource};

/// `[ts] <tags> <port>: 0xADDR <kind> ->|<- (ret= N) hh hh ...`
static TRACE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?:\[\s*(?P<ts>[0-9]+(?:\.[0-9]+)?)\]\s*)?",
        r"(?:.*\]\s+)?",
        r"(?P<port>[^\]]+?):\s+0x(?P<addr>[0-9a-fA-F]+)\s+",
        r"(?P<kind>\S+)\s+(?P<arrow>->|<-)\s+",
        r"\(ret=\s*(?P<ret>-?[0-9]+)\)",
        r"(?P<data>(?:\s+[0-9a-fA-F]{1,2})*)\s*$",
    ))
    .expect("trace line pattern compiles")
});

/// Parses one kernel AUX trace line, e.g.
///
/// ```text
/// [   12.500000] [drm:drm_dp_dpcd_read] AUX A/DDI A/PHY A: 0x00000 AUX -> (ret=  3) 11 14 84
/// ```
///
/// `->` marks a read and `<-` a write. The listed bytes are clipped to the
/// return code. Lines that do not follow this shape yield `None`; the
/// `line` field of the result is left at 0 for the caller to fill in.
///
/// # Examples
/// ```
/// use dpcd_core::source::parse_trace_line;
/// use dpcd_core::Direction;
///
/// let line = "[ 1.5] AUX B/port B: 0x00111 AUX <- (ret=  1) 03";
/// let tx = parse_trace_line(line).unwrap();
/// assert_eq!(tx.address, 0x111);
/// assert_eq!(tx.direction, Direction::Write);
/// assert_eq!(tx.bytes, vec![0x03]);
/// ```
pub fn parse_trace_line(line: &str) -> Option<Transaction> {
    let caps = TRACE_LINE.captures(line)?;

    let timestamp = caps.name("ts").and_then(|ts| ts.as_str().parse::<f64>().ok());
    let port = caps["port"].trim();
    if port.is_empty() {
        return None;
    }
    let address = u32::from_str_radix(&caps["addr"], 16).ok()?;
    let direction = match &caps["arrow"] {
        "->" => Direction::Read,
        _ => Direction::Write,
    };
    let ret = caps["ret"].parse::<i32>().ok()?;

    let mut bytes = caps["data"]
        .split_whitespace()
        .map(|token| u8::from_str_radix(token, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    bytes.truncate(usize::try_from(ret).unwrap_or(0));

    Some(Transaction {
        line: 0,
        timestamp,
        direction,
        port: port.to_string(),
        address,
        kind: caps["kind"].to_string(),
        ret,
        bytes,
    })
}

/// Line-oriented transaction source over any buffered reader.
pub struct TraceSource<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl TraceSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> TransactionSource for TraceSource<R> {
    fn next_transaction(&mut self) -> Result<Option<Transaction>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let Some(mut transaction) = parse_trace_line(&self.buf) else {
                log::trace!("line {}: not an AUX transaction", self.line_no);
                continue;
            };
            if transaction.ret < 0 {
                log::debug!(
                    "line {}: skipping failed transfer at {:#07x} (ret={})",
                    self.line_no,
                    transaction.address,
                    transaction.ret
                );
                continue;
            }
            transaction.line = self.line_no;
            return Ok(Some(transaction));
        }
    }
}
