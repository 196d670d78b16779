//! Byte sources: hex dumps and AUX transaction traces.

mod hex;
mod trace;

pub use hex::{parse_address, parse_hex_bytes};
pub use trace::{TraceSource, parse_trace_line};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Read,
    Write,
}

/// One AUX transfer extracted from a trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// 1-based line number of the first trace line.
    pub line: usize,
    pub timestamp: Option<f64>,
    pub direction: Direction,
    pub port: String,
    pub address: u32,
    /// Transfer type token, e.g. `AUX`.
    pub kind: String,
    /// Return code reported by the driver.
    pub ret: i32,
    pub bytes: Vec<u8>,
}

impl Transaction {
    /// Address one past the last byte.
    pub fn end_address(&self) -> u32 {
        self.address.wrapping_add(self.bytes.len() as u32)
    }
}

pub trait TransactionSource {
    fn next_transaction(&mut self) -> Result<Option<Transaction>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex byte '{token}'")]
    InvalidHex { token: String },
    #[error("invalid address '{text}'")]
    InvalidAddress { text: String },
}
