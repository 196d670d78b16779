use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{Direction, SourceError, TraceSource, Transaction, TransactionSource};
use crate::{Registry, Report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectionFilter {
    Read,
    Write,
    #[default]
    Both,
}

impl DirectionFilter {
    fn accepts(self, direction: Direction) -> bool {
        match self {
            DirectionFilter::Both => true,
            DirectionFilter::Read => direction == Direction::Read,
            DirectionFilter::Write => direction == Direction::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Join address-contiguous transfers before decoding.
    pub coalesce: bool,
    pub direction: DirectionFilter,
}

/// Decode outcome for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReport {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    pub direction: Direction,
    pub port: String,
    pub address: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn decode_trace_file(
    path: &Path,
    options: &DecodeOptions,
) -> Result<Vec<TransactionReport>, AnalysisError> {
    let source = TraceSource::open(path)?;
    Ok(decode_source(source, Registry::builtin(), options)?)
}

/// Reads every transaction from `source` and decodes it. A transaction that
/// fails to decode is reported with its error; the others are unaffected.
pub fn decode_source<S: TransactionSource>(
    mut source: S,
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<Vec<TransactionReport>, SourceError> {
    let mut transactions = Vec::new();
    while let Some(transaction) = source.next_transaction()? {
        if options.direction.accepts(transaction.direction) {
            transactions.push(transaction);
        }
    }
    if options.coalesce {
        transactions = coalesce(transactions);
    }
    Ok(decode_transactions(&transactions, registry))
}

/// Merges each transaction into its predecessor when both go the same way on
/// the same port and the second starts where the first ended.
///
/// # Examples
/// ```
/// use dpcd_core::{Direction, Transaction, coalesce};
///
/// let tx = |address, bytes: &[u8]| Transaction {
///     line: 1,
///     timestamp: None,
///     direction: Direction::Read,
///     port: "AUX A".to_string(),
///     address,
///     kind: "AUX".to_string(),
///     ret: bytes.len() as i32,
///     bytes: bytes.to_vec(),
/// };
/// let merged = coalesce(vec![tx(0x1400, &[1, 2]), tx(0x1402, &[3])]);
/// assert_eq!(merged.len(), 1);
/// assert_eq!(merged[0].bytes, vec![1, 2, 3]);
/// ```
pub fn coalesce(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        if let Some(last) = merged.last_mut() {
            if last.direction == transaction.direction
                && last.port == transaction.port
                && last.end_address() == transaction.address
                && !transaction.bytes.is_empty()
            {
                last.bytes.extend_from_slice(&transaction.bytes);
                last.ret = last.bytes.len() as i32;
                continue;
            }
        }
        merged.push(transaction);
    }
    merged
}

/// Decodes independent transactions in parallel against one shared registry.
/// Output order matches input order.
pub fn decode_transactions(
    transactions: &[Transaction],
    registry: &Registry,
) -> Vec<TransactionReport> {
    if transactions.is_empty() {
        return Vec::new();
    }
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(transactions.len());
    let chunk = transactions.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = transactions
            .chunks(chunk)
            .map(|batch| {
                scope.spawn(move || {
                    batch
                        .iter()
                        .map(|transaction| decode_transaction(transaction, registry))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

fn decode_transaction(transaction: &Transaction, registry: &Registry) -> TransactionReport {
    let (report, error) = match registry.decode(&transaction.bytes, transaction.address) {
        Ok(report) => (Some(report), None),
        Err(err) => {
            log::warn!("line {}: {err}", transaction.line);
            (None, Some(err.to_string()))
        }
    };
    TransactionReport {
        line: transaction.line,
        timestamp: transaction.timestamp,
        direction: transaction.direction,
        port: transaction.port.clone(),
        address: transaction.address,
        report,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(line: usize, direction: Direction, address: u32, bytes: &[u8]) -> Transaction {
        Transaction {
            line,
            timestamp: Some(line as f64),
            direction,
            port: "AUX A".to_string(),
            address,
            kind: "AUX".to_string(),
            ret: bytes.len() as i32,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn coalesce_joins_only_contiguous_same_direction() {
        let merged = coalesce(vec![
            tx(1, Direction::Read, 0x1400, &[0x10, 0x00]),
            tx(2, Direction::Read, 0x1402, &[0x00, 0xc0]),
            tx(3, Direction::Write, 0x1404, &[0x12]),
            tx(4, Direction::Read, 0x1410, &[0x00]),
        ]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].bytes, vec![0x10, 0x00, 0x00, 0xc0]);
        assert_eq!(merged[0].line, 1);
        assert_eq!(merged[1].direction, Direction::Write);
    }

    #[test]
    fn coalesced_reads_rebuild_split_reply() {
        // QUERY_PAYLOAD reply read in two AUX transfers
        let parts = vec![
            tx(1, Direction::Read, 0x1400, &[0x10, 0x00, 0x00, 0xc0, 0x12]),
            tx(2, Direction::Read, 0x1405, &[0x30, 0x01, 0x2c]),
        ];
        let split = decode_transactions(&parts, Registry::builtin());
        let first = split[0].report.as_ref().unwrap();
        assert_eq!(first.records[0].name, "QUERY_PAYLOAD");
        assert!(first.records[0].field("Allocated PBN").is_none());

        let joined = decode_transactions(&coalesce(parts), Registry::builtin());
        assert_eq!(joined.len(), 1);
        let report = joined[0].report.as_ref().unwrap();
        assert_eq!(report.records[0].name, "QUERY_PAYLOAD");
        assert_eq!(report.records[0].field("Allocated PBN").unwrap().raw_value, 300);
    }

    #[test]
    fn failed_transaction_does_not_stop_others() {
        let transactions = vec![
            tx(1, Direction::Read, 0x008, &[0x00]),
            tx(2, Direction::Read, 0x000, &[0x12]),
        ];
        let reports = decode_transactions(&transactions, Registry::builtin());
        assert!(reports[0].report.is_none());
        assert!(reports[0].error.as_deref().unwrap().contains("RECEIVE_PORT0_CAP"));
        assert_eq!(reports[1].report.as_ref().unwrap().records[0].name, "DPCD_REV");
    }

    #[test]
    fn parallel_decode_keeps_input_order() {
        let transactions: Vec<_> = (0..64)
            .map(|i| tx(i + 1, Direction::Read, 0x001, &[i as u8]))
            .collect();
        let reports = decode_transactions(&transactions, Registry::builtin());
        assert_eq!(reports.len(), 64);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.line, i + 1);
            let record = &report.report.as_ref().unwrap().records[0];
            assert_eq!(record.raw_bytes, vec![i as u8]);
        }
    }

    #[test]
    fn direction_filter_drops_writes() {
        let text = "AUX A: 0x00000 AUX -> (ret=1) 11\nAUX A: 0x00111 AUX <- (ret=1) 03\n";
        let options = DecodeOptions {
            coalesce: false,
            direction: DirectionFilter::Read,
        };
        let reports =
            decode_source(TraceSource::new(text.as_bytes()), Registry::builtin(), &options)
                .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].direction, Direction::Read);
    }
}
