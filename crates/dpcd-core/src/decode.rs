use thiserror::Error;

use crate::fields::{FieldError, RecordBuilder};
use crate::registry::{Descriptor, Length, Registry};
use crate::{DecodeRecord, Report};

/// Errors that abort a decode invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A descriptor asked for bits outside its own bytes.
    #[error("descriptor {name} at {address:#07x} is miswired: {source}")]
    Configuration {
        name: &'static str,
        address: u32,
        #[source]
        source: FieldError,
    },
    /// The buffer ended inside a fixed-size register.
    #[error("{name} at {address:#07x} needs {needed} bytes, buffer holds {available}")]
    Truncated {
        name: &'static str,
        address: u32,
        needed: usize,
        available: usize,
    },
}

impl Registry {
    /// Scans `buffer` from `base_address`, producing one record per matched
    /// descriptor and an unparsed entry for every other byte.
    pub fn decode(&self, buffer: &[u8], base_address: u32) -> Result<Report, DecodeError> {
        let mut report = Report::default();
        let mut i = 0usize;
        while i < buffer.len() {
            let address = base_address.wrapping_add(i as u32);
            let rest = &buffer[i..];
            let record = match self.lookup(address, rest) {
                Some(descriptor) => decode_one(descriptor, address, rest)?,
                None => None,
            };
            match record {
                Some(record) => {
                    log::trace!(
                        "{} matched at {address:#07x} ({} bytes)",
                        record.name,
                        record.raw_bytes.len()
                    );
                    i += record.raw_bytes.len();
                    report.records.push(record);
                }
                None => {
                    log::debug!("no descriptor for {address:#07x}, byte {:#04x}", rest[0]);
                    report.unparsed.insert(address, rest[0]);
                    i += 1;
                }
            }
        }
        Ok(report)
    }
}

/// Decodes the record `descriptor` claims at `address`. A message whose
/// header does not fit yields `None` and its bytes stay unparsed.
fn decode_one(
    descriptor: &Descriptor,
    address: u32,
    rest: &[u8],
) -> Result<Option<DecodeRecord>, DecodeError> {
    let window = match descriptor.length {
        Length::Fixed => {
            let needed = descriptor.byte_len();
            if rest.len() < needed {
                return Err(DecodeError::Truncated {
                    name: descriptor.name,
                    address,
                    needed,
                    available: rest.len(),
                });
            }
            &rest[..needed]
        }
        Length::ToEnd | Length::Variable => {
            let len = descriptor.bytes_to_end(address).min(rest.len());
            &rest[..len]
        }
    };

    let mut builder = RecordBuilder::new(window);
    match (descriptor.decode)(&mut builder) {
        Ok(()) => {}
        Err(FieldError::TooShort { needed, actual }) if descriptor.length == Length::Variable => {
            log::debug!(
                "{} at {address:#07x} needs {needed} bytes, {actual} available; left unparsed",
                descriptor.name
            );
            return Ok(None);
        }
        Err(err) => return Err(classify(descriptor, address, err)),
    }

    let consumed = match descriptor.length {
        Length::Fixed | Length::ToEnd => window.len(),
        // always advance, even if a message decoder read nothing
        Length::Variable => builder.consumed().clamp(1, window.len()),
    };

    Ok(Some(DecodeRecord {
        name: descriptor.name.to_string(),
        address,
        raw_bytes: window[..consumed].to_vec(),
        fields: builder.into_fields(),
    }))
}

fn classify(descriptor: &Descriptor, address: u32, err: FieldError) -> DecodeError {
    match err {
        FieldError::TooShort { needed, actual } => DecodeError::Truncated {
            name: descriptor.name,
            address,
            needed,
            available: actual,
        },
        source => DecodeError::Configuration {
            name: descriptor.name,
            address,
            source,
        },
    }
}
