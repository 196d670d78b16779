//! Descriptor registry.
//!
//! Lookup runs in two phases. The interval phase finds candidates: an index
//! keyed by start address for exact-start registers, and a short list of
//! range entries for reserved blocks and probed windows. The discriminant
//! phase runs each containing window's probe once and resolves the value
//! through a map. Among all candidates the earliest registered descriptor
//! wins, so registration order alone settles overlaps.

mod descriptor;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

pub use descriptor::{DecodeFn, Descriptor, Length, Matcher, ProbeFn};

use crate::{registers, sideband};

static BUILTIN: OnceLock<Registry> = OnceLock::new();

/// Ordered, immutable set of descriptors.
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<Descriptor>,
    by_start: HashMap<u32, usize>,
    ranges: Vec<usize>,
    windows: Vec<Window>,
}

/// Descriptors sharing one probed interval.
#[derive(Debug)]
struct Window {
    start: u32,
    end: u32,
    probe: ProbeFn,
    by_value: HashMap<u8, usize>,
}

impl Registry {
    /// Builds a registry; earlier descriptors take precedence on overlap.
    pub fn new(descriptors: impl IntoIterator<Item = Descriptor>) -> Self {
        let descriptors: Vec<Descriptor> = descriptors.into_iter().collect();
        let mut by_start = HashMap::new();
        let mut ranges = Vec::new();
        let mut windows: Vec<Window> = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            match descriptor.matcher {
                Matcher::ExactStart => {
                    by_start.entry(descriptor.start).or_insert(index);
                }
                Matcher::InRange => ranges.push(index),
                Matcher::Discriminant { probe, value } => {
                    let position = windows
                        .iter()
                        .position(|w| w.start == descriptor.start && w.end == descriptor.end);
                    let window = match position {
                        Some(position) => &mut windows[position],
                        None => {
                            windows.push(Window {
                                start: descriptor.start,
                                end: descriptor.end,
                                probe,
                                by_value: HashMap::new(),
                            });
                            let last = windows.len() - 1;
                            &mut windows[last]
                        }
                    };
                    if let Entry::Vacant(slot) = window.by_value.entry(value) {
                        slot.insert(index);
                    } else {
                        log::warn!(
                            "{} shadowed: discriminant {value:#04x} already registered",
                            descriptor.name
                        );
                    }
                }
            }
        }

        log::debug!(
            "registry built: {} descriptors, {} ranges, {} probed windows",
            descriptors.len(),
            ranges.len(),
            windows.len()
        );

        Self {
            descriptors,
            by_start,
            ranges,
            windows,
        }
    }

    /// Registry holding every built-in register and sideband message.
    pub fn builtin() -> &'static Registry {
        BUILTIN.get_or_init(|| Registry::new(builtin_descriptors()))
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Finds the descriptor that claims `address`, given the bytes from that
    /// address onward.
    pub fn lookup(&self, address: u32, bytes: &[u8]) -> Option<&Descriptor> {
        let mut best = self.by_start.get(&address).copied();

        // `ranges` is in registration order, so the first hit is the earliest.
        if let Some(&index) = self
            .ranges
            .iter()
            .find(|&&index| self.descriptors[index].contains(address))
        {
            best = Some(best.map_or(index, |current| current.min(index)));
        }

        for window in &self.windows {
            if !(window.start..=window.end).contains(&address) {
                continue;
            }
            let Some(value) = (window.probe)(address, bytes) else {
                continue;
            };
            if let Some(&index) = window.by_value.get(&value) {
                best = Some(best.map_or(index, |current| current.min(index)));
            }
        }

        best.map(|index| &self.descriptors[index])
    }
}

/// Built-in descriptor list: fixed registers, reserved blocks, then sideband
/// messages.
pub fn builtin_descriptors() -> Vec<Descriptor> {
    let mut descriptors = registers::descriptors();
    descriptors.extend(sideband::descriptors());
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldError, RecordBuilder};

    fn noop(_: &mut RecordBuilder<'_>) -> Result<(), FieldError> {
        Ok(())
    }

    fn first_byte(_: u32, bytes: &[u8]) -> Option<u8> {
        bytes.first().copied()
    }

    #[test]
    fn exact_start_matches_only_first_address() {
        let registry = Registry::new([Descriptor::register("PAIR", 8, 9, noop)]);
        assert_eq!(registry.lookup(8, &[0, 0]).map(|d| d.name), Some("PAIR"));
        assert!(registry.lookup(9, &[0]).is_none());
    }

    #[test]
    fn range_matches_inside_interval() {
        let registry = Registry::new([Descriptor::range("RESERVED", 0x40, 0x7f, noop)]);
        assert!(registry.lookup(0x3f, &[0]).is_none());
        assert_eq!(registry.lookup(0x55, &[0]).map(|d| d.name), Some("RESERVED"));
        assert_eq!(registry.lookup(0x7f, &[0]).map(|d| d.name), Some("RESERVED"));
    }

    #[test]
    fn earliest_registration_wins_on_overlap() {
        let registry = Registry::new([
            Descriptor::range("BLOCK", 0x10, 0x1f, noop),
            Descriptor::register("INNER", 0x12, 0x12, noop),
        ]);
        assert_eq!(registry.lookup(0x12, &[0]).map(|d| d.name), Some("BLOCK"));

        let registry = Registry::new([
            Descriptor::register("INNER", 0x12, 0x12, noop),
            Descriptor::range("BLOCK", 0x10, 0x1f, noop),
        ]);
        assert_eq!(registry.lookup(0x12, &[0]).map(|d| d.name), Some("INNER"));
    }

    #[test]
    fn discriminant_selects_message() {
        let registry = Registry::new([
            Descriptor::message("A", 0x100, 0x1ff, first_byte, 1, noop),
            Descriptor::message("B", 0x100, 0x1ff, first_byte, 2, noop),
        ]);
        assert_eq!(registry.lookup(0x100, &[2]).map(|d| d.name), Some("B"));
        assert_eq!(registry.lookup(0x180, &[1]).map(|d| d.name), Some("A"));
        assert!(registry.lookup(0x100, &[3]).is_none());
        assert!(registry.lookup(0x200, &[1]).is_none());
    }

    #[test]
    fn duplicate_discriminant_keeps_first() {
        let registry = Registry::new([
            Descriptor::message("FIRST", 0, 0xf, first_byte, 7, noop),
            Descriptor::message("SECOND", 0, 0xf, first_byte, 7, noop),
        ]);
        assert_eq!(registry.lookup(0, &[7]).map(|d| d.name), Some("FIRST"));
    }

    #[test]
    fn builtin_registry_is_shared() {
        let a = Registry::builtin() as *const Registry;
        let b = Registry::builtin() as *const Registry;
        assert_eq!(a, b);
        assert!(!Registry::builtin().descriptors().is_empty());
    }
}
