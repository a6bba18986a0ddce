//! Forward-reference bookkeeping for the writer

use std::collections::BTreeMap;

use super::error::{CursorError, CursorResult};

#[derive(Debug, Clone, Copy)]
struct Slot {
    position: usize,
    width: usize,
    filled: bool,
}

/// Named placeholder positions in a write buffer
///
/// Slots are plain buffer offsets, so the table never borrows the buffer it
/// describes. It lives exactly as long as one encode.
#[derive(Debug, Default)]
pub struct PatchTable {
    slots: BTreeMap<String, Slot>,
}

impl PatchTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` at `position` with a placeholder of `width` bytes
    pub fn register(&mut self, name: &str, position: usize, width: usize) -> CursorResult<()> {
        if self.slots.contains_key(name) {
            return Err(CursorError::DuplicateReservation(name.to_string()));
        }
        self.slots.insert(
            name.to_string(),
            Slot {
                position,
                width,
                filled: false,
            },
        );
        Ok(())
    }

    /// Look up the position of `name` and mark it filled
    ///
    /// A slot may be filled more than once; the last fill wins.
    pub fn resolve(&mut self, name: &str, width: usize) -> CursorResult<usize> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| CursorError::UnresolvedReservation(name.to_string()))?;

        if slot.width != width {
            return Err(CursorError::ReservationWidthMismatch {
                name: name.to_string(),
                reserved: slot.width,
                requested: width,
            });
        }

        slot.filled = true;
        Ok(slot.position)
    }

    /// Names registered but never filled, in sorted order
    pub fn unresolved(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.filled)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Number of registered slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
