//! Fixed-capacity session slots for the authoritative server
//!
//! Every connected client owns exactly one slot for as long as it stays
//! connected. The slot index doubles as the player ID carried on the wire, so
//! the table is a plain array indexed by slot rather than a map keyed by some
//! connection identifier:
//! - `accept` hands out the lowest free slot, or refuses when all are taken
//! - `release` frees a slot and hands the connection back for closing
//! - iteration always runs in slot order, which fixes the order inputs are
//!   ingested and hits are resolved
//!
//! The table is generic over the connection handle so it can be exercised
//! without real sockets.

use crate::error::SessionError;
use shared::MAX_PLAYERS;

/// Owns up to `MAX_PLAYERS` connections, one per slot.
#[derive(Debug)]
pub struct SessionTable<C> {
    slots: [Option<C>; MAX_PLAYERS],
}

impl<C> SessionTable<C> {
    /// Creates a table with every slot free.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Binds a connection to the first inactive slot
    ///
    /// Returns the slot index the caller must announce in a Welcome message.
    /// When every slot is taken the connection is dropped here, which closes
    /// it without any application-level rejection.
    pub fn accept(&mut self, connection: C) -> Result<usize, SessionError> {
        match self.slots.iter().position(Option::is_none) {
            Some(slot) => {
                self.slots[slot] = Some(connection);
                Ok(slot)
            }
            None => Err(SessionError::TableFull(MAX_PLAYERS)),
        }
    }

    /// Frees a slot and returns the connection that held it
    ///
    /// Releasing an already free or out-of-range slot is a no-op that returns
    /// `None`, so teardown paths can call it unconditionally.
    pub fn release(&mut self, slot: usize) -> Option<C> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub fn get(&self, slot: usize) -> Option<&C> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut C> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.get(slot).is_some()
    }

    /// Active `(slot, connection)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, conn)| conn.as_ref().map(|c| (slot, c)))
    }

    /// Snapshot of the currently active slot indices, in slot order.
    ///
    /// Phase functions iterate over this copy so they are free to release
    /// slots while walking it.
    pub fn active_slots(&self) -> Vec<usize> {
        self.iter().map(|(slot, _)| slot).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_PLAYERS
    }

    pub fn capacity(&self) -> usize {
        MAX_PLAYERS
    }
}

impl<C> Default for SessionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
