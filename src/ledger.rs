use std::collections::HashMap;

use crate::data::{Room, RoomId};

/// Seats committed to each room during a single allocation run.
///
/// Capacity is advisory: `commit` never refuses, so `remaining` can go negative.
#[derive(Debug, Clone, Default)]
pub struct RoomLedger {
    committed: HashMap<RoomId, u64>,
}

impl RoomLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger pre-charged with `(room, students)` pairs, typically the
    /// approved schedules carried over from earlier runs.
    pub fn seeded<I>(charges: I) -> Self
    where
        I: IntoIterator<Item = (RoomId, u32)>,
    {
        let mut ledger = Self::new();
        for (room_id, seats) in charges {
            ledger.commit(room_id, seats);
        }
        ledger
    }

    pub fn committed(&self, room_id: RoomId) -> u64 {
        self.committed.get(&room_id).copied().unwrap_or(0)
    }

    pub fn is_empty_room(&self, room_id: RoomId) -> bool {
        self.committed(room_id) == 0
    }

    /// Capacity minus committed seats; negative once the room is overbooked.
    pub fn remaining(&self, room: &Room) -> i64 {
        room.capacity as i64 - self.committed(room.id) as i64
    }

    pub fn commit(&mut self, room_id: RoomId, seats: u32) {
        *self.committed.entry(room_id).or_insert(0) += seats as u64;
    }
}
