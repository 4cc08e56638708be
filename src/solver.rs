use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::time::Instant;

use crate::data::{ClassSection, Room, RoomId, SectionId};
use crate::error::{Result, SchedulingError};
use crate::grouping::SectionGroup;
use crate::ledger::RoomLedger;

/// How a section ended up in its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTier {
    /// The whole group fit in one empty room.
    WholeGroup,
    /// Packed into a room this group already uses.
    Packed,
    /// Best-fit into an empty room on its own.
    EmptyRoom,
    /// No feasible room; put into the room with the most seats left.
    Forced,
}

/// One section-to-room decision produced by the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub section_id: SectionId,
    pub room_id: RoomId,
    pub students: u32,
    pub tier: PlacementTier,
}

/// Greedy room allocation over a sorted group queue.
///
/// Active rooms are ordered by capacity, largest first, and that order breaks ties
/// everywhere below. Each group is first tried whole against the empty room with the
/// least waste. When that fails its sections go one at a time: into a room the group
/// already occupies if it fits, else best-fit into an empty room, else into whichever
/// room has the most seats left even if that overbooks it.
pub fn allocate(
    rooms: &[Room],
    groups: &[SectionGroup],
    ledger: &mut RoomLedger,
) -> Result<Vec<Placement>> {
    let start_time = Instant::now();
    let mut rooms_sorted: Vec<&Room> = rooms.iter().filter(|r| r.is_active).collect();
    if rooms_sorted.is_empty() {
        return Err(SchedulingError::NoActiveRooms);
    }
    rooms_sorted.sort_by(|a, b| b.capacity.cmp(&a.capacity));
    let room_map: HashMap<RoomId, &Room> = rooms_sorted.iter().map(|r| (r.id, *r)).collect();

    info!(
        "Allocating {} groups into {} active rooms...",
        groups.len(),
        rooms_sorted.len()
    );

    let mut placements = Vec::new();
    for group in groups {
        let group_students = group.total_students();
        if let Some(room) = best_fit_empty(&rooms_sorted, ledger, group_students) {
            debug!(
                "group of {} section(s) ({} students) fits whole in room {}",
                group.sections.len(),
                group_students,
                room.number
            );
            for section in &group.sections {
                placements.push(place(ledger, section, room, PlacementTier::WholeGroup));
            }
            continue;
        }

        debug!(
            "no empty room holds {} students, splitting group of {} section(s)",
            group_students,
            group.sections.len()
        );
        let mut used_by_group: Vec<RoomId> = Vec::new();
        for section in &group.sections {
            let placement =
                place_section(&rooms_sorted, &room_map, &mut used_by_group, ledger, section);
            placements.push(placement);
        }
    }

    info!(
        "Placed {} sections in {:.2?}",
        placements.len(),
        start_time.elapsed()
    );
    Ok(placements)
}

fn place_section(
    rooms_sorted: &[&Room],
    room_map: &HashMap<RoomId, &Room>,
    used_by_group: &mut Vec<RoomId>,
    ledger: &mut RoomLedger,
    section: &ClassSection,
) -> Placement {
    let need = section.students_count as i64;

    // first room in insertion order with enough seats left
    let packed = used_by_group
        .iter()
        .filter_map(|id| room_map.get(id).copied())
        .find(|room| ledger.remaining(room) >= need);
    if let Some(room) = packed {
        return place(ledger, section, room, PlacementTier::Packed);
    }

    if let Some(room) = best_fit_empty(rooms_sorted, ledger, section.students_count as u64) {
        remember(used_by_group, room.id);
        return place(ledger, section, room, PlacementTier::EmptyRoom);
    }

    let room = most_remaining(rooms_sorted, ledger).unwrap_or(rooms_sorted[0]);
    remember(used_by_group, room.id);
    if ledger.remaining(room) < need {
        warn!(
            "section {} ({} students) forced into room {} with {} seats left",
            section.name,
            section.students_count,
            room.number,
            ledger.remaining(room)
        );
    }
    place(ledger, section, room, PlacementTier::Forced)
}

/// Empty room with `capacity >= need` and the least waste; first one wins ties.
fn best_fit_empty<'a>(rooms_sorted: &[&'a Room], ledger: &RoomLedger, need: u64) -> Option<&'a Room> {
    let mut best: Option<(&Room, u64)> = None;
    for room in rooms_sorted {
        let capacity = room.capacity as u64;
        if !ledger.is_empty_room(room.id) || capacity < need {
            continue;
        }
        let waste = capacity - need;
        if best.is_none_or(|(_, min_waste)| waste < min_waste) {
            best = Some((room, waste));
        }
    }
    best.map(|(room, _)| room)
}

/// Room with the most seats left, negative balances included; first one wins ties.
fn most_remaining<'a>(rooms_sorted: &[&'a Room], ledger: &RoomLedger) -> Option<&'a Room> {
    let mut best: Option<(&Room, i64)> = None;
    for room in rooms_sorted {
        let remaining = ledger.remaining(room);
        if best.is_none_or(|(_, max)| remaining > max) {
            best = Some((room, remaining));
        }
    }
    best.map(|(room, _)| room)
}

fn remember(used_by_group: &mut Vec<RoomId>, room_id: RoomId) {
    if !used_by_group.contains(&room_id) {
        used_by_group.push(room_id);
    }
}

fn place(
    ledger: &mut RoomLedger,
    section: &ClassSection,
    room: &Room,
    tier: PlacementTier,
) -> Placement {
    ledger.commit(room.id, section.students_count);
    trace!(
        "section {} -> room {} ({:?}, {} seats left)",
        section.name,
        room.number,
        tier,
        ledger.remaining(room)
    );
    Placement {
        section_id: section.id,
        room_id: room.id,
        students: section.students_count,
        tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::GroupKey;
    use uuid::Uuid;

    fn room(number: &str, capacity: u32) -> Room {
        Room {
            id: Uuid::new_v4(),
            campus: "Centro".to_string(),
            building: "Main".to_string(),
            block: "A".to_string(),
            floor: 1,
            number: number.to_string(),
            capacity,
            room_type: Default::default(),
            is_active: true,
        }
    }

    fn section(name: &str, students: u32) -> ClassSection {
        ClassSection {
            id: Uuid::new_v4(),
            name: name.to_string(),
            shift: "night".to_string(),
            semester: 1,
            students_count: students,
            course_id: Uuid::nil(),
            subject_id: None,
        }
    }

    fn group(sections: Vec<ClassSection>) -> SectionGroup {
        let key = (sections.len() > 1).then(|| GroupKey {
            subject_id: Uuid::new_v4(),
            offered_month: "March".to_string(),
        });
        SectionGroup { key, sections }
    }

    fn room_of(placements: &[Placement], section: &ClassSection) -> RoomId {
        placements
            .iter()
            .find(|p| p.section_id == section.id)
            .map(|p| p.room_id)
            .unwrap()
    }

    #[test]
    fn best_fit_prefers_least_waste() {
        let r60 = room("60", 60);
        let r50 = room("50", 50);
        let s = section("S", 45);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[r60.clone(), r50.clone()],
            &[group(vec![s.clone()])],
            &mut ledger,
        )
        .unwrap();
        assert_eq!(room_of(&placements, &s), r50.id);
        assert_eq!(placements[0].tier, PlacementTier::WholeGroup);
    }

    #[test]
    fn equal_waste_goes_to_first_in_capacity_order() {
        let a = room("A", 50);
        let b = room("B", 50);
        let s = section("S", 30);
        let mut ledger = RoomLedger::new();
        let placements =
            allocate(&[a.clone(), b.clone()], &[group(vec![s.clone()])], &mut ledger).unwrap();
        assert_eq!(room_of(&placements, &s), a.id);
    }

    #[test]
    fn cooperative_group_shares_one_room() {
        let big = room("100", 100);
        let s1 = section("S1", 40);
        let s2 = section("S2", 40);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[big.clone()],
            &[group(vec![s1.clone(), s2.clone()])],
            &mut ledger,
        )
        .unwrap();
        assert_eq!(room_of(&placements, &s1), big.id);
        assert_eq!(room_of(&placements, &s2), big.id);
        assert_eq!(ledger.committed(big.id), 80);
    }

    #[test]
    fn oversized_group_splits_then_packs_or_forces() {
        let a = room("A", 50);
        let b = room("B", 50);
        let s1 = section("S1", 40);
        let s2 = section("S2", 40);
        let s3 = section("S3", 20);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[a.clone(), b.clone()],
            &[group(vec![s1.clone(), s2.clone(), s3.clone()])],
            &mut ledger,
        )
        .unwrap();

        assert_eq!(room_of(&placements, &s1), a.id);
        assert_eq!(placements[0].tier, PlacementTier::EmptyRoom);
        assert_eq!(room_of(&placements, &s2), b.id);
        assert_eq!(placements[1].tier, PlacementTier::EmptyRoom);
        // both rooms have 10 seats left, so the third section is forced into the first
        assert_eq!(room_of(&placements, &s3), a.id);
        assert_eq!(placements[2].tier, PlacementTier::Forced);
        assert_eq!(ledger.remaining(&a), -10);
    }

    #[test]
    fn split_group_packs_into_its_own_room() {
        let a = room("A", 70);
        let b = room("B", 40);
        let s1 = section("S1", 40);
        let s2 = section("S2", 40);
        let s3 = section("S3", 25);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[a.clone(), b.clone()],
            &[group(vec![s1.clone(), s2.clone(), s3.clone()])],
            &mut ledger,
        )
        .unwrap();
        assert_eq!(room_of(&placements, &s1), b.id);
        assert_eq!(room_of(&placements, &s2), a.id);
        assert_eq!(room_of(&placements, &s3), a.id);
        assert_eq!(placements[2].tier, PlacementTier::Packed);
    }

    #[test]
    fn packing_takes_first_used_room_not_tightest() {
        let a = room("A", 50);
        let b = room("B", 55);
        let s1 = section("S1", 40);
        let s2 = section("S2", 50);
        let s3 = section("S3", 5);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[a.clone(), b.clone()],
            &[group(vec![s1.clone(), s2.clone(), s3.clone()])],
            &mut ledger,
        )
        .unwrap();
        assert_eq!(room_of(&placements, &s1), a.id);
        assert_eq!(room_of(&placements, &s2), b.id);
        // B would be the exact fit, but A joined the group first and has 10 seats left
        assert_eq!(room_of(&placements, &s3), a.id);
        assert_eq!(placements[2].tier, PlacementTier::Packed);
        assert_eq!(ledger.remaining(&a), 5);
        assert_eq!(ledger.remaining(&b), 5);
    }

    #[test]
    fn single_small_room_is_overbooked() {
        let only = room("only", 50);
        let s = section("S", 60);
        let mut ledger = RoomLedger::new();
        let placements = allocate(&[only.clone()], &[group(vec![s.clone()])], &mut ledger).unwrap();
        assert_eq!(room_of(&placements, &s), only.id);
        assert_eq!(placements[0].tier, PlacementTier::Forced);
        assert_eq!(placements[0].students, 60);
        assert_eq!(ledger.remaining(&only), -10);
    }

    #[test]
    fn forced_placement_picks_most_remaining_even_when_negative() {
        let a = room("A", 30);
        let b = room("B", 20);
        let mut ledger = RoomLedger::seeded(vec![(a.id, 45), (b.id, 22)]);
        let s = section("S", 10);
        let placements =
            allocate(&[a.clone(), b.clone()], &[group(vec![s.clone()])], &mut ledger).unwrap();
        // A is at -15, B at -2
        assert_eq!(room_of(&placements, &s), b.id);
    }

    #[test]
    fn occupied_rooms_are_not_candidates_for_whole_groups() {
        let a = room("A", 100);
        let b = room("B", 60);
        let mut ledger = RoomLedger::seeded(vec![(a.id, 10)]);
        let s = section("S", 50);
        let placements =
            allocate(&[a.clone(), b.clone()], &[group(vec![s.clone()])], &mut ledger).unwrap();
        assert_eq!(room_of(&placements, &s), b.id);
    }

    #[test]
    fn inactive_rooms_are_ignored() {
        let mut closed = room("closed", 45);
        closed.is_active = false;
        let open = room("open", 80);
        let s = section("S", 45);
        let mut ledger = RoomLedger::new();
        let placements =
            allocate(&[closed, open.clone()], &[group(vec![s.clone()])], &mut ledger).unwrap();
        assert_eq!(room_of(&placements, &s), open.id);
    }

    #[test]
    fn no_active_rooms_is_an_error() {
        let mut ledger = RoomLedger::new();
        let err = allocate(&[], &[group(vec![section("S", 1)])], &mut ledger).unwrap_err();
        assert_eq!(err, SchedulingError::NoActiveRooms);
    }

    #[test]
    fn queue_order_lets_small_groups_claim_tight_rooms() {
        let r30 = room("30", 30);
        let r100 = room("100", 100);
        let small = section("small", 25);
        let large = section("large", 90);
        let mut ledger = RoomLedger::new();
        let placements = allocate(
            &[r100.clone(), r30.clone()],
            &[group(vec![small.clone()]), group(vec![large.clone()])],
            &mut ledger,
        )
        .unwrap();
        assert_eq!(room_of(&placements, &small), r30.id);
        assert_eq!(room_of(&placements, &large), r100.id);
    }
}
