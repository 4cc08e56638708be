use itertools::Itertools;

use crate::data::{
    BlockOccupancy, ConflictReport, DashboardStats, Room, RoomTypeCount, Schedule,
    ScheduleDetail, Severity,
};

/// True when the section assigned by `detail` has more students than the room seats.
pub fn is_capacity_conflict(detail: &ScheduleDetail) -> bool {
    match (&detail.room, &detail.class_section) {
        (Some(room), Some(section)) => section.students_count > room.capacity,
        _ => false,
    }
}

/// One report per schedule whose section outgrows its room. Read-only and advisory.
pub fn detect_conflicts(schedules: &[ScheduleDetail]) -> Vec<ConflictReport> {
    schedules
        .iter()
        .filter(|detail| is_capacity_conflict(detail))
        .filter_map(|detail| {
            let room = detail.room.as_ref()?;
            let section = detail.class_section.as_ref()?;
            Some(ConflictReport {
                schedule_id: detail.schedule.id,
                class_name: section.name.clone(),
                room_number: room.number.clone(),
                students: section.students_count,
                capacity: room.capacity,
                severity: Severity::High,
                description: format!(
                    "Room {} has {} seats but section {} has {} students",
                    room.number, room.capacity, section.name, section.students_count
                ),
            })
        })
        .collect()
}

pub fn dashboard_stats(
    rooms: &[Room],
    section_count: usize,
    schedules: &[ScheduleDetail],
) -> DashboardStats {
    let conflicts = schedules.iter().filter(|d| is_capacity_conflict(d)).count();
    let completion = if section_count == 0 {
        0
    } else {
        (schedules.len() * 100 / section_count).min(100)
    };
    DashboardStats {
        total_rooms: rooms.len(),
        active_classes: section_count,
        pending_conflicts: conflicts,
        completion_rate: format!("{}%", completion),
    }
}

/// Capacity and schedule count per room block, sorted by block.
pub fn occupancy_by_block(rooms: &[Room], schedules: &[Schedule]) -> Vec<BlockOccupancy> {
    let per_room = schedules.iter().map(|s| s.room_id).counts();
    rooms
        .iter()
        .map(|r| (r.block.clone(), r))
        .into_group_map()
        .into_iter()
        .map(|(block, rooms)| BlockOccupancy {
            scheduled: rooms
                .iter()
                .map(|r| per_room.get(&r.id).copied().unwrap_or(0))
                .sum(),
            capacity: rooms.iter().map(|r| r.capacity as u64).sum(),
            block,
        })
        .sorted_by(|a, b| a.block.cmp(&b.block))
        .collect()
}

pub fn room_distribution(rooms: &[Room]) -> Vec<RoomTypeCount> {
    rooms
        .iter()
        .map(|r| r.room_type)
        .counts()
        .into_iter()
        .sorted()
        .map(|(room_type, rooms)| RoomTypeCount { room_type, rooms })
        .collect()
}
