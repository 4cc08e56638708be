//! Schedule operations on top of a [`ScheduleStore`]: the automatic allocation run,
//! the approval decision and the plain record maintenance around them.

use log::{info, warn};
use std::collections::HashSet;
use uuid::Uuid;

use crate::conflicts;
use crate::data::{
    BlockOccupancy, ConflictReport, DashboardStats, NewSchedule, RoomTypeCount, Schedule,
    ScheduleDetail, ScheduleId, ScheduleUpdate, SectionId,
};
use crate::error::{Result, SchedulingError};
use crate::grouping::group_sections;
use crate::ledger::RoomLedger;
use crate::materializer::{self, SlotConfig};
use crate::solver::{self, PlacementTier};
use crate::store::ScheduleStore;
use crate::workflow::{Decision, ScheduleStatus};

/// Discards pending proposals and allocates every section without an approved schedule.
///
/// Approved schedules keep their rooms and pre-charge the ledger; rejected ones are
/// left in place but do not hold their section back. Returns the full schedule set.
pub fn run_auto_scheduling<S: ScheduleStore>(
    store: &mut S,
    slot: &SlotConfig,
) -> Result<Vec<ScheduleDetail>> {
    let existing = store.schedule_details()?;
    let approved: Vec<&ScheduleDetail> = existing
        .iter()
        .filter(|d| d.schedule.status == ScheduleStatus::Approved)
        .collect();
    let approved_sections: HashSet<SectionId> =
        approved.iter().map(|d| d.schedule.class_section_id).collect();
    let mut ledger = RoomLedger::seeded(approved.iter().map(|d| {
        let students = d.class_section.as_ref().map_or(0, |s| s.students_count);
        (d.schedule.room_id, students)
    }));

    let rooms = store.active_rooms()?;
    let candidates = store.sections_excluding(&approved_sections)?;
    info!(
        "Auto-scheduling: {} candidate sections, {} active rooms, {} approved schedules kept",
        candidates.len(),
        rooms.len(),
        approved.len()
    );

    if rooms.is_empty() || candidates.is_empty() {
        info!("Nothing to allocate, clearing pending proposals only");
        store.replace_pending(Vec::new())?;
        return store.schedule_details();
    }

    let groups = group_sections(&candidates);
    let placements = solver::allocate(&rooms, &groups, &mut ledger)?;
    let (forced, forced_students) = placements
        .iter()
        .filter(|p| p.tier == PlacementTier::Forced)
        .fold((0usize, 0u64), |(n, seats), p| (n + 1, seats + p.students as u64));
    if forced > 0 {
        warn!(
            "{} section(s) with {} students placed without a room that fits them",
            forced, forced_students
        );
    }

    let proposals = materializer::materialize(&placements, slot);
    store.replace_pending(proposals)?;
    store.schedule_details()
}

/// Records a reviewer decision; `decision` must be `approved` or `rejected`.
pub fn validate_schedule<S: ScheduleStore>(
    store: &mut S,
    schedule_id: ScheduleId,
    decision: &str,
) -> Result<ScheduleDetail> {
    let decision: Decision = decision.parse()?;
    let mut schedule = require_schedule(store, schedule_id)?;
    let previous = schedule.status;
    schedule.status = previous.decide(decision);
    store.save_schedule(schedule)?;
    info!("Schedule {} moved from {} to {}", schedule_id, previous, decision);
    detail(store, schedule_id)
}

pub fn list_schedules<S: ScheduleStore>(store: &S) -> Result<Vec<ScheduleDetail>> {
    store.schedule_details()
}

/// Creates a schedule by hand. Room and section must exist; capacity is not checked.
pub fn create_schedule<S: ScheduleStore>(store: &mut S, new: NewSchedule) -> Result<ScheduleDetail> {
    if store.room(new.room_id)?.is_none() {
        return Err(SchedulingError::not_found("room", new.room_id));
    }
    if store.section(new.class_section_id)?.is_none() {
        return Err(SchedulingError::not_found("class section", new.class_section_id));
    }
    materializer::validate_days(&new.days_of_week)?;
    let start_time = materializer::parse_time(&new.start_time)?;
    let end_time = materializer::parse_time(&new.end_time)?;
    materializer::validate_window(start_time, end_time)?;

    let schedule = Schedule {
        id: Uuid::new_v4(),
        days_of_week: new.days_of_week,
        start_time,
        end_time,
        room_id: new.room_id,
        class_section_id: new.class_section_id,
        status: new.status,
    };
    let id = schedule.id;
    store.insert_schedule(schedule)?;
    detail(store, id)
}

/// Applies a partial update. A new room must exist; capacity is not re-checked.
pub fn update_schedule<S: ScheduleStore>(
    store: &mut S,
    schedule_id: ScheduleId,
    update: ScheduleUpdate,
) -> Result<ScheduleDetail> {
    let mut schedule = require_schedule(store, schedule_id)?;

    if let Some(room_id) = update.room_id {
        if store.room(room_id)?.is_none() {
            return Err(SchedulingError::not_found("room", room_id));
        }
        schedule.room_id = room_id;
    }
    if let Some(days) = update.days_of_week {
        materializer::validate_days(&days)?;
        schedule.days_of_week = days;
    }
    if let Some(start) = update.start_time.as_deref() {
        schedule.start_time = materializer::parse_time(start)?;
    }
    if let Some(end) = update.end_time.as_deref() {
        schedule.end_time = materializer::parse_time(end)?;
    }
    materializer::validate_window(schedule.start_time, schedule.end_time)?;
    if let Some(status) = update.status {
        schedule.status = status;
    }

    store.save_schedule(schedule)?;
    detail(store, schedule_id)
}

pub fn delete_schedule<S: ScheduleStore>(store: &mut S, schedule_id: ScheduleId) -> Result<()> {
    if store.delete_schedule(schedule_id)? {
        Ok(())
    } else {
        Err(SchedulingError::not_found("schedule", schedule_id))
    }
}

pub fn capacity_conflicts<S: ScheduleStore>(store: &S) -> Result<Vec<ConflictReport>> {
    Ok(conflicts::detect_conflicts(&store.schedule_details()?))
}

pub fn dashboard_stats<S: ScheduleStore>(store: &S) -> Result<DashboardStats> {
    Ok(conflicts::dashboard_stats(
        &store.rooms()?,
        store.section_count()?,
        &store.schedule_details()?,
    ))
}

pub fn occupancy_by_block<S: ScheduleStore>(store: &S) -> Result<Vec<BlockOccupancy>> {
    Ok(conflicts::occupancy_by_block(&store.rooms()?, &store.schedules()?))
}

pub fn room_distribution<S: ScheduleStore>(store: &S) -> Result<Vec<RoomTypeCount>> {
    Ok(conflicts::room_distribution(&store.rooms()?))
}

fn require_schedule<S: ScheduleStore>(store: &S, id: ScheduleId) -> Result<Schedule> {
    store
        .schedule(id)?
        .ok_or(SchedulingError::not_found("schedule", id))
}

fn detail<S: ScheduleStore>(store: &S, id: ScheduleId) -> Result<ScheduleDetail> {
    store
        .schedule_details()?
        .into_iter()
        .find(|d| d.schedule.id == id)
        .ok_or(SchedulingError::not_found("schedule", id))
}
