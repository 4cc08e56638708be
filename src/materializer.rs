use chrono::NaiveTime;
use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::data::{Schedule, Weekday, hhmm};
use crate::error::{Result, SchedulingError};
use crate::solver::Placement;
use crate::workflow::ScheduleStatus;

/// The fixed weekly slot every proposal of a run is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConfig {
    pub days_of_week: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl SlotConfig {
    pub fn new(days_of_week: Vec<Weekday>, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self> {
        validate_days(&days_of_week)?;
        validate_window(start_time, end_time)?;
        Ok(Self {
            days_of_week,
            start_time,
            end_time,
        })
    }

    /// Parses `HH:MM` boundaries, e.g. `SlotConfig::parse(vec![1, 2, 3], "19:00", "22:00")`.
    pub fn parse(days_of_week: Vec<Weekday>, start: &str, end: &str) -> Result<Self> {
        Self::new(days_of_week, parse_time(start)?, parse_time(end)?)
    }
}

impl Default for SlotConfig {
    /// Monday to Wednesday, 19:00 to 22:00.
    fn default() -> Self {
        Self {
            days_of_week: vec![1, 2, 3],
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
        }
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    hhmm::parse(raw)
        .map_err(|e| SchedulingError::invalid(format!("time '{}' is not HH:MM: {}", raw, e)))
}

/// Weekday indices run from 0 (Sunday) to 6 (Saturday), each at most once.
pub fn validate_days(days: &[Weekday]) -> Result<()> {
    if days.is_empty() {
        return Err(SchedulingError::invalid("at least one weekday is required"));
    }
    for (i, day) in days.iter().enumerate() {
        if *day > 6 {
            return Err(SchedulingError::invalid(format!(
                "weekday {} out of range 0..=6",
                day
            )));
        }
        if days[..i].contains(day) {
            return Err(SchedulingError::invalid(format!("weekday {} repeated", day)));
        }
    }
    Ok(())
}

pub fn validate_window(start: NaiveTime, end: NaiveTime) -> Result<()> {
    if start >= end {
        return Err(SchedulingError::invalid(format!(
            "start {} must be before end {}",
            start.format("%H:%M"),
            end.format("%H:%M")
        )));
    }
    Ok(())
}

/// Turns placements into pending schedule records for the run's slot.
pub fn materialize(placements: &[Placement], slot: &SlotConfig) -> Vec<Schedule> {
    let schedules: Vec<Schedule> = placements
        .iter()
        .map(|p| Schedule {
            id: Uuid::new_v4(),
            days_of_week: slot.days_of_week.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
            room_id: p.room_id,
            class_section_id: p.section_id,
            status: ScheduleStatus::Pending,
        })
        .collect();
    debug!("Materialized {} pending schedules", schedules.len());
    schedules
}
