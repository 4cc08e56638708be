use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::data::{
    ClassSection, Course, CourseId, Dataset, ResolvedSection, Room, RoomId, Schedule,
    ScheduleDetail, ScheduleId, SectionId, Subject, SubjectId,
};
use crate::error::{Result, SchedulingError};
use crate::workflow::ScheduleStatus;

/// Persistence boundary the scheduling operations run against.
///
/// Implementations own transactions: `replace_pending` must drop every pending
/// schedule and insert the new proposals as one atomic step.
pub trait ScheduleStore {
    fn rooms(&self) -> Result<Vec<Room>>;

    fn active_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.rooms()?.into_iter().filter(|r| r.is_active).collect())
    }

    fn room(&self, id: RoomId) -> Result<Option<Room>>;

    fn section_count(&self) -> Result<usize>;

    fn section(&self, id: SectionId) -> Result<Option<ClassSection>>;

    /// Sections not listed in `excluded`, with their subject resolved.
    fn sections_excluding(&self, excluded: &HashSet<SectionId>) -> Result<Vec<ResolvedSection>>;

    fn schedules(&self) -> Result<Vec<Schedule>>;

    fn schedule(&self, id: ScheduleId) -> Result<Option<Schedule>>;

    /// All schedules with room and section resolved.
    fn schedule_details(&self) -> Result<Vec<ScheduleDetail>>;

    fn replace_pending(&mut self, proposals: Vec<Schedule>) -> Result<()>;

    fn insert_schedule(&mut self, schedule: Schedule) -> Result<()>;

    /// Overwrites an existing schedule; NotFound if its id is unknown.
    fn save_schedule(&mut self, schedule: Schedule) -> Result<()>;

    /// Returns false when there was nothing to delete.
    fn delete_schedule(&mut self, id: ScheduleId) -> Result<bool>;
}

/// Store kept entirely in memory, in insertion order, optionally seeded from JSON.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rooms: Vec<Room>,
    courses: HashMap<CourseId, Course>,
    subjects: HashMap<SubjectId, Subject>,
    sections: Vec<ClassSection>,
    schedules: Vec<Schedule>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, refusing records that point at rooms, sections, courses or
    /// subjects the dataset does not contain.
    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        info!(
            "Seeding store with {} rooms, {} courses, {} subjects, {} sections, {} schedules",
            dataset.rooms.len(),
            dataset.courses.len(),
            dataset.subjects.len(),
            dataset.class_sections.len(),
            dataset.schedules.len()
        );
        let store = Self {
            rooms: dataset.rooms,
            courses: dataset.courses.into_iter().map(|c| (c.id, c)).collect(),
            subjects: dataset.subjects.into_iter().map(|s| (s.id, s)).collect(),
            sections: dataset.class_sections,
            schedules: dataset.schedules,
        };
        store.check_references()?;
        Ok(store)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        Ok(Self::from_dataset(dataset)?)
    }

    fn check_references(&self) -> Result<()> {
        for section in &self.sections {
            if !self.courses.contains_key(&section.course_id) {
                return Err(SchedulingError::not_found("course", section.course_id));
            }
            if let Some(subject_id) = section.subject_id {
                if !self.subjects.contains_key(&subject_id) {
                    return Err(SchedulingError::not_found("subject", subject_id));
                }
            }
        }
        for schedule in &self.schedules {
            if !self.rooms.iter().any(|r| r.id == schedule.room_id) {
                return Err(SchedulingError::not_found("room", schedule.room_id));
            }
            if !self.sections.iter().any(|s| s.id == schedule.class_section_id) {
                return Err(SchedulingError::not_found(
                    "class section",
                    schedule.class_section_id,
                ));
            }
        }
        Ok(())
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.insert(subject.id, subject);
    }

    pub fn add_section(&mut self, section: ClassSection) {
        self.sections.push(section);
    }

    fn resolve(&self, schedule: &Schedule) -> ScheduleDetail {
        ScheduleDetail {
            schedule: schedule.clone(),
            room: self.rooms.iter().find(|r| r.id == schedule.room_id).cloned(),
            class_section: self
                .sections
                .iter()
                .find(|s| s.id == schedule.class_section_id)
                .cloned(),
        }
    }
}

impl ScheduleStore for InMemoryStore {
    fn rooms(&self) -> Result<Vec<Room>> {
        Ok(self.rooms.clone())
    }

    fn room(&self, id: RoomId) -> Result<Option<Room>> {
        Ok(self.rooms.iter().find(|r| r.id == id).cloned())
    }

    fn section_count(&self) -> Result<usize> {
        Ok(self.sections.len())
    }

    fn section(&self, id: SectionId) -> Result<Option<ClassSection>> {
        Ok(self.sections.iter().find(|s| s.id == id).cloned())
    }

    fn sections_excluding(&self, excluded: &HashSet<SectionId>) -> Result<Vec<ResolvedSection>> {
        Ok(self
            .sections
            .iter()
            .filter(|s| !excluded.contains(&s.id))
            .map(|s| ResolvedSection {
                section: s.clone(),
                subject: s.subject_id.and_then(|id| self.subjects.get(&id).cloned()),
            })
            .collect())
    }

    fn schedules(&self) -> Result<Vec<Schedule>> {
        Ok(self.schedules.clone())
    }

    fn schedule(&self, id: ScheduleId) -> Result<Option<Schedule>> {
        Ok(self.schedules.iter().find(|s| s.id == id).cloned())
    }

    fn schedule_details(&self) -> Result<Vec<ScheduleDetail>> {
        Ok(self.schedules.iter().map(|s| self.resolve(s)).collect())
    }

    fn replace_pending(&mut self, proposals: Vec<Schedule>) -> Result<()> {
        let before = self.schedules.len();
        self.schedules.retain(|s| s.status != ScheduleStatus::Pending);
        debug!(
            "Dropped {} pending schedules, inserting {} proposals",
            before - self.schedules.len(),
            proposals.len()
        );
        self.schedules.extend(proposals);
        Ok(())
    }

    fn insert_schedule(&mut self, schedule: Schedule) -> Result<()> {
        self.schedules.push(schedule);
        Ok(())
    }

    fn save_schedule(&mut self, schedule: Schedule) -> Result<()> {
        let slot = self
            .schedules
            .iter_mut()
            .find(|s| s.id == schedule.id)
            .ok_or(SchedulingError::not_found("schedule", schedule.id))?;
        *slot = schedule;
        Ok(())
    }

    fn delete_schedule(&mut self, id: ScheduleId) -> Result<bool> {
        let before = self.schedules.len();
        self.schedules.retain(|s| s.id != id);
        Ok(self.schedules.len() != before)
    }
}
