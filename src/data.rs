use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::workflow::ScheduleStatus;

// Type aliases for clarity
pub type RoomId = Uuid;
pub type CourseId = Uuid;
pub type SubjectId = Uuid;
pub type SectionId = Uuid;
pub type ScheduleId = Uuid;
pub type Weekday = u8;

/// Classification of a room. Carried on subjects as a requirement too, but the
/// allocator does not match the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    General,
    Lab,
    Auditorium,
    Multimedia,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::General => "general",
            RoomType::Lab => "lab",
            RoomType::Auditorium => "auditorium",
            RoomType::Multimedia => "multimedia",
        };
        f.write_str(name)
    }
}

/// Represents a physical room with a given capacity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default)]
    pub campus: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub block: String,
    #[serde(default)]
    pub floor: i32,
    pub number: String,
    pub capacity: u32,
    #[serde(default)]
    pub room_type: RoomType,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub code: String,
}

/// A subject; `offered_month` is the offering period used for grouping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub workload: u32,
    #[serde(default)]
    pub required_room_type: RoomType,
    #[serde(default)]
    pub offered_month: String,
}

/// A cohort of students that needs one room for the run's slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassSection {
    pub id: SectionId,
    pub name: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub semester: u32,
    #[serde(default)]
    pub students_count: u32,
    pub course_id: CourseId,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
}

/// A class section paired with its subject, as handed over by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSection {
    pub section: ClassSection,
    pub subject: Option<Subject>,
}

/// A room assignment for one class section at a weekly slot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub days_of_week: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub room_id: RoomId,
    pub class_section_id: SectionId,
    #[serde(default)]
    pub status: ScheduleStatus,
}

/// A schedule with its room and section resolved for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub room: Option<Room>,
    pub class_section: Option<ClassSection>,
}

/// Payload for creating a schedule by hand.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewSchedule {
    pub days_of_week: Vec<Weekday>,
    pub start_time: String,
    pub end_time: String,
    pub room_id: RoomId,
    pub class_section_id: SectionId,
    #[serde(default)]
    pub status: ScheduleStatus,
}

/// Partial update of a schedule; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScheduleUpdate {
    pub days_of_week: Option<Vec<Weekday>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room_id: Option<RoomId>,
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
}

/// A schedule whose section has more students than its room has seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub schedule_id: ScheduleId,
    pub class_name: String,
    pub room_number: String,
    pub students: u32,
    pub capacity: u32,
    pub severity: Severity,
    pub description: String,
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_rooms: usize,
    pub active_classes: usize,
    pub pending_conflicts: usize,
    pub completion_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockOccupancy {
    pub block: String,
    pub scheduled: usize,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomTypeCount {
    pub room_type: RoomType,
    pub rooms: usize,
}

/// Everything the in-memory store can be seeded with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dataset {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub class_sections: Vec<ClassSection>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

/// `HH:MM` (de)serialisation for times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
    }
}
