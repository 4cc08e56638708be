#![allow(dead_code)]

use room_allocation::data::{ClassSection, Room, RoomType, Subject};
use room_allocation::store::InMemoryStore;
use uuid::Uuid;

pub fn room(number: &str, capacity: u32) -> Room {
    Room {
        id: Uuid::new_v4(),
        campus: "Centro".to_string(),
        building: "Bloco A".to_string(),
        block: "A".to_string(),
        floor: 1,
        number: number.to_string(),
        capacity,
        room_type: RoomType::General,
        is_active: true,
    }
}

pub fn subject(code: &str, offered_month: &str) -> Subject {
    Subject {
        id: Uuid::new_v4(),
        code: code.to_string(),
        name: format!("Subject {}", code),
        workload: 60,
        required_room_type: RoomType::General,
        offered_month: offered_month.to_string(),
    }
}

pub fn section(name: &str, students: u32, subject: Option<&Subject>) -> ClassSection {
    ClassSection {
        id: Uuid::new_v4(),
        name: name.to_string(),
        shift: "night".to_string(),
        semester: 1,
        students_count: students,
        course_id: Uuid::nil(),
        subject_id: subject.map(|s| s.id),
    }
}

pub fn store(rooms: &[Room], subjects: &[Subject], sections: &[ClassSection]) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    for r in rooms {
        store.add_room(r.clone());
    }
    for s in subjects {
        store.add_subject(s.clone());
    }
    for s in sections {
        store.add_section(s.clone());
    }
    store
}
