//! Builds a [`ScheduleResult`] from the allocator's bare seating map.
//!
//! The allocator only answers with `room number -> roll numbers`. Names,
//! classes and room locations are looked up in the class and room records
//! the caller already holds.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::language::Class;
use crate::model::{RoomAssignment, ScheduleResult, Student, UNKNOWN_BUILDING, UNKNOWN_FLOOR};

/// Capacity assumed for rooms without a matching room record.
pub const DEFAULT_ROOM_CAPACITY: u32 = 50;

/// Header fields of a scheduling request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub title: String,
    pub date: String,
    pub session: String,
    /// Ids of the classes that were seated.
    pub classes: Vec<i64>,
}

/// An exam room record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub id: Option<i64>,
    pub room_number: String,
    pub room_building: Option<String>,
    pub room_floor: Option<String>,
    pub room_capacity: Option<u32>,
}

impl Room {
    pub fn new(room_number: impl Into<String>) -> Self {
        Self {
            room_number: room_number.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_location(mut self, building: impl Into<String>, floor: impl Into<String>) -> Self {
        self.room_building = Some(building.into());
        self.room_floor = Some(floor.into());
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.room_capacity = Some(capacity);
        self
    }
}

/// Seating produced by the allocator, keyed by room number.
pub type SeatingMap = BTreeMap<String, Vec<String>>;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Resolves every seated roll number and room into a printable schedule.
///
/// Roll numbers not found among the requested classes become
/// `Unknown Student` / `Unknown Class`. Rooms without a record fall back to
/// `Unknown Building`, `Unknown Floor`, a capacity of 50 and an id equal to
/// their 1-based position.
pub fn assemble_schedule(
    request: &ScheduleRequest,
    seating: &SeatingMap,
    classes: &[Class],
    rooms: &[Room],
) -> ScheduleResult {
    let mut directory: HashMap<&str, Student> = HashMap::new();
    for class in request
        .classes
        .iter()
        .filter_map(|id| classes.iter().find(|class| class.id == *id))
    {
        for student in &class.students {
            directory.insert(
                student.roll_number.as_str(),
                Student::new(
                    student.roll_number.clone(),
                    student.student_name.clone(),
                    class.class_name.clone(),
                ),
            );
        }
    }

    let mut schedule = ScheduleResult::new(&*request.title, &*request.date, &*request.session);
    for (position, (room_number, rolls)) in seating.iter().enumerate() {
        let record = rooms.iter().find(|room| room.room_number == *room_number);
        let students = rolls.iter().map(|roll| {
            directory
                .get(roll.as_str())
                .cloned()
                .unwrap_or_else(|| Student::unknown(roll.clone()))
        });

        let mut assignment = RoomAssignment::new(
            room_number.clone(),
            record
                .and_then(|room| non_empty(&room.room_building))
                .unwrap_or(UNKNOWN_BUILDING),
            record
                .and_then(|room| non_empty(&room.room_floor))
                .unwrap_or(UNKNOWN_FLOOR),
        )
        .with_capacity(
            record
                .and_then(|room| room.room_capacity)
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_ROOM_CAPACITY),
        )
        .with_students(students);
        assignment.room_id = Some(
            record
                .and_then(|room| room.id)
                .filter(|id| *id != 0)
                .unwrap_or(position as i64 + 1),
        );

        debug!(
            "room {} seated {} students",
            assignment.room_number,
            assignment.students.len()
        );
        schedule = schedule.with_room(assignment);
    }

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ClassStudent;
    use crate::model::{UNKNOWN_CLASS, UNKNOWN_STUDENT};

    fn classes() -> Vec<Class> {
        vec![
            Class::new(1, "I BBA").with_students([
                ClassStudent::new("101", "Asha"),
                ClassStudent::new("102", "Bala"),
            ]),
            Class::new(2, "II BCOM").with_students([ClassStudent::new("201", "Chitra")]),
        ]
    }

    fn seating(entries: &[(&str, &[&str])]) -> SeatingMap {
        entries
            .iter()
            .map(|(room, rolls)| {
                (
                    room.to_string(),
                    rolls.iter().map(|roll| roll.to_string()).collect(),
                )
            })
            .collect()
    }

    fn request(classes: Vec<i64>) -> ScheduleRequest {
        ScheduleRequest {
            title: "Mid Term".to_owned(),
            date: "2024-11-15".to_owned(),
            session: "FN".to_owned(),
            classes,
        }
    }

    #[test]
    fn students_are_resolved_from_selected_classes() {
        let rooms = [Room::new("2003")
            .with_id(9)
            .with_location("BUILDING II", "Second Floor")
            .with_capacity(60)];
        let schedule = assemble_schedule(
            &request(vec![1, 2]),
            &seating(&[("2003", &["101", "201"][..])]),
            &classes(),
            &rooms,
        );
        let room = &schedule.room_assignments[0];
        assert_eq!(room.room_id, Some(9));
        assert_eq!(room.room_building, "BUILDING II");
        assert_eq!(room.room_capacity, 60);
        assert_eq!(room.students[0], Student::new("101", "Asha", "I BBA"));
        assert_eq!(room.students[1].class_name, "II BCOM");
        assert_eq!(schedule.title, "Mid Term");
    }

    #[test]
    fn unknown_rolls_and_unselected_classes_get_placeholders() {
        let schedule = assemble_schedule(
            &request(vec![1]),
            &seating(&[("1005", &["201", "999"][..])]),
            &classes(),
            &[],
        );
        let room = &schedule.room_assignments[0];
        for student in &room.students {
            assert_eq!(student.student_name, UNKNOWN_STUDENT);
            assert_eq!(student.class_name, UNKNOWN_CLASS);
        }
        assert_eq!(room.students[1].roll_number, "999");
    }

    #[test]
    fn rooms_without_records_use_defaults_and_position_ids() {
        let schedule = assemble_schedule(
            &request(vec![]),
            &seating(&[("B", &[][..]), ("A", &[][..])]),
            &[],
            &[],
        );
        let numbers: Vec<_> = schedule
            .room_assignments
            .iter()
            .map(|room| (room.room_number.as_str(), room.room_id))
            .collect();
        assert_eq!(numbers, [("A", Some(1)), ("B", Some(2))]);
        let room = &schedule.room_assignments[0];
        assert_eq!(room.room_building, UNKNOWN_BUILDING);
        assert_eq!(room.room_floor, UNKNOWN_FLOOR);
        assert_eq!(room.room_capacity, DEFAULT_ROOM_CAPACITY);
    }
}
