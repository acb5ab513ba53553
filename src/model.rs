//! Data structures describing a schedule result and the rows derived from it.
//!
//! The input types mirror the JSON produced by the scheduling service. Fields
//! that the service may omit or send as `null` are resolved to their
//! placeholder values once, at deserialization time, so the rest of the crate
//! never deals with optional room or student metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used when a student record carries no name.
pub const UNKNOWN_STUDENT: &str = "Unknown Student";
/// Placeholder used when a student record carries no class.
pub const UNKNOWN_CLASS: &str = "Unknown Class";
/// Placeholder used when a student record carries no roll number.
pub const MISSING_ROLL: &str = "N/A";
/// Placeholder used when a room carries no number.
pub const UNKNOWN_ROOM: &str = "Unknown Room";
/// Placeholder used when a room carries no building.
pub const UNKNOWN_BUILDING: &str = "Unknown Building";
/// Placeholder used when a room carries no floor.
pub const UNKNOWN_FLOOR: &str = "Unknown Floor";

/// Reads a loosely typed JSON scalar as text.
///
/// Strings are taken verbatim and numbers are printed; `null`, empty strings
/// and structured values count as missing.
pub(crate) fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The complete output of one scheduling run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleResult {
    pub title: String,
    /// ISO formatted exam date, e.g. `2024-11-15`.
    pub date: String,
    pub session: String,
    pub room_assignments: Vec<RoomAssignment>,
}

impl ScheduleResult {
    /// Creates an empty schedule with the given header fields.
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            session: session.into(),
            room_assignments: Vec::new(),
        }
    }

    /// Appends a room and returns the updated schedule.
    pub fn with_room(mut self, room: RoomAssignment) -> Self {
        self.room_assignments.push(room);
        self
    }

    /// Number of students seated across all rooms.
    pub fn total_students(&self) -> usize {
        self.room_assignments
            .iter()
            .map(|room| room.students.len())
            .sum()
    }
}

/// Students seated in one exam room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRoomAssignment")]
pub struct RoomAssignment {
    pub room_id: Option<i64>,
    pub room_number: String,
    pub room_building: String,
    pub room_floor: String,
    pub room_capacity: u32,
    pub students: Vec<Student>,
}

impl RoomAssignment {
    /// Creates an empty room with the given number and location.
    pub fn new(
        room_number: impl Into<String>,
        room_building: impl Into<String>,
        room_floor: impl Into<String>,
    ) -> Self {
        Self {
            room_id: None,
            room_number: room_number.into(),
            room_building: room_building.into(),
            room_floor: room_floor.into(),
            room_capacity: 0,
            students: Vec::new(),
        }
    }

    /// Sets the seat capacity and returns the updated room.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.room_capacity = capacity;
        self
    }

    /// Appends a student and returns the updated room.
    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    /// Extends the room with multiple students.
    pub fn with_students<I>(mut self, students: I) -> Self
    where
        I: IntoIterator<Item = Student>,
    {
        self.students.extend(students);
        self
    }
}

#[derive(Deserialize)]
struct RawRoomAssignment {
    #[serde(default)]
    room_id: Option<Value>,
    #[serde(default)]
    room_number: Option<Value>,
    #[serde(default)]
    room_building: Option<Value>,
    #[serde(default)]
    room_floor: Option<Value>,
    #[serde(default)]
    room_capacity: Option<Value>,
    #[serde(default)]
    students: Option<Vec<Student>>,
}

impl From<RawRoomAssignment> for RoomAssignment {
    fn from(raw: RawRoomAssignment) -> Self {
        Self {
            room_id: raw.room_id.as_ref().and_then(Value::as_i64),
            room_number: text_field(raw.room_number).unwrap_or_else(|| UNKNOWN_ROOM.to_owned()),
            room_building: text_field(raw.room_building)
                .unwrap_or_else(|| UNKNOWN_BUILDING.to_owned()),
            room_floor: text_field(raw.room_floor).unwrap_or_else(|| UNKNOWN_FLOOR.to_owned()),
            room_capacity: raw
                .room_capacity
                .as_ref()
                .and_then(Value::as_u64)
                .and_then(|capacity| u32::try_from(capacity).ok())
                .unwrap_or(0),
            students: raw.students.unwrap_or_default(),
        }
    }
}

/// A single seated student.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStudent", rename_all = "camelCase")]
pub struct Student {
    pub roll_number: String,
    pub student_name: String,
    pub class_name: String,
}

impl Student {
    pub fn new(
        roll_number: impl Into<String>,
        student_name: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            roll_number: roll_number.into(),
            student_name: student_name.into(),
            class_name: class_name.into(),
        }
    }

    /// A student known only by roll number, as produced for seats the
    /// class lists do not account for.
    pub fn unknown(roll_number: impl Into<String>) -> Self {
        Self::new(roll_number, UNKNOWN_STUDENT, UNKNOWN_CLASS)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStudent {
    #[serde(default)]
    roll_number: Option<Value>,
    #[serde(default)]
    student_name: Option<Value>,
    #[serde(default)]
    class_name: Option<Value>,
}

impl From<RawStudent> for Student {
    fn from(raw: RawStudent) -> Self {
        Self {
            roll_number: text_field(raw.roll_number).unwrap_or_else(|| MISSING_ROLL.to_owned()),
            student_name: text_field(raw.student_name)
                .unwrap_or_else(|| UNKNOWN_STUDENT.to_owned()),
            class_name: text_field(raw.class_name).unwrap_or_else(|| UNKNOWN_CLASS.to_owned()),
        }
    }
}

/// Per-room class distribution shown in the summary report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub room_number: String,
    pub room_building: String,
    pub room_floor: String,
    pub room_capacity: u32,
    pub class_data: Vec<ClassSummary>,
    pub total_students: usize,
}

/// One class inside a room: the covered roll range and head count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub class_name: String,
    /// `"<min>-<max>"` over the lexicographically sorted roll numbers, or `"N/A"`.
    pub roll_range: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_student_fields_fall_back_to_placeholders() {
        let student: Student = serde_json::from_str(r#"{"rollNumber": "101"}"#).unwrap();
        assert_eq!(student.roll_number, "101");
        assert_eq!(student.student_name, UNKNOWN_STUDENT);
        assert_eq!(student.class_name, UNKNOWN_CLASS);
    }

    #[test]
    fn null_and_numeric_fields_are_normalised() {
        let student: Student =
            serde_json::from_str(r#"{"rollNumber": 222210475, "studentName": null, "className": "I BBA"}"#)
                .unwrap();
        assert_eq!(student.roll_number, "222210475");
        assert_eq!(student.student_name, UNKNOWN_STUDENT);
        assert_eq!(student.class_name, "I BBA");
    }

    #[test]
    fn room_defaults_apply_once() {
        let room: RoomAssignment =
            serde_json::from_str(r#"{"room_number": "2003", "room_floor": null}"#).unwrap();
        assert_eq!(room.room_number, "2003");
        assert_eq!(room.room_building, UNKNOWN_BUILDING);
        assert_eq!(room.room_floor, UNKNOWN_FLOOR);
        assert_eq!(room.room_capacity, 0);
        assert!(room.students.is_empty());
        assert_eq!(room.room_id, None);
    }

    #[test]
    fn schedule_tolerates_missing_rooms() {
        let schedule: ScheduleResult =
            serde_json::from_str(r#"{"title": "Mid Term", "date": "2024-11-15"}"#).unwrap();
        assert_eq!(schedule.title, "Mid Term");
        assert_eq!(schedule.session, "");
        assert!(schedule.room_assignments.is_empty());
        assert_eq!(schedule.total_students(), 0);
    }

    #[test]
    fn student_serializes_in_camel_case() {
        let json = serde_json::to_value(Student::new("1", "Asha", "I BBA")).unwrap();
        assert_eq!(json["rollNumber"], "1");
        assert_eq!(json["studentName"], "Asha");
        assert_eq!(json["className"], "I BBA");
    }
}
