//! Turns room assignments into the rows the two report kinds print.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::model::{ClassSummary, RoomAssignment, Student, SummaryRow};

/// Roll range shown for a class without any roll numbers.
pub const EMPTY_ROLL_RANGE: &str = "N/A";

/// Builds the per-room class distribution used by the summary report.
///
/// Rooms keep their input order. Inside a room, classes appear in the order
/// their first student is encountered, and the roll range is taken from the
/// lexicographically sorted roll numbers, so `A10` sorts before `A2`.
pub fn build_summary(rooms: &[RoomAssignment]) -> Vec<SummaryRow> {
    rooms.iter().map(summarize_room).collect()
}

fn summarize_room(room: &RoomAssignment) -> SummaryRow {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();

    for student in &room.students {
        let class_name = student.class_name.as_str();
        match groups.iter_mut().find(|(name, _)| *name == class_name) {
            Some((_, rolls)) => rolls.push(student.roll_number.as_str()),
            None => groups.push((class_name, vec![student.roll_number.as_str()])),
        }
    }

    let class_data = groups
        .into_iter()
        .map(|(class_name, mut rolls)| {
            rolls.sort_unstable();
            ClassSummary {
                class_name: class_name.to_owned(),
                roll_range: roll_range(&rolls),
                count: rolls.len(),
            }
        })
        .collect();

    SummaryRow {
        room_number: room.room_number.clone(),
        room_building: room.room_building.clone(),
        room_floor: room.room_floor.clone(),
        room_capacity: room.room_capacity,
        class_data,
        total_students: room.students.len(),
    }
}

fn roll_range(sorted: &[&str]) -> String {
    match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => EMPTY_ROLL_RANGE.to_owned(),
    }
}

/// Returns the students of `room` ordered by class name, then roll number.
pub fn build_roster(room: &RoomAssignment) -> Vec<Student> {
    let mut roster = room.students.clone();
    roster.sort_by(|a, b| {
        locale_cmp(&a.class_name, &b.class_name)
            .then_with(|| locale_cmp(&a.roll_number, &b.roll_number))
    });
    roster
}

/// Collation used wherever the printed output is sorted for people.
///
/// Letters compare case-insensitively first. Strings that differ only in case
/// put the lowercase letter first at the first differing position (`"b"`
/// before `"B"`); raw code points settle whatever is left.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Formats an ISO exam date as `DD.MM.YYYY`.
///
/// Anything that does not start with a `YYYY-MM-DD` date is returned as is.
pub fn format_exam_date(iso: &str) -> String {
    iso.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| iso.to_owned())
}
