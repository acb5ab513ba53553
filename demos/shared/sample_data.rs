use std::io::Cursor;

use exam_seating_report::{RoomAssignment, ScheduleResult, Student};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};

const MATHS: &str = "III B.Sc MATHS S-I";
const BCOM: &str = "I BCOM CS SI";
const PHYSICS: &str = "II B.Sc PHYSICS";
const BBA: &str = "I BBA";

const MATHS_STUDENTS: &[(&str, &str)] = &[
    ("222210475", "Arun Kumar"),
    ("222210476", "Priya Sharma"),
    ("222210477", "Rajesh Patel"),
    ("222210478", "Sneha Reddy"),
    ("222210479", "Vikram Singh"),
    ("222210480", "Kavya Nair"),
    ("222210481", "Arjun Menon"),
    ("222210482", "Deepika Joshi"),
    ("222210483", "Rohit Gupta"),
    ("222210484", "Ananya Das"),
    ("222210485", "Karthik Raj"),
    ("222210486", "Meera Iyer"),
    ("222210489", "Suresh Babu"),
];

const BCOM_STUDENTS: &[(&str, &str)] = &[
    ("122402292", "Amit Verma"),
    ("122402293", "Pooja Agarwal"),
    ("122402294", "Ravi Kumar"),
    ("122402295", "Sita Devi"),
    ("122402296", "Manoj Tiwari"),
    ("122402297", "Geeta Rani"),
    ("122402298", "Sunil Yadav"),
    ("122402299", "Rekha Sharma"),
    ("122402300", "Dinesh Kumar"),
    ("122402301", "Sunita Singh"),
    ("122402302", "Ramesh Gupta"),
    ("122402303", "Kavita Jain"),
    ("122402304", "Ashok Pandey"),
    ("122402305", "Nisha Agrawal"),
    ("122402306", "Vijay Mishra"),
    ("122402307", "Shanti Devi"),
    ("122402308", "Prakash Soni"),
    ("122402309", "Usha Rani"),
    ("122402310", "Mohan Lal"),
    ("122402311", "Radha Krishna"),
];

const PHYSICS_STUDENTS: &[(&str, &str)] = &[
    ("212110201", "Arjun Reddy"),
    ("212110202", "Lakshmi Priya"),
    ("212110203", "Kiran Kumar"),
    ("212110204", "Swathi Nair"),
    ("212110205", "Naveen Chandra"),
    ("212110206", "Divya Sree"),
    ("212110207", "Harish Babu"),
    ("212110208", "Madhavi Latha"),
    ("212110209", "Srinivas Rao"),
    ("212110210", "Padmavathi"),
    ("212110211", "Venkat Rao"),
    ("212110212", "Sailaja Devi"),
    ("212110213", "Ramesh Babu"),
    ("212110214", "Jyothi Kumari"),
    ("212110215", "Suresh Kumar"),
];

const BBA_STUDENTS: &[(&str, &str)] = &[
    ("122501001", "Rahul Sharma"),
    ("122501002", "Priyanka Joshi"),
    ("122501003", "Abhishek Gupta"),
    ("122501004", "Neha Agarwal"),
    ("122501005", "Sanjay Patel"),
    ("122501006", "Ritu Singh"),
    ("122501007", "Akash Verma"),
    ("122501008", "Shreya Malhotra"),
    ("122501009", "Varun Kapoor"),
    ("122501010", "Anjali Rao"),
    ("122501011", "Nikhil Jain"),
    ("122501012", "Pooja Bansal"),
];

fn students(class_name: &'static str, entries: &'static [(&'static str, &'static str)]) -> impl Iterator<Item = Student> {
    entries
        .iter()
        .map(move |(roll, name)| Student::new(*roll, *name, class_name))
}

/// The mid-term schedule used to preview both report layouts.
///
/// Room 2003 holds 33 students, so its detailed roster spills onto a second
/// page.
pub fn sample_schedule() -> ScheduleResult {
    ScheduleResult::new("Mid-Term Examination - November 2024", "2024-11-15", "FN")
        .with_room(
            RoomAssignment::new("2003", "BUILDING II", "Second Floor")
                .with_capacity(60)
                .with_students(students(MATHS, MATHS_STUDENTS))
                .with_students(students(BCOM, BCOM_STUDENTS)),
        )
        .with_room(
            RoomAssignment::new("1005", "MAIN BUILDING", "Ground Floor")
                .with_capacity(50)
                .with_students(students(PHYSICS, PHYSICS_STUDENTS))
                .with_students(students(BBA, BBA_STUDENTS)),
        )
}

/// A small PNG standing in for the institution logo.
pub fn sample_logo() -> Result<Vec<u8>, image::ImageError> {
    let (width, height) = (200u32, 160u32);
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        let dx = x as f32 - width as f32 / 2.0;
        let dy = y as f32 - height as f32 / 2.0;
        let inside = dx * dx / 10_000.0 + dy * dy / 6_400.0 <= 1.0;
        if inside {
            Rgb([176, 159, 198])
        } else {
            Rgb([255, 255, 255])
        }
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

