use std::io::Cursor;
use std::thread;

use chrono::NaiveDate;
use exam_seating_report::{
    ReportBuilder, ReportGenerator, ReportKind, RoomAssignment, ScheduleResult, Student,
};
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lopdf::Document;

fn sample_schedule() -> ScheduleResult {
    let big_room = RoomAssignment::new("2003", "BUILDING II", "Second Floor")
        .with_capacity(60)
        .with_students((0..30).map(|i| {
            let class = if i % 2 == 0 { "III B.Sc MATHS S-I" } else { "I BCOM CS SI" };
            Student::new(format!("2222104{i:02}"), format!("Student {i}"), class)
        }));
    let small_room = RoomAssignment::new("1005", "MAIN BUILDING", "Ground Floor")
        .with_students([Student::new("122501001", "Rahul Sharma", "I BBA")]);

    ScheduleResult::new("Mid-Term Examination - November 2024", "2024-11-15", "FN")
        .with_room(big_room)
        .with_room(small_room)
}

fn builder() -> ReportBuilder {
    let generated_at = NaiveDate::from_ymd_opt(2024, 11, 15)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .expect("valid timestamp");
    ReportBuilder::new().with_generated_at(generated_at)
}

fn placeholder_generator() -> ReportGenerator {
    builder().without_logo().build().expect("build generator")
}

fn logo_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(64, 48, Rgba([176, 159, 198, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode logo");
    bytes
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes)
        .expect("generated PDF should parse")
        .get_pages()
        .len()
}

#[test]
fn renders_non_empty_pdf_for_both_kinds() {
    let generator = placeholder_generator();
    for kind in [ReportKind::Summary, ReportKind::Detailed] {
        let artifact = generator.generate(&sample_schedule(), kind).expect("render report");
        assert!(artifact.bytes().starts_with(b"%PDF"));
        assert_eq!(artifact.kind(), kind);
    }
}

#[test]
fn pdf_page_count_matches_layout() {
    let generator = placeholder_generator();
    let schedule = sample_schedule();

    let detailed = generator.generate_detailed(&schedule).expect("render detailed");
    assert_eq!(detailed.layout().page_count(), 3);
    assert_eq!(pdf_page_count(detailed.bytes()), 3);

    let summary = generator.generate_summary(&schedule).expect("render summary");
    assert_eq!(pdf_page_count(summary.bytes()), summary.layout().page_count());
}

#[test]
fn artifact_names_follow_title_kind_and_date() {
    let generator = placeholder_generator();
    let schedule = sample_schedule();
    assert_eq!(
        generator.generate_summary(&schedule).unwrap().file_name(),
        "Mid-Term_Examination_-_November_2024_Summary_2024-11-15.pdf"
    );
    assert_eq!(
        generator.generate_detailed(&schedule).unwrap().file_name(),
        "Mid-Term_Examination_-_November_2024_Detailed_2024-11-15.pdf"
    );
}

#[test]
fn logo_bytes_and_placeholder_share_the_layout() {
    let schedule = sample_schedule();
    let with_logo = builder()
        .with_logo_bytes(logo_png())
        .build()
        .unwrap()
        .generate_summary(&schedule)
        .unwrap();
    let without_logo = placeholder_generator().generate_summary(&schedule).unwrap();

    assert_eq!(with_logo.layout(), without_logo.layout());
    assert_eq!(pdf_page_count(with_logo.bytes()), pdf_page_count(without_logo.bytes()));
}

#[test]
fn corrupt_logo_falls_back_to_placeholder() {
    let artifact = builder()
        .with_logo_bytes(b"definitely not a png".to_vec())
        .build()
        .unwrap()
        .generate_detailed(&sample_schedule())
        .expect("corrupt logo must not abort generation");
    assert!(artifact.bytes().starts_with(b"%PDF"));
}

#[test]
fn empty_schedule_renders_one_page() {
    let schedule = ScheduleResult::new("Empty", "2024-11-15", "FN");
    let generator = placeholder_generator();
    for kind in [ReportKind::Summary, ReportKind::Detailed] {
        let artifact = generator.generate(&schedule, kind).unwrap();
        assert_eq!(pdf_page_count(artifact.bytes()), 1);
    }
}

#[test]
fn concurrent_generations_do_not_interfere() {
    let generator = placeholder_generator();
    let schedule = sample_schedule();
    let expected = generator.layout_detailed(&schedule).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| generator.generate_detailed(&schedule).unwrap()))
            .collect();
        for handle in handles {
            let artifact = handle.join().expect("generation thread panicked");
            assert_eq!(artifact.layout(), &expected);
        }
    });
}

#[test]
fn save_in_writes_the_named_file() {
    let dir = std::env::temp_dir().join(format!("exam_seating_report_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let artifact = placeholder_generator().generate_summary(&sample_schedule()).unwrap();
    let path = artifact.save_in(&dir).unwrap();
    assert_eq!(path.file_name().unwrap(), artifact.file_name());
    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes());
    std::fs::remove_dir_all(&dir).ok();
}

#[cfg(feature = "bookmarks")]
#[test]
fn detailed_report_gets_one_outline_entry_per_room() {
    let artifact = placeholder_generator()
        .generate_detailed_with_bookmarks(&sample_schedule())
        .unwrap();
    let document = Document::load_mem(artifact.bytes()).unwrap();
    let catalog = document.catalog().unwrap();
    let outlines = catalog.get(b"Outlines").and_then(|o| o.as_reference()).unwrap();
    let count = document
        .get_object(outlines)
        .and_then(|o| o.as_dict())
        .and_then(|d| d.get(b"Count"))
        .and_then(|c| c.as_i64())
        .unwrap();
    assert_eq!(count, 2);
}
