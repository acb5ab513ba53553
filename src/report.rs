//! Generation of the summary and detailed seating reports.
//!
//! Every generation call follows the same pipeline: load the logo, derive the
//! report rows, lay the pages out, stamp the footers and draw the result. A
//! call owns all of its intermediate state, so one [`ReportGenerator`] can
//! serve concurrent calls from several threads.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{debug, info};

use crate::aggregate::{build_roster, build_summary, format_exam_date};
use crate::error::ReportError;
use crate::layout::{self, DocumentHeader, DocumentLayout, FooterText, PageGeometry};
use crate::logo::LogoLoader;
use crate::model::ScheduleResult;
use crate::render::Canvas;

pub use crate::layout::ReportKind;

/// A rendered report ready to be saved.
#[derive(Clone, Debug)]
pub struct ReportArtifact {
    kind: ReportKind,
    file_name: String,
    bytes: Vec<u8>,
    layout: DocumentLayout,
}

impl ReportArtifact {
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// `<title>_<Summary|Detailed>_<date>.pdf`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The page layout the PDF was drawn from.
    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    /// Writes the PDF into `dir` under its file name and returns the path.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Replaces every run of whitespace with a single underscore.
pub fn sanitize_title(title: &str) -> String {
    let mut sanitized = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
        } else {
            sanitized.push(ch);
            in_whitespace = false;
        }
    }
    sanitized
}

/// File name of a report artifact.
pub fn report_file_name(schedule: &ScheduleResult, kind: ReportKind) -> String {
    format!(
        "{}_{}_{}.pdf",
        sanitize_title(&schedule.title),
        kind.as_str(),
        schedule.date
    )
}

/// `DD/MM/YYYY, HH:MM:SS`, as printed in the footer.
pub fn format_generated_at(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Lays out and draws seating reports.
///
/// Built through [`ReportBuilder`](crate::ReportBuilder).
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    geometry: PageGeometry,
    institution: String,
    subtitle: String,
    logo: LogoLoader,
    generated_at: Option<NaiveDateTime>,
}

impl ReportGenerator {
    pub(crate) fn new(
        geometry: PageGeometry,
        institution: String,
        subtitle: String,
        logo: LogoLoader,
        generated_at: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            geometry,
            institution,
            subtitle,
            logo,
            generated_at,
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn institution(&self) -> (&str, &str) {
        (&self.institution, &self.subtitle)
    }

    pub fn logo_loader(&self) -> &LogoLoader {
        &self.logo
    }

    fn header(&self, schedule: &ScheduleResult) -> DocumentHeader {
        DocumentHeader {
            institution: self.institution.clone(),
            subtitle: self.subtitle.clone(),
            title: schedule.title.clone(),
            date: format_exam_date(&schedule.date),
            session: schedule.session.clone(),
        }
    }

    fn footer(&self, schedule: &ScheduleResult) -> FooterText {
        let at = self
            .generated_at
            .unwrap_or_else(|| Local::now().naive_local());
        FooterText {
            generated: format!("Generated on: {}", format_generated_at(at)),
            room_numbers: schedule
                .room_assignments
                .iter()
                .map(|room| room.room_number.clone())
                .collect(),
        }
    }

    /// Lays out the summary report without drawing it.
    pub fn layout_summary(&self, schedule: &ScheduleResult) -> Result<DocumentLayout, ReportError> {
        let rows = build_summary(&schedule.room_assignments);
        let layout = layout::layout_summary(
            &self.geometry,
            &self.header(schedule),
            &rows,
            &self.footer(schedule),
        )?;
        debug!(
            "summary layout: {} rooms on {} pages",
            rows.len(),
            layout.page_count()
        );
        Ok(layout)
    }

    /// Lays out the detailed report without drawing it.
    pub fn layout_detailed(&self, schedule: &ScheduleResult) -> Result<DocumentLayout, ReportError> {
        let rooms: Vec<_> = schedule
            .room_assignments
            .iter()
            .map(|room| (room, build_roster(room)))
            .collect();
        let layout = layout::layout_detailed(
            &self.geometry,
            &self.header(schedule),
            &rooms,
            &self.footer(schedule),
        )?;
        debug!(
            "detailed layout: {} rooms on {} pages, header pages {:?}",
            rooms.len(),
            layout.page_count(),
            layout.header_pages()
        );
        Ok(layout)
    }

    pub fn layout(&self, schedule: &ScheduleResult, kind: ReportKind) -> Result<DocumentLayout, ReportError> {
        match kind {
            ReportKind::Summary => self.layout_summary(schedule),
            ReportKind::Detailed => self.layout_detailed(schedule),
        }
    }

    /// Renders the room by room class distribution.
    pub fn generate_summary(&self, schedule: &ScheduleResult) -> Result<ReportArtifact, ReportError> {
        self.generate(schedule, ReportKind::Summary)
    }

    /// Renders the full roster of every room.
    pub fn generate_detailed(&self, schedule: &ScheduleResult) -> Result<ReportArtifact, ReportError> {
        self.generate(schedule, ReportKind::Detailed)
    }

    /// Renders `kind` for `schedule`.
    pub fn generate(&self, schedule: &ScheduleResult, kind: ReportKind) -> Result<ReportArtifact, ReportError> {
        let logo = self.logo.load();
        let layout = self.layout(schedule, kind)?;

        let title = format!("{} - {}", schedule.title, kind.as_str());
        let bytes = Canvas::new(&self.geometry, logo.as_ref()).draw(&title, &layout)?;

        let file_name = report_file_name(schedule, kind);
        info!(
            "generated {} ({} pages, {} bytes)",
            file_name,
            layout.page_count(),
            bytes.len()
        );
        Ok(ReportArtifact {
            kind,
            file_name,
            bytes,
            layout,
        })
    }

    /// Renders the detailed report with one PDF outline entry per room.
    #[cfg(feature = "bookmarks")]
    pub fn generate_detailed_with_bookmarks(
        &self,
        schedule: &ScheduleResult,
    ) -> Result<ReportArtifact, ReportError> {
        use crate::bookmarks::{apply_room_bookmarks, RoomBookmark};

        let mut artifact = self.generate_detailed(schedule)?;
        let bookmarks: Vec<RoomBookmark> = artifact
            .layout
            .room_start_pages()
            .into_iter()
            .filter_map(|(room, page)| {
                schedule
                    .room_assignments
                    .get(room)
                    .map(|assignment| RoomBookmark::new(layout::detailed_room_label(assignment), page))
            })
            .collect();
        artifact.bytes = apply_room_bookmarks(&artifact.bytes, &bookmarks)?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoomAssignment, Student};
    use chrono::NaiveDate;

    fn schedule() -> ScheduleResult {
        ScheduleResult::new("Mid Term  Exam 2024", "2024-11-15", "FN").with_room(
            RoomAssignment::new("2003", "BUILDING II", "Second Floor")
                .with_student(Student::new("1", "Asha", "I BBA")),
        )
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 15)
            .and_then(|date| date.and_hms_opt(9, 5, 7))
            .unwrap()
    }

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(sanitize_title("Mid Term  Exam\t2024"), "Mid_Term_Exam_2024");
        assert_eq!(sanitize_title(" padded "), "_padded_");
    }

    #[test]
    fn file_names_carry_kind_and_date() {
        assert_eq!(
            report_file_name(&schedule(), ReportKind::Summary),
            "Mid_Term_Exam_2024_Summary_2024-11-15.pdf"
        );
        assert_eq!(
            report_file_name(&schedule(), ReportKind::Detailed),
            "Mid_Term_Exam_2024_Detailed_2024-11-15.pdf"
        );
    }

    #[test]
    fn footer_timestamp_format() {
        assert_eq!(format_generated_at(generated_at()), "15/11/2024, 09:05:07");
    }

    #[test]
    fn header_uses_formatted_date() {
        let generator = crate::ReportBuilder::new()
            .without_logo()
            .with_generated_at(generated_at())
            .build()
            .unwrap();
        let header = generator.header(&schedule());
        assert_eq!(header.date, "15.11.2024");
        assert_eq!(header.institution, "SHASUN");
        let footer = generator.footer(&schedule());
        assert_eq!(footer.generated, "Generated on: 15/11/2024, 09:05:07");
        assert_eq!(footer.room_numbers, ["2003"]);
    }

    #[test]
    fn generator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReportGenerator>();
    }
}
