//! Printable exam seating reports.
//!
//! A [`ScheduleResult`] (rooms with their seated students) is turned into two
//! PDF documents: a summary listing the classes and roll ranges per room, and
//! a detailed roster of every room. Layout is computed first as a plain
//! [`DocumentLayout`] and drawn afterwards, so page decisions can be inspected
//! and tested without parsing PDF output.
//!
//! ```no_run
//! use exam_seating_report::{ReportBuilder, ScheduleResult};
//!
//! # fn main() -> Result<(), exam_seating_report::ReportError> {
//! let schedule: ScheduleResult = serde_json::from_str(r#"{"title": "Mid Term", "date": "2024-11-15"}"#)?;
//! let generator = ReportBuilder::new().build()?;
//! generator.generate_summary(&schedule)?.save_in(".")?;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod builder;
pub mod enrich;
pub mod error;
pub mod fonts;
pub mod language;
pub mod layout;
pub mod logo;
pub mod model;
pub mod render;
pub mod report;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::ReportBuilder;
pub use error::{LayoutError, ReportError};
pub use layout::{DocumentLayout, PageDescriptor, PageGeometry, PageKind};
pub use model::{RoomAssignment, ScheduleResult, Student};
pub use report::{ReportArtifact, ReportGenerator, ReportKind};
