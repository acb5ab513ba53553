//! Error types shared by the layout engine and the report assembler.

use thiserror::Error;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;

/// Errors raised while placing bands and tables on the page canvas.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A table row does not carry one cell per column.
    #[error("table row {row} has {found} cells but the table defines {expected} columns")]
    ColumnMismatch {
        /// Zero-based index of the offending body row.
        row: usize,
        /// Number of columns declared by the table.
        expected: usize,
        /// Number of cells found in the row.
        found: usize,
    },

    /// The declared column widths exceed the printable width of the page.
    #[error("table columns need {width:.1} mm but only {available:.1} mm are available")]
    TableTooWide { width: f64, available: f64 },

    /// The page geometry cannot hold the minimum set of bands.
    #[error("page geometry is too small: {0}")]
    PageTooSmall(String),
}

/// Failure of a single report generation call.
///
/// Any variant aborts the whole document; no partial artifact is produced.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid schedule data: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "bookmarks")]
    #[error("failed to embed room bookmarks: {0}")]
    Bookmark(#[from] BookmarkError),
}

impl ReportError {
    pub(crate) fn pdf(err: impl std::fmt::Display) -> Self {
        Self::Pdf(err.to_string())
    }
}
