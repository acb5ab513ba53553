//! Bordered grid tables that paginate themselves.
//!
//! A [`Table`] only knows its columns and rows. Where it starts and what a
//! page break means is decided by the [`PageFlow`] it is rendered into: the
//! table asks whether the next row fits and, if not, requests a new page and
//! repeats its head row there.

use crate::error::LayoutError;
use crate::fonts::{self, FontWeight};
use crate::layout::{BandKind, PlacedCell, RowStyle};

/// Horizontal padding between a cell border and its text, in mm.
pub const CELL_PADDING: f64 = 2.0;

/// Horizontal alignment of text inside a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Label, width (mm) and alignment of one table column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSpec {
    pub label: String,
    pub width: f64,
    pub align: Align,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, width: f64, align: Align) -> Self {
        Self {
            label: label.into(),
            width,
            align,
        }
    }
}

/// Text of one body cell together with the weight it is printed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub weight: FontWeight,
}

impl Cell {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Bold,
        }
    }
}

/// Font sizes (pt) and row heights (mm) of a table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableStyle {
    pub head_height: f64,
    pub row_height: f64,
    pub head_font_size: f64,
    pub body_font_size: f64,
}

/// The surface a table is laid out on.
///
/// Implemented by the layout engine; the page break policy (header page or
/// plain continuation page) belongs to the implementor.
pub trait PageFlow {
    /// Current vertical position from the top edge, in mm.
    fn cursor(&self) -> f64;

    /// Left edge of the content area, in mm.
    fn left(&self) -> f64;

    /// Width of the content area, in mm.
    fn content_width(&self) -> f64;

    /// Whether a band of `height` mm still fits above the content bottom.
    fn fits(&self, height: f64) -> bool;

    /// Places a band at the cursor and advances the cursor by `height`.
    fn place(&mut self, kind: BandKind, height: f64);

    /// Starts a new page and moves the cursor to its first content line.
    fn break_page(&mut self);
}

/// A bordered grid with a head row repeated on every page it spans.
#[derive(Clone, Debug)]
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Vec<Cell>>,
    style: TableStyle,
    trailer: f64,
}

impl Table {
    pub fn new(columns: Vec<ColumnSpec>, style: TableStyle) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            style,
            trailer: 0.0,
        }
    }

    /// Replaces the body rows and returns the updated table.
    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    /// Reserves `height` mm for a band the caller places right after the
    /// table. The last body row (or the head of an empty table) never ends
    /// up on a page without room for it.
    pub fn with_trailer(mut self, height: f64) -> Self {
        self.trailer = height;
        self
    }

    /// Total height of the table and its trailer if they fit on one page.
    pub fn height(&self) -> f64 {
        self.style.head_height + self.style.row_height * self.rows.len() as f64 + self.trailer
    }

    /// Height of the head row plus the first body row, if any, and the
    /// trailer when that row is also the last.
    pub fn min_height(&self) -> f64 {
        let first = if self.rows.is_empty() {
            0.0
        } else {
            self.style.row_height
        };
        let trailer = if self.rows.len() <= 1 { self.trailer } else { 0.0 };
        self.style.head_height + first + trailer
    }

    fn validate(&self, available: f64) -> Result<(), LayoutError> {
        let width: f64 = self.columns.iter().map(|column| column.width).sum();
        if width > available + f64::EPSILON {
            return Err(LayoutError::TableTooWide { width, available });
        }

        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != self.columns.len() {
                return Err(LayoutError::ColumnMismatch {
                    row,
                    expected: self.columns.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    fn place_cells<'a, I>(&self, left: f64, cells: I, size: f64) -> Vec<PlacedCell>
    where
        I: IntoIterator<Item = (&'a str, FontWeight)>,
    {
        let mut x = left;
        self.columns
            .iter()
            .zip(cells)
            .map(|(column, (text, weight))| {
                let inner = (column.width - 2.0 * CELL_PADDING).max(0.0);
                let cell = PlacedCell {
                    x,
                    width: column.width,
                    align: column.align,
                    text: fonts::fit_text(text, weight, size, inner),
                    weight,
                    font_size: size,
                };
                x += column.width;
                cell
            })
            .collect()
    }

    fn place_head(&self, flow: &mut impl PageFlow) {
        let cells = self.place_cells(
            flow.left(),
            self.columns
                .iter()
                .map(|column| (column.label.as_str(), FontWeight::Bold)),
            self.style.head_font_size,
        );
        flow.place(
            BandKind::Row {
                style: RowStyle::Head,
                cells,
            },
            self.style.head_height,
        );
    }

    /// Lays the table out starting at the flow's cursor.
    ///
    /// Returns the vertical position just below the last row on the final
    /// page the table occupies.
    pub fn render(&self, flow: &mut impl PageFlow) -> Result<f64, LayoutError> {
        self.validate(flow.content_width())?;

        if !flow.fits(self.min_height()) {
            flow.break_page();
        }
        self.place_head(flow);

        for (index, cells) in self.rows.iter().enumerate() {
            let needed = if index + 1 == self.rows.len() {
                self.style.row_height + self.trailer
            } else {
                self.style.row_height
            };
            if !flow.fits(needed) {
                flow.break_page();
                self.place_head(flow);
            }
            let placed = self.place_cells(
                flow.left(),
                cells.iter().map(|cell| (cell.text.as_str(), cell.weight)),
                self.style.body_font_size,
            );
            flow.place(
                BandKind::Row {
                    style: RowStyle::Body,
                    cells: placed,
                },
                self.style.row_height,
            );
        }

        Ok(flow.cursor())
    }
}
