//! Page layout engine for the summary and detailed reports.
//!
//! Layout runs in two phases. The render phase walks the report content top
//! down, places fixed-height bands on a page canvas and starts new pages when
//! the cursor would cross the content bottom. Every page is tagged as a
//! header page or a continuation page at the moment it is created. The
//! finalize phase then consumes the finished page sequence and stamps the
//! footer band onto header pages only. The output is a [`DocumentLayout`], a
//! plain description of positioned bands that the canvas draws verbatim.

pub mod table;

use log::debug;

use crate::error::LayoutError;
use crate::fonts::FontWeight;
use crate::model::{RoomAssignment, Student, SummaryRow};
use table::{Align, Cell, ColumnSpec, PageFlow, Table, TableStyle};

/// Dimensions of the page canvas, in millimetres from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// First content line on continuation pages.
    pub top_margin: f64,
    pub institution_height: f64,
    pub title_height: f64,
    pub meta_height: f64,
    /// Space between the meta band and the first room on summary pages.
    pub summary_gap: f64,
    /// Space between the meta band and the room header on detailed pages.
    pub detailed_gap: f64,
    pub room_header_height: f64,
    pub table_head_height: f64,
    pub table_row_height: f64,
    pub total_row_height: f64,
    /// Content must end at or above this line.
    pub content_bottom: f64,
    pub footer_rule: f64,
    pub footer_text: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// Portrait A4 with 20 mm side margins.
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin_left: 20.0,
            margin_right: 20.0,
            top_margin: 15.0,
            institution_height: 35.0,
            title_height: 12.0,
            meta_height: 10.0,
            summary_gap: 13.0,
            detailed_gap: 3.0,
            room_header_height: 10.0,
            table_head_height: 10.0,
            table_row_height: 8.0,
            total_row_height: 10.0,
            content_bottom: 275.0,
            footer_rule: 280.0,
            footer_text: 290.0,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    /// Bottom edge of the institution, title and meta bands.
    pub fn header_stack_height(&self) -> f64 {
        self.institution_height + self.title_height + self.meta_height
    }

    /// First content line on a header page of the given report kind.
    pub fn content_start(&self, kind: ReportKind) -> f64 {
        let gap = match kind {
            ReportKind::Summary => self.summary_gap,
            ReportKind::Detailed => self.detailed_gap,
        };
        self.header_stack_height() + gap
    }

    /// Checks that every page kind can hold its minimum content.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.content_width() <= 0.0 {
            return Err(LayoutError::PageTooSmall(format!(
                "side margins of {} mm leave no room on a {} mm wide page",
                self.margin_left + self.margin_right,
                self.width
            )));
        }

        if self.content_bottom > self.footer_rule || self.footer_text > self.height {
            return Err(LayoutError::PageTooSmall(
                "footer does not fit below the content area".to_owned(),
            ));
        }

        let first_room = self.room_header_height + self.table_head_height + self.table_row_height;
        for kind in [ReportKind::Summary, ReportKind::Detailed] {
            let closing = match kind {
                ReportKind::Summary => self.total_row_height,
                ReportKind::Detailed => 0.0,
            };
            if self.content_start(kind) + first_room + closing > self.content_bottom {
                return Err(LayoutError::PageTooSmall(format!(
                    "a {} page cannot hold a room header, table head, one row and its closing line",
                    kind.as_str()
                )));
            }
        }

        if self.top_margin + self.table_head_height + self.table_row_height > self.content_bottom {
            return Err(LayoutError::PageTooSmall(
                "a continuation page cannot hold a table head and one row".to_owned(),
            ));
        }

        Ok(())
    }
}

/// The two report layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Room by room class distribution in one continuous flow.
    Summary,
    /// Full roster of every room, each room starting on its own page.
    Detailed,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Detailed => "Detailed",
        }
    }
}

/// Whether a page carries the document header and footer bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// First page of the document or of a room section.
    Header,
    /// Produced by table overflow; carries only table rows.
    Continuation,
}

/// Visual treatment of a table row band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStyle {
    Head,
    Body,
    /// The summary's per-room `TOTAL` line.
    Total,
}

/// Text placed inside one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedCell {
    pub x: f64,
    pub width: f64,
    pub align: Align,
    pub text: String,
    pub weight: FontWeight,
    pub font_size: f64,
}

/// Contents of a band.
#[derive(Clone, Debug, PartialEq)]
pub enum BandKind {
    /// Logo and the two institution lines.
    Institution { name: String, subtitle: String },
    /// Exam title banner.
    Title { text: String },
    /// Date and session row.
    Meta { date: String, session: String },
    /// Colored banner opening a room section.
    RoomHeader { label: String },
    /// One grid row of a table.
    Row { style: RowStyle, cells: Vec<PlacedCell> },
    /// Rule and generation line at the bottom of a header page.
    Footer { generated: String, label: String },
}

/// A band at its final position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedBand {
    pub y: f64,
    pub height: f64,
    pub kind: BandKind,
}

/// One page of a finished layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PageDescriptor {
    /// 1-based page number.
    pub number: usize,
    pub kind: PageKind,
    /// Index of the room section the page was opened for or continues.
    pub room: Option<usize>,
    pub bands: Vec<PlacedBand>,
}

impl PageDescriptor {
    pub fn is_header_page(&self) -> bool {
        self.kind == PageKind::Header
    }

    /// Bands matching `predicate`, in placement order.
    pub fn bands_where<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a PlacedBand>
    where
        F: Fn(&BandKind) -> bool + 'a,
    {
        self.bands.iter().filter(move |band| predicate(&band.kind))
    }

    pub fn has_footer(&self) -> bool {
        self.bands
            .iter()
            .any(|band| matches!(band.kind, BandKind::Footer { .. }))
    }
}

/// The laid out report, ready to be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentLayout {
    pub kind: ReportKind,
    pub pages: Vec<PageDescriptor>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based numbers of the pages tagged as header pages.
    pub fn header_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|page| page.is_header_page())
            .map(|page| page.number)
            .collect()
    }

    /// First page number of every room section, by room index.
    pub fn room_start_pages(&self) -> Vec<(usize, usize)> {
        let mut starts: Vec<(usize, usize)> = Vec::new();
        for page in &self.pages {
            for band in &page.bands {
                if let (BandKind::RoomHeader { .. }, Some(room)) = (&band.kind, page.room) {
                    if !starts.iter().any(|(known, _)| *known == room) {
                        starts.push((room, page.number));
                    }
                }
            }
        }
        starts
    }
}

/// Document level texts repeated on every header page.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentHeader {
    pub institution: String,
    pub subtitle: String,
    pub title: String,
    pub date: String,
    pub session: String,
}

/// Vertical position on the page currently being filled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageCursor {
    pub page_index: usize,
    pub y: f64,
}

/// Places bands page by page and owns the page sequence while doing so.
pub struct LayoutEngine<'a> {
    geometry: &'a PageGeometry,
    kind: ReportKind,
    header: &'a DocumentHeader,
    pages: Vec<PageDescriptor>,
    cursor: PageCursor,
    room: Option<usize>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(geometry: &'a PageGeometry, kind: ReportKind, header: &'a DocumentHeader) -> Self {
        Self {
            geometry,
            kind,
            header,
            pages: Vec::new(),
            cursor: PageCursor::default(),
            room: None,
        }
    }

    /// Page index and vertical position of the next band.
    pub fn position(&self) -> PageCursor {
        self.cursor
    }

    fn open_page(&mut self, kind: PageKind, start: f64) {
        let number = self.pages.len() + 1;
        debug!(
            "{} layout: page {} opened as {:?} (room {:?})",
            self.kind.as_str(),
            number,
            kind,
            self.room
        );
        self.pages.push(PageDescriptor {
            number,
            kind,
            room: self.room,
            bands: Vec::new(),
        });
        self.cursor = PageCursor {
            page_index: number - 1,
            y: start,
        };
    }

    /// Starts a page carrying the institution, title and meta bands.
    pub fn start_header_page(&mut self) {
        let geometry = self.geometry;
        let header = self.header;
        self.open_page(PageKind::Header, 0.0);
        self.place(
            BandKind::Institution {
                name: header.institution.clone(),
                subtitle: header.subtitle.clone(),
            },
            geometry.institution_height,
        );
        self.place(
            BandKind::Title {
                text: header.title.to_uppercase(),
            },
            geometry.title_height,
        );
        self.place(
            BandKind::Meta {
                date: header.date.clone(),
                session: header.session.clone(),
            },
            geometry.meta_height,
        );
        self.cursor.y = geometry.content_start(self.kind);
    }

    /// Starts a plain page for rows that overflowed the previous one.
    pub fn start_continuation_page(&mut self) {
        self.open_page(PageKind::Continuation, self.geometry.top_margin);
    }

    /// Marks the room section subsequent pages belong to.
    ///
    /// The current page is retagged unless it already holds another room.
    pub fn enter_room(&mut self, room: usize) {
        self.room = Some(room);
        if let Some(page) = self.pages.last_mut() {
            let holds_room = page
                .bands
                .iter()
                .any(|band| matches!(band.kind, BandKind::RoomHeader { .. }));
            if !holds_room {
                page.room = Some(room);
            }
        }
    }

    /// Whether the cursor sits on the first content line of a header page.
    pub fn at_content_start(&self) -> bool {
        let start = self.geometry.content_start(self.kind);
        self.pages
            .last()
            .map_or(true, |page| page.is_header_page() && self.cursor.y <= start)
    }

    /// Ends the render phase and stamps footers onto the header pages.
    pub fn finish(self, footer: &FooterText) -> DocumentLayout {
        let layout = DocumentLayout {
            kind: self.kind,
            pages: self.pages,
        };
        finalize(layout, self.geometry, footer)
    }
}

impl PageFlow for LayoutEngine<'_> {
    fn cursor(&self) -> f64 {
        self.cursor.y
    }

    fn left(&self) -> f64 {
        self.geometry.margin_left
    }

    fn content_width(&self) -> f64 {
        self.geometry.content_width()
    }

    fn fits(&self, height: f64) -> bool {
        self.cursor.y + height <= self.geometry.content_bottom + f64::EPSILON
    }

    fn place(&mut self, kind: BandKind, height: f64) {
        if self.pages.is_empty() {
            self.start_header_page();
        }
        let y = self.cursor.y;
        if let Some(page) = self.pages.last_mut() {
            page.bands.push(PlacedBand { y, height, kind });
        }
        self.cursor.y += height;
    }

    fn break_page(&mut self) {
        match self.kind {
            ReportKind::Summary => self.start_header_page(),
            ReportKind::Detailed => self.start_continuation_page(),
        }
    }
}

/// Texts of the footer band.
#[derive(Clone, Debug, PartialEq)]
pub struct FooterText {
    /// Left aligned generation line, e.g. `Generated on: 15/11/2024, 09:30:00`.
    pub generated: String,
    /// Room numbers by room index, used by the detailed footer label.
    pub room_numbers: Vec<String>,
}

fn footer_label(kind: ReportKind, page: &PageDescriptor, total: usize, footer: &FooterText) -> String {
    match kind {
        ReportKind::Summary => format!("Page {} of {}", page.number, total),
        ReportKind::Detailed => page
            .room
            .and_then(|room| footer.room_numbers.get(room))
            .map(|number| format!("Room: {number}"))
            .unwrap_or_default(),
    }
}

/// Stamps the footer band onto every header page of a finished layout.
///
/// Continuation pages are passed through untouched.
pub fn finalize(
    mut layout: DocumentLayout,
    geometry: &PageGeometry,
    footer: &FooterText,
) -> DocumentLayout {
    let total = layout.pages.len();
    let kind = layout.kind;
    for page in layout.pages.iter_mut().filter(|page| page.is_header_page()) {
        let label = footer_label(kind, page, total, footer);
        page.bands.push(PlacedBand {
            y: geometry.footer_rule,
            height: geometry.height - geometry.footer_rule,
            kind: BandKind::Footer {
                generated: footer.generated.clone(),
                label,
            },
        });
    }
    layout
}

const HEAD_FONT_SIZE: f64 = 10.0;
const BODY_FONT_SIZE: f64 = 9.0;
const SUMMARY_FONT_SIZE: f64 = 10.0;
const TOTAL_FONT_SIZE: f64 = 12.0;

fn table_style(geometry: &PageGeometry, body_font_size: f64) -> TableStyle {
    TableStyle {
        head_height: geometry.table_head_height,
        row_height: geometry.table_row_height,
        head_font_size: HEAD_FONT_SIZE,
        body_font_size,
    }
}

/// Column layout of the summary table: class, roll range, head count.
pub fn summary_columns(geometry: &PageGeometry) -> Vec<ColumnSpec> {
    let width = geometry.content_width();
    let count = width * 40.0 / 170.0;
    let class = width * 60.0 / 170.0;
    vec![
        ColumnSpec::new("Class", class, Align::Left),
        ColumnSpec::new("Roll Numbers", width - class - count, Align::Left),
        ColumnSpec::new("Students", count, Align::Center),
    ]
}

/// Column layout of the detailed roster table.
pub fn roster_columns(geometry: &PageGeometry) -> Vec<ColumnSpec> {
    let width = geometry.content_width();
    let roll = width * 40.0 / 170.0;
    let class = width * 50.0 / 170.0;
    vec![
        ColumnSpec::new("Roll Number", roll, Align::Center),
        ColumnSpec::new("Student Name", width - roll - class, Align::Left),
        ColumnSpec::new("Class", class, Align::Center),
    ]
}

fn summary_table(geometry: &PageGeometry, row: &SummaryRow) -> Table {
    let rows = row
        .class_data
        .iter()
        .map(|class| {
            vec![
                Cell::bold(class.class_name.as_str()),
                Cell::regular(class.roll_range.as_str()),
                Cell::bold(class.count.to_string()),
            ]
        })
        .collect();
    Table::new(summary_columns(geometry), table_style(geometry, SUMMARY_FONT_SIZE))
        .with_rows(rows)
        .with_trailer(geometry.total_row_height)
}

fn roster_table(geometry: &PageGeometry, roster: &[Student]) -> Table {
    let rows = roster
        .iter()
        .map(|student| {
            vec![
                Cell::regular(student.roll_number.as_str()),
                Cell::regular(student.student_name.as_str()),
                Cell::regular(student.class_name.as_str()),
            ]
        })
        .collect();
    Table::new(roster_columns(geometry), table_style(geometry, BODY_FONT_SIZE)).with_rows(rows)
}

fn total_cells(geometry: &PageGeometry, total: usize) -> Vec<PlacedCell> {
    let columns = summary_columns(geometry);
    let count_width = columns.last().map_or(0.0, |column| column.width);
    let label_width = geometry.content_width() - count_width;
    vec![
        PlacedCell {
            x: geometry.margin_left,
            width: label_width,
            align: Align::Left,
            text: "TOTAL".to_owned(),
            weight: FontWeight::Bold,
            font_size: TOTAL_FONT_SIZE,
        },
        PlacedCell {
            x: geometry.margin_left + label_width,
            width: count_width,
            align: Align::Center,
            text: total.to_string(),
            weight: FontWeight::Bold,
            font_size: TOTAL_FONT_SIZE,
        },
    ]
}

/// Label of a room banner in the summary report.
pub fn summary_room_label(index: usize, row: &SummaryRow) -> String {
    format!(
        "{}.Room No : {}({})",
        index + 1,
        row.room_number,
        row.room_building
    )
}

/// Label of a room banner in the detailed report.
pub fn detailed_room_label(room: &RoomAssignment) -> String {
    format!(
        "{} - {} ({})",
        room.room_number, room.room_building, room.room_floor
    )
}

/// Lays out the summary report: one continuous flow of room blocks.
pub fn layout_summary(
    geometry: &PageGeometry,
    header: &DocumentHeader,
    rows: &[SummaryRow],
    footer: &FooterText,
) -> Result<DocumentLayout, LayoutError> {
    geometry.validate()?;
    let mut engine = LayoutEngine::new(geometry, ReportKind::Summary, header);
    engine.start_header_page();

    let fresh_page = geometry.content_bottom - geometry.content_start(ReportKind::Summary);

    for (index, row) in rows.iter().enumerate() {
        let table = summary_table(geometry, row);
        let block = geometry.room_header_height + table.height();
        let minimum = geometry.room_header_height + table.min_height();
        let wanted = if block <= fresh_page { block } else { minimum };

        if !engine.fits(wanted) && !engine.at_content_start() {
            engine.start_header_page();
        }
        engine.enter_room(index);

        engine.place(
            BandKind::RoomHeader {
                label: summary_room_label(index, row),
            },
            geometry.room_header_height,
        );
        // The table keeps room for the total below its last row.
        table.render(&mut engine)?;
        engine.place(
            BandKind::Row {
                style: RowStyle::Total,
                cells: total_cells(geometry, row.total_students),
            },
            geometry.total_row_height,
        );
    }

    Ok(engine.finish(footer))
}

/// Lays out the detailed report: every room opens a new header page.
pub fn layout_detailed(
    geometry: &PageGeometry,
    header: &DocumentHeader,
    rooms: &[(&RoomAssignment, Vec<Student>)],
    footer: &FooterText,
) -> Result<DocumentLayout, LayoutError> {
    geometry.validate()?;
    let mut engine = LayoutEngine::new(geometry, ReportKind::Detailed, header);

    if rooms.is_empty() {
        engine.start_header_page();
    }

    for (index, (room, roster)) in rooms.iter().enumerate() {
        engine.start_header_page();
        engine.enter_room(index);
        engine.place(
            BandKind::RoomHeader {
                label: detailed_room_label(room),
            },
            geometry.room_header_height,
        );
        roster_table(geometry, roster).render(&mut engine)?;
    }

    Ok(engine.finish(footer))
}
