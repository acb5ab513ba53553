//! Draws a finished [`DocumentLayout`] onto a PDF canvas with `printpdf`.
//!
//! The canvas makes no layout decisions. It walks the page descriptors in
//! order and paints each band at the position the layout engine recorded,
//! converting the top-down millimetre coordinates of the layout into the
//! bottom-up coordinates PDF uses.

use std::f64::consts::PI;
use std::io::{BufWriter, Write};

use printpdf::{
    Color, CustomPdfConformance, Image, Line, Mm, PdfConformance, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use crate::error::ReportError;
use crate::fonts::{self, FontPair, FontWeight, MM_PER_PT};
use crate::layout::table::{Align, CELL_PADDING};
use crate::layout::{BandKind, DocumentLayout, PageGeometry, PlacedBand, PlacedCell, RowStyle};
use crate::logo::{LogoAsset, LOGO_DPI};

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(
            f64::from(self.0) / 255.0,
            f64::from(self.1) / 255.0,
            f64::from(self.2) / 255.0,
            None,
        ))
    }
}

const BLACK: Rgb8 = Rgb8(0, 0, 0);
const WHITE: Rgb8 = Rgb8(255, 255, 255);
const TITLE_RED: Rgb8 = Rgb8(255, 34, 34);
const META_FILL: Rgb8 = Rgb8(248, 249, 250);
const ROOM_PURPLE: Rgb8 = Rgb8(176, 159, 198);
const FOOTER_GRAY: Rgb8 = Rgb8(108, 117, 125);
const PLACEHOLDER_FILL: Rgb8 = Rgb8(220, 220, 220);
const PLACEHOLDER_STROKE: Rgb8 = Rgb8(180, 180, 180);
const PLACEHOLDER_TEXT: Rgb8 = Rgb8(120, 120, 120);

/// Border width of bands and table cells, in mm.
const BORDER_WIDTH: f64 = 0.5;
const PLACEHOLDER_BORDER_WIDTH: f64 = 1.0;
const CIRCLE_SEGMENTS: usize = 36;

/// Position and size of the logo box inside the institution band.
const LOGO_X: f64 = 25.0;
const LOGO_Y: f64 = 12.0;
const LOGO_WIDTH: f64 = 20.0;
const LOGO_HEIGHT: f64 = 16.0;

/// Draws finished layouts into PDF documents.
pub struct Canvas<'a> {
    geometry: &'a PageGeometry,
    logo: Option<&'a LogoAsset>,
}

impl<'a> Canvas<'a> {
    pub fn new(geometry: &'a PageGeometry, logo: Option<&'a LogoAsset>) -> Self {
        Self { geometry, logo }
    }

    /// Draws every page of `layout` and returns the serialized PDF.
    pub fn draw(&self, title: &str, layout: &DocumentLayout) -> Result<Vec<u8>, ReportError> {
        let width = Mm(self.geometry.width);
        let height = Mm(self.geometry.height);
        let (document, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
        let document = document.with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }));
        let fonts = FontPair::install(&document)?;

        let mut first = Some((first_page, first_layer));
        for page in &layout.pages {
            let (page_index, layer_index) = match first.take() {
                Some(indices) => indices,
                None => document.add_page(width, height, format!("Page {}", page.number)),
            };
            let layer = document.get_page(page_index).get_layer(layer_index);
            let painter = Painter {
                layer,
                fonts: &fonts,
                geometry: self.geometry,
            };
            for band in &page.bands {
                self.draw_band(&painter, band);
            }
        }

        save(document)
    }

    fn draw_band(&self, painter: &Painter<'_>, band: &PlacedBand) {
        let geometry = self.geometry;
        let left = geometry.margin_left;
        let width = geometry.content_width();
        let center = left + width / 2.0;

        match &band.kind {
            BandKind::Institution { name, subtitle } => {
                match self.logo {
                    Some(logo) => painter.image(logo, LOGO_X, band.y + LOGO_Y, LOGO_WIDTH, LOGO_HEIGHT),
                    None => painter.logo_placeholder(band.y + LOGO_Y),
                }
                let middle = geometry.width / 2.0;
                painter.text(name, middle, band.y + 18.0, 18.0, FontWeight::Bold, Align::Center, BLACK);
                painter.text(subtitle, middle, band.y + 26.0, 14.0, FontWeight::Regular, Align::Center, BLACK);
            }
            BandKind::Title { text } => {
                painter.rect(left, band.y, width, band.height, Some(TITLE_RED), Some(BLACK));
                painter.text(text, center, band.y + 8.0, 14.0, FontWeight::Bold, Align::Center, WHITE);
            }
            BandKind::Meta { date, session } => {
                painter.rect(left, band.y, width, band.height, Some(META_FILL), Some(BLACK));
                let baseline = band.y + 7.0;
                painter.text(&format!("DATE: {date}"), left + 10.0, baseline, 12.0, FontWeight::Bold, Align::Left, TITLE_RED);
                painter.text(&format!("SESSION: {session}"), left + 110.0, baseline, 12.0, FontWeight::Bold, Align::Left, TITLE_RED);
            }
            BandKind::RoomHeader { label } => {
                painter.rect(left, band.y, width, band.height, Some(ROOM_PURPLE), Some(BLACK));
                painter.text(label, left + 5.0, band.y + 6.0, 12.0, FontWeight::Bold, Align::Left, BLACK);
            }
            BandKind::Row { style, cells } => {
                let fill = match style {
                    RowStyle::Head => ROOM_PURPLE,
                    RowStyle::Body | RowStyle::Total => WHITE,
                };
                for cell in cells {
                    painter.rect(cell.x, band.y, cell.width, band.height, Some(fill), Some(BLACK));
                    painter.cell_text(cell, band);
                }
            }
            BandKind::Footer { generated, label } => {
                painter.rule(left, left + width, band.y);
                let baseline = geometry.footer_text;
                painter.text(generated, left, baseline, 9.0, FontWeight::Regular, Align::Left, FOOTER_GRAY);
                if !label.is_empty() {
                    painter.text(label, left + width, baseline, 9.0, FontWeight::Regular, Align::Right, FOOTER_GRAY);
                }
            }
        }
    }
}

/// Drawing primitives for one page layer.
struct Painter<'a> {
    layer: PdfLayerReference,
    fonts: &'a FontPair,
    geometry: &'a PageGeometry,
}

impl Painter<'_> {
    /// Converts a top-down y coordinate into PDF space.
    fn pdf_y(&self, y: f64) -> Mm {
        Mm(self.geometry.height - y)
    }

    fn point(&self, x: f64, y: f64) -> (Point, bool) {
        (Point::new(Mm(x), self.pdf_y(y)), false)
    }

    fn polygon(&self, points: Vec<(Point, bool)>, fill: Option<Rgb8>, stroke: Option<Rgb8>, border: f64) {
        if let Some(color) = fill {
            self.layer.set_fill_color(color.to_pdf());
        }
        if let Some(color) = stroke {
            self.layer.set_outline_color(color.to_pdf());
            self.layer.set_outline_thickness(border / MM_PER_PT);
        }
        self.layer.add_shape(Line {
            points,
            is_closed: true,
            has_fill: fill.is_some(),
            has_stroke: stroke.is_some(),
            is_clipping_path: false,
        });
    }

    fn rect(&self, x: f64, y: f64, width: f64, height: f64, fill: Option<Rgb8>, stroke: Option<Rgb8>) {
        let points = vec![
            self.point(x, y),
            self.point(x + width, y),
            self.point(x + width, y + height),
            self.point(x, y + height),
        ];
        self.polygon(points, fill, stroke, BORDER_WIDTH);
    }

    fn rule(&self, from: f64, to: f64, y: f64) {
        self.layer.set_outline_color(FOOTER_GRAY.to_pdf());
        self.layer.set_outline_thickness(BORDER_WIDTH / MM_PER_PT);
        self.layer.add_shape(Line {
            points: vec![self.point(from, y), self.point(to, y)],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&self, text: &str, x: f64, baseline: f64, size: f64, weight: FontWeight, align: Align, color: Rgb8) {
        if text.is_empty() {
            return;
        }
        let width = fonts::text_width(text, weight, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.layer.set_fill_color(color.to_pdf());
        self.layer
            .use_text(text, size, Mm(x), self.pdf_y(baseline), self.fonts.get(weight));
    }

    fn cell_text(&self, cell: &PlacedCell, band: &PlacedBand) {
        let x = match cell.align {
            Align::Left => cell.x + CELL_PADDING,
            Align::Center => cell.x + cell.width / 2.0,
            Align::Right => cell.x + cell.width - CELL_PADDING,
        };
        // Vertically centred on the cap height.
        let baseline = band.y + band.height / 2.0 + cell.font_size * MM_PER_PT * 0.35;
        self.text(&cell.text, x, baseline, cell.font_size, cell.weight, cell.align, BLACK);
    }

    fn image(&self, logo: &LogoAsset, x: f64, y: f64, width: f64, height: f64) {
        let (scale_x, scale_y) = logo.scale_to(width, height, LOGO_DPI);
        Image::from_dynamic_image(logo.image()).add_to_layer(
            self.layer.clone(),
            Some(Mm(x)),
            Some(self.pdf_y(y + height)),
            None,
            Some(scale_x),
            Some(scale_y),
            Some(LOGO_DPI),
        );
    }

    fn logo_placeholder(&self, y: f64) {
        let cx = LOGO_X + LOGO_WIDTH / 2.0;
        let cy = y + LOGO_HEIGHT / 2.0;
        let radius = LOGO_WIDTH.min(LOGO_HEIGHT) / 2.0;
        let points = (0..CIRCLE_SEGMENTS)
            .map(|step| {
                let angle = 2.0 * PI * step as f64 / CIRCLE_SEGMENTS as f64;
                self.point(cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect();
        self.polygon(
            points,
            Some(PLACEHOLDER_FILL),
            Some(PLACEHOLDER_STROKE),
            PLACEHOLDER_BORDER_WIDTH,
        );
        self.text("LOGO", cx, cy + 1.0, 8.0, FontWeight::Regular, Align::Center, PLACEHOLDER_TEXT);
    }
}

fn save(document: PdfDocumentReference) -> Result<Vec<u8>, ReportError> {
    let mut bytes = Vec::new();
    {
        let mut writer = BufWriter::new(&mut bytes);
        document.save(&mut writer).map_err(ReportError::pdf)?;
        writer.flush()?;
    }
    Ok(bytes)
}
