//! PDF report of a single record.
//!
//! Rendering happens in two passes: [`layout`] decides what goes where
//! (page and vertical position of every line), then [`ReportRenderer`] draws
//! that plan with `printpdf`. Only the second pass touches the PDF library,
//! so the layout rules are testable on their own.
//!
//! Layout, top to bottom: title, image (or a placeholder line), primary
//! caption, tags, then one block per language with one sub-block per copy
//! type. The cursor moves down by a fixed line height per line. A new page
//! starts when the cursor reaches the bottom margin, and lines wider than
//! the configured column count are wrapped at word boundaries.

use crate::config::ReportConfig;
use crate::error::{Result, StudioError};
use crate::types::{CopyType, Language, ResultRecord};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::{debug, warn};

pub const REPORT_TITLE: &str = "Image Caption & Marketing Report";
pub const IMAGE_UNAVAILABLE: &str = "[Image unavailable]";

/// printpdf's default image resolution, used to convert pixels to millimetres.
const IMAGE_DPI: f32 = 300.0;

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportItem {
    Title(String),
    Image { width_mm: f32, height_mm: f32 },
    Text(String),
}

/// One item positioned on a page. `y_mm` is the baseline for text and the
/// bottom edge for images, measured from the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub y_mm: f32,
    pub item: ReportItem,
}

struct Cursor<'a> {
    config: &'a ReportConfig,
    page: usize,
    y: f32,
    placements: Vec<Placement>,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            page: 0,
            y: config.page_height_mm - config.margin_mm,
            placements: Vec::new(),
        }
    }

    fn top(&self) -> f32 {
        self.config.page_height_mm - self.config.margin_mm
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < self.config.margin_mm && self.y < self.top() {
            self.page += 1;
            self.y = self.top();
        }
    }

    fn title(&mut self, text: &str) {
        self.ensure_room(self.config.line_height_mm);
        self.push(ReportItem::Title(text.to_string()));
        self.y -= self.config.line_height_mm * 2.0;
    }

    fn image(&mut self, width_mm: f32, height_mm: f32) {
        self.ensure_room(height_mm);
        self.y -= height_mm;
        self.push(ReportItem::Image { width_mm, height_mm });
        self.y -= self.config.line_height_mm;
    }

    /// Emit `text` as one or more lines, wrapping long ones.
    fn line(&mut self, text: &str) {
        for wrapped in wrap_line(text, self.config.wrap_columns) {
            self.ensure_room(self.config.line_height_mm);
            self.push(ReportItem::Text(wrapped));
            self.y -= self.config.line_height_mm;
        }
    }

    /// Emit every newline-delimited segment of `text` as its own line.
    fn lines(&mut self, text: &str) {
        for segment in text.lines() {
            self.line(segment);
        }
    }

    fn gap(&mut self) {
        self.y -= self.config.line_height_mm;
    }

    fn push(&mut self, item: ReportItem) {
        self.placements.push(Placement {
            page: self.page,
            y_mm: self.y,
            item,
        });
    }
}

/// Compute the placement of every report element.
///
/// `image_px` is the pixel size of the decoded image, or `None` when the
/// image could not be loaded.
pub fn layout(record: &ResultRecord, image_px: Option<(u32, u32)>, config: &ReportConfig) -> Vec<Placement> {
    let mut cursor = Cursor::new(config);

    cursor.title(REPORT_TITLE);

    match image_px {
        Some((w, h)) if w > 0 && h > 0 => {
            let (width_mm, height_mm) = image_size_mm(w, h, config);
            cursor.image(width_mm, height_mm);
        }
        _ => cursor.line(IMAGE_UNAVAILABLE),
    }

    cursor.line("Caption:");
    cursor.lines(&record.caption_primary);
    cursor.gap();

    cursor.line("Tags:");
    cursor.line(&record.tags.join(", "));
    cursor.gap();

    for language in Language::ALL {
        let copy = record.marketing_for(language);
        cursor.line(&format!("{} Marketing:", language));
        for copy_type in CopyType::ALL {
            cursor.line(&format!("- {}:", copy_type));
            if let Some(text) = copy.get(&copy_type) {
                cursor.lines(text);
            }
        }
        cursor.gap();
    }

    cursor.placements
}

/// Fixed-width image size, shrunk so it never exceeds the printable height.
fn image_size_mm(width_px: u32, height_px: u32, config: &ReportConfig) -> (f32, f32) {
    let aspect = height_px as f32 / width_px as f32;
    let max_height = (config.page_height_mm - 2.0 * config.margin_mm).max(1.0);

    let width_mm = config.image_width_mm;
    let height_mm = width_mm * aspect;
    if height_mm <= max_height {
        (width_mm, height_mm)
    } else {
        (max_height / aspect, max_height)
    }
}

/// Split `line` into pieces of at most `columns` characters, breaking at
/// spaces where possible. An empty line stays one empty line.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    if line.chars().count() <= columns {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split(' ') {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > columns {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > columns {
            // Unbreakable run (URLs, CJK text): hard-split by characters.
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(columns) {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
                current_len = chunk.len();
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 || out.is_empty() {
        out.push(current);
    }
    out
}

/// Renders records as A4 (by default) PDF documents.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    config: ReportConfig,
}

impl ReportRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Render `record` to PDF bytes. `image` is the raw stored image; when it
    /// is missing or undecodable a placeholder line is drawn instead.
    pub fn render(&self, record: &ResultRecord, image: Option<&[u8]>) -> Result<Vec<u8>> {
        let decoded = image.and_then(|bytes| match image_crate::load_from_memory(bytes) {
            Ok(img) => Some(DynamicImage::ImageRgb8(img.to_rgb8())),
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "Cannot decode image for report");
                None
            }
        });

        let placements = layout(record, decoded.as_ref().map(|img| img.dimensions()), &self.config);

        let width = Mm(self.config.page_width_mm);
        let height = Mm(self.config.page_height_mm);
        let (doc, first_page, first_layer) = PdfDocument::new(REPORT_TITLE, width, height, "Layer 1");
        let fonts = self.fonts(&doc)?;
        if !fonts.embedded {
            let lines = unencodable_lines(&placements);
            if lines > 0 {
                warn!(
                    record_id = %record.id,
                    lines,
                    "Built-in font cannot draw some characters and they will be missing; set report.font_path to a TrueType font"
                );
            }
        }

        let mut layers: Vec<PdfLayerReference> = vec![doc.get_page(first_page).get_layer(first_layer)];
        let mut image = decoded;

        for placement in &placements {
            while layers.len() <= placement.page {
                let (page, layer) = doc.add_page(width, height, "Layer 1");
                layers.push(doc.get_page(page).get_layer(layer));
            }
            let layer = &layers[placement.page];
            let x = Mm(self.config.margin_mm);
            let y = Mm(placement.y_mm);

            match &placement.item {
                ReportItem::Title(text) => {
                    layer.use_text(text.as_str(), self.config.title_font_size, x, y, &fonts.title);
                }
                ReportItem::Text(text) => {
                    layer.use_text(text.as_str(), self.config.font_size, x, y, &fonts.body);
                }
                ReportItem::Image { width_mm, .. } => {
                    if let Some(img) = image.take() {
                        let native_width_mm = img.width() as f32 / IMAGE_DPI * 25.4;
                        let scale = width_mm / native_width_mm;
                        Image::from_dynamic_image(&img).add_to_layer(
                            layer.clone(),
                            ImageTransform {
                                translate_x: Some(x),
                                translate_y: Some(y),
                                scale_x: Some(scale),
                                scale_y: Some(scale),
                                dpi: Some(IMAGE_DPI),
                                ..Default::default()
                            },
                        );
                    }
                }
            }
        }

        let pages = layers.len();
        let bytes = doc
            .save_to_bytes()
            .map_err(|e| StudioError::Render(format!("{:?}", e)))?;
        debug!(record_id = %record.id, pages, bytes = bytes.len(), "Rendered report");
        Ok(bytes)
    }

    /// Body and title fonts: the configured TrueType font for both, or
    /// Helvetica / Helvetica-Bold.
    fn fonts(&self, doc: &PdfDocumentReference) -> Result<ReportFonts> {
        if let Some(path) = &self.config.font_path {
            match std::fs::File::open(path) {
                Ok(file) => match doc.add_external_font(file) {
                    Ok(font) => {
                        return Ok(ReportFonts {
                            body: font.clone(),
                            title: font,
                            embedded: true,
                        })
                    }
                    Err(e) => warn!(path = %path.display(), error = ?e, "Unusable report font"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "Cannot open report font"),
            }
        }

        let body = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| StudioError::Render(format!("{:?}", e)))?;
        let title = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| StudioError::Render(format!("{:?}", e)))?;
        Ok(ReportFonts {
            body,
            title,
            embedded: false,
        })
    }
}

struct ReportFonts {
    body: IndirectFontRef,
    title: IndirectFontRef,
    /// False for the built-in fonts, which only cover WinAnsi.
    embedded: bool,
}

/// Whether the built-in (WinAnsi encoded) fonts can draw `c`.
fn is_win_ansi(c: char) -> bool {
    matches!(c, '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}')
        || "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ".contains(c)
}

/// Number of text lines holding characters the built-in fonts drop.
fn unencodable_lines(placements: &[Placement]) -> usize {
    placements
        .iter()
        .filter(|p| match &p.item {
            ReportItem::Title(text) | ReportItem::Text(text) => !text.chars().all(is_win_ansi),
            ReportItem::Image { .. } => false,
        })
        .count()
}
