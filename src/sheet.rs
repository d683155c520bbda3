use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, warn};

use crate::cmap::to_unicode_cmap;
use crate::error::SheetError;
use crate::layout::{LabelLayout, default_layout, layout_by_name, optimal_font_size};
use crate::metrics::{FontMetrics, extract_metrics};
use crate::types::{PageSize, Point};
use crate::utils::encode_win_ansi;
use crate::widths::{
    GlyphFallback, GlyphMetrics, MissingWidthPolicy, PRINTABLE, extract_glyph_metrics,
};
use crate::wrap::{WrapOptions, WrappedLine, wrap_text};

const FONT_RESOURCE: &str = "F1";
const SUBSET_PREFIX: &str = "CUSTOM+";

// Font descriptor values the font itself doesn't provide.
const FONT_FLAGS: i64 = 32;
const STEM_V: i64 = 80;

/// Distance between the cell edge and the text.
const INNER_MARGIN: f32 = 6.0;
/// Distance between the cell corner and the checkbox.
const CHECKBOX_INSET: f32 = 4.0;
const LINE_HEIGHT_RATIO: f32 = 1.2;
const STROKE_WIDTH: f32 = 0.5;

/// Builder for configuring label sheet generation.
///
/// # Examples
///
/// ```no_run
/// use label_sheet::LabelSheet;
///
/// let font = std::fs::read("MyFont.ttf")?;
/// LabelSheet::builder()
///     .layout("Avery L7162")
///     .font_size(14.0)
///     .show_borders(true)
///     .build()
///     .save(&font, "Flour\nbest before May", "labels.pdf")?;
/// # Ok::<(), label_sheet::SheetError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LabelSheetBuilder {
    sheet: LabelSheet,
}

impl LabelSheetBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the sheet layout. Unknown names fall back to the first layout
    /// in the catalog.
    pub fn layout(mut self, name: impl Into<String>) -> Self {
        self.sheet.layout = Some(name.into());
        self
    }

    /// Font size in points.
    pub fn font_size(mut self, size: f32) -> Self {
        self.sheet.font_size = size;
        self
    }

    /// Stroke the outline of every label.
    pub fn show_borders(mut self, show: bool) -> Self {
        self.sheet.show_borders = show;
        self
    }

    /// Draw an empty tick box in the top-right corner of every label.
    pub fn include_checkbox(mut self, include: bool) -> Self {
        self.sheet.include_checkbox = include;
        self
    }

    /// Shrink the font size, if needed, so the text roughly fits a label.
    pub fn auto_font_size(mut self, auto: bool) -> Self {
        self.sheet.auto_font_size = auto;
        self
    }

    pub fn missing_width(mut self, policy: MissingWidthPolicy) -> Self {
        self.sheet.missing_width = policy;
        self
    }

    pub fn glyph_fallback(mut self, fallback: GlyphFallback) -> Self {
        self.sheet.glyph_fallback = fallback;
        self
    }

    /// Document title stored in the PDF metadata.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.sheet.title = title.into();
        self
    }

    pub fn build(self) -> LabelSheet {
        self.sheet
    }
}

impl Default for LabelSheetBuilder {
    fn default() -> Self {
        LabelSheetBuilder {
            sheet: LabelSheet::default(),
        }
    }
}

/// A configured label sheet: renders text in an embedded font onto every cell
/// of a sheet layout.
///
/// # Examples
///
/// ```no_run
/// use label_sheet::LabelSheet;
///
/// let font = std::fs::read("MyFont.ttf")?;
/// let pdf: Vec<u8> = LabelSheet::default().generate(&font, "Date\nLO")?;
/// std::fs::write("labels.pdf", pdf)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct LabelSheet {
    layout: Option<String>,
    font_size: f32,
    show_borders: bool,
    include_checkbox: bool,
    auto_font_size: bool,
    missing_width: MissingWidthPolicy,
    glyph_fallback: GlyphFallback,
    title: String,
}

impl Default for LabelSheet {
    fn default() -> Self {
        LabelSheet {
            layout: None,
            font_size: 12.0,
            show_borders: false,
            include_checkbox: false,
            auto_font_size: false,
            missing_width: MissingWidthPolicy::default(),
            glyph_fallback: GlyphFallback::default(),
            title: "Labels".to_owned(),
        }
    }
}

impl LabelSheet {
    /// Create a builder for configuring generation options.
    pub fn builder() -> LabelSheetBuilder {
        LabelSheetBuilder::new()
    }

    /// The layout that will be used, after falling back for unknown names.
    pub fn resolved_layout(&self) -> &'static LabelLayout {
        self.layout
            .as_deref()
            .and_then(layout_by_name)
            .unwrap_or_else(default_layout)
    }

    /// Font size that will be used for `text`.
    pub fn effective_font_size(&self, text: &str) -> f32 {
        if self.auto_font_size {
            optimal_font_size(self.resolved_layout(), text, self.font_size)
        } else {
            self.font_size
        }
    }

    /// Assemble the finished object graph without serializing it.
    pub fn build_document(&self, font: &[u8], text: &str) -> Result<Document, SheetError> {
        let layout = self.resolved_layout();
        if let Some(name) = self.layout.as_deref().filter(|name| *name != layout.name) {
            warn!("unknown layout {:?}, using {}", name, layout.name);
        }
        let font_size = self.effective_font_size(text);
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(SheetError::AssemblyError(format!(
                "font size must be a positive number of points, got {}",
                font_size
            )));
        }

        let metrics = extract_metrics(font);
        let glyphs = extract_glyph_metrics(font, self.glyph_fallback, self.missing_width);
        debug!(
            "layout {} ({} labels), font {} at {}pt",
            layout.name,
            layout.label_count(),
            metrics.postscript_name,
            font_size
        );

        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let font_id = add_font(&mut doc, font, &metrics, &glyphs);

        let cell = CellGeometry::new(layout, font_size);
        let lines = wrap_text(text, &cell.wrap_options(self.include_checkbox), &glyphs.widths);
        let mut operations = Vec::new();
        for origin in layout.positions() {
            operations.extend(self.label_operations(origin, &cell, &lines));
        }
        let content = Content { operations }.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        let page = LabelLayout::PAGE;
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(page),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    FONT_RESOURCE => font_id,
                },
            },
        });
        doc.set_object(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            },
        );

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.as_str()),
            "Producer" => Object::string_literal("label-sheet"),
        });
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    /// Render the sheet and serialize it to PDF bytes.
    pub fn generate(&self, font: &[u8], text: &str) -> Result<Vec<u8>, SheetError> {
        let mut doc = self.build_document(font, text)?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        debug!("serialized label sheet: {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Render the sheet and write it to `path`.
    pub fn save<P: AsRef<Path>>(&self, font: &[u8], text: &str, path: P) -> Result<(), SheetError> {
        let bytes = self.generate(font, text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn label_operations(
        &self,
        origin: Point,
        cell: &CellGeometry,
        lines: &[WrappedLine],
    ) -> Vec<Operation> {
        let mut ops = Vec::new();
        let top = origin.y + cell.height;

        if self.show_borders || self.include_checkbox {
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new("w", vec![STROKE_WIDTH.into()]));
            if self.show_borders {
                ops.push(rectangle(origin.x, origin.y, cell.width, cell.height));
                ops.push(Operation::new("S", vec![]));
            }
            if self.include_checkbox {
                let size = cell.font_size;
                let x = origin.x + cell.width - CHECKBOX_INSET - size;
                let y = top - CHECKBOX_INSET - size;
                ops.push(rectangle(x, y, size, size));
                ops.push(Operation::new("S", vec![]));
            }
            ops.push(Operation::new("Q", vec![]));
        }

        let mut offset = 0.0;
        for line in lines {
            let text = match line {
                WrappedLine::Gap => {
                    offset += cell.line_height / 2.0;
                    continue;
                }
                WrappedLine::Text(text) => text,
            };
            let baseline = top - INNER_MARGIN - offset - cell.font_size;
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![FONT_RESOURCE.into(), cell.font_size.into()],
            ));
            ops.push(Operation::new(
                "Td",
                vec![(origin.x + INNER_MARGIN).into(), baseline.into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
            offset += cell.line_height;
        }

        ops
    }
}

/// Sizes shared by every cell of one sheet, in points.
struct CellGeometry {
    width: f32,
    height: f32,
    font_size: f32,
    line_height: f32,
}

impl CellGeometry {
    fn new(layout: &LabelLayout, font_size: f32) -> CellGeometry {
        CellGeometry {
            width: layout.label_width_pt(),
            height: layout.label_height_pt(),
            font_size,
            line_height: font_size * LINE_HEIGHT_RATIO,
        }
    }

    fn wrap_options(&self, checkbox: bool) -> WrapOptions {
        let options = WrapOptions::new(
            self.width - 2.0 * INNER_MARGIN,
            self.font_size,
            self.line_height,
        );
        if !checkbox {
            return options;
        }
        // Lines that would run into the box stop one inset short of its left edge.
        let reserved = self.font_size + 2.0 * CHECKBOX_INSET - INNER_MARGIN;
        let depth = (self.font_size + CHECKBOX_INSET - INNER_MARGIN).max(0.0);
        options.with_top_reserve(reserved, depth)
    }
}

fn add_font(doc: &mut Document, font: &[u8], metrics: &FontMetrics, glyphs: &GlyphMetrics) -> ObjectId {
    let base_font = format!("{}{}", SUBSET_PREFIX, metrics.postscript_name);

    let font_file_id = doc.add_object(Stream::new(
        dictionary! {
            "Length1" => font.len() as i64,
        },
        font.to_vec(),
    ));

    let cmap = to_unicode_cmap(glyphs.code_to_glyph.pairs(), &base_font);
    let cmap_id = doc.add_object(Stream::new(dictionary! {}, cmap.into_bytes()));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(base_font.clone().into_bytes()),
        "Flags" => FONT_FLAGS,
        "FontBBox" => metrics.bbox.to_array().iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
        "ItalicAngle" => 0,
        "Ascent" => metrics.ascent,
        "Descent" => metrics.descent,
        "CapHeight" => metrics.cap_height(),
        "StemV" => STEM_V,
        "MissingWidth" => glyphs.missing_width,
        "FontFile2" => font_file_id,
    });

    let widths: Vec<Object> = glyphs
        .widths
        .printable()
        .iter()
        .map(|&w| Object::Real(w))
        .collect();

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => Object::Name(base_font.into_bytes()),
        "FirstChar" => i64::from(*PRINTABLE.start()),
        "LastChar" => i64::from(*PRINTABLE.end()),
        "Widths" => widths,
        "FontDescriptor" => descriptor_id,
        "ToUnicode" => cmap_id,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn media_box(page: PageSize) -> Vec<Object> {
    vec![0.into(), 0.into(), page.width.into(), page.height.into()]
}

fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Operation {
    Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()])
}

/// Render `text` onto the default layout using default settings.
///
/// This is a convenience function equivalent to
/// `LabelSheet::default().generate(font, text)`.
pub fn generate(font: &[u8], text: &str) -> Result<Vec<u8>, SheetError> {
    LabelSheet::default().generate(font, text)
}

/// Render `text` onto the named layout using default settings.
pub fn generate_with_layout(font: &[u8], text: &str, layout: &str) -> Result<Vec<u8>, SheetError> {
    LabelSheet::builder().layout(layout).build().generate(font, text)
}
