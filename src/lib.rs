//! Printable label sheets from a custom font
//!
//! This library embeds a TrueType font into a single-page PDF and repeats a
//! short, word-wrapped text on every cell of a commercial label sheet layout.

mod cmap;
mod decoder;
mod error;
mod layout;
mod metrics;
mod sheet;
mod types;
mod utils;
mod widths;
mod wrap;

// Re-export error types
pub use error::{DecodeFailure, SheetError};

// Re-export generation API
pub use sheet::{LabelSheet, LabelSheetBuilder, generate, generate_with_layout};

// Re-export building blocks
pub use decoder::GlyphIndex;
pub use cmap::to_unicode_cmap;
pub use layout::{LAYOUTS, LabelLayout, default_layout, layout_by_name, layouts, optimal_font_size};
pub use metrics::{FontMetrics, MetricsProvenance, Origin, extract_metrics};
pub use types::{CellRect, FontBox, MM_TO_PT, PageSize, PageSpace, Point, mm_to_pt};
pub use widths::{
    CharWidths, CodeToGlyphMap, DEFAULT_CHAR_WIDTH, GlyphFallback, GlyphMetrics, GlyphProvenance,
    GlyphWidthTable, MissingWidthPolicy, PRINTABLE, REFERENCE_GLYPH_OFFSET, extract_glyph_metrics,
};
pub use wrap::{WrapOptions, WrappedLine, wrap_text};
