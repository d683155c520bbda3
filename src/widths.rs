use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::decoder::{FontDecoder, GlyphIndex, TtfDecoder};
use crate::metrics::Origin;

pub const DEFAULT_CHAR_WIDTH: f32 = 600.0;

/// Character codes the label renderer can show: printable ASCII.
pub const PRINTABLE: RangeInclusive<u8> = 32..=126;

/// Glyph id = code - 29 matches the glyph order of the font the labels were
/// first laid out with. Other fonts will get the wrong glyphs through it.
pub const REFERENCE_GLYPH_OFFSET: u32 = 29;

/// What to map printable codes to when the font's `cmap` can't be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphFallback {
    /// Assume glyph = code - offset for every printable code.
    Offset(u32),
    /// Map nothing; every code keeps the missing width.
    None,
}

impl Default for GlyphFallback {
    fn default() -> Self {
        GlyphFallback::Offset(REFERENCE_GLYPH_OFFSET)
    }
}

/// Width used for codes whose glyph or advance can't be found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingWidthPolicy {
    /// A fixed width in 1000-unit space.
    Fixed(f32),
    /// The scaled advance of glyph 0 (`.notdef`), or the default width when the
    /// font has none.
    NotdefGlyph,
}

impl Default for MissingWidthPolicy {
    fn default() -> Self {
        MissingWidthPolicy::Fixed(DEFAULT_CHAR_WIDTH)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeToGlyphMap(BTreeMap<u8, GlyphIndex>);

impl CodeToGlyphMap {
    pub fn get(&self, code: u8) -> Option<GlyphIndex> {
        self.0.get(&code).copied()
    }

    /// Pairs in ascending code order.
    pub fn pairs(&self) -> impl Iterator<Item = (u8, GlyphIndex)> + '_ {
        self.0.iter().map(|(&code, &glyph)| (code, glyph))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn with_offset(offset: u32) -> CodeToGlyphMap {
        CodeToGlyphMap(
            PRINTABLE
                .filter_map(|code| {
                    let glyph = u32::from(code).checked_sub(offset)?;
                    Some((code, GlyphIndex::try_from(glyph).ok()?))
                })
                .collect(),
        )
    }
}

/// Advance widths in font units, keyed by glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphWidthTable(HashMap<GlyphIndex, u16>);

impl GlyphWidthTable {
    pub fn get(&self, glyph: GlyphIndex) -> Option<u16> {
        self.0.get(&glyph).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Widths in 1000-unit space for every single-byte code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidths([f32; 256]);

impl CharWidths {
    pub fn filled(width: f32) -> CharWidths {
        CharWidths([width.max(0.0); 256])
    }

    pub fn get(&self, code: u8) -> f32 {
        self.0[usize::from(code)]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Widths for `PRINTABLE`, in code order.
    pub fn printable(&self) -> &[f32] {
        &self.0[usize::from(*PRINTABLE.start())..=usize::from(*PRINTABLE.end())]
    }

    /// Width of `c`; anything outside printable ASCII is measured as a space.
    pub fn char_width(&self, c: char) -> f32 {
        match u8::try_from(u32::from(c)) {
            Ok(code) if PRINTABLE.contains(&code) => self.get(code),
            _ => self.get(b' '),
        }
    }

    /// Width of `text` in points when set at `font_size`.
    pub fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum::<f32>() * font_size / 1000.0
    }

    fn set(&mut self, code: u8, width: f32) {
        self.0[usize::from(code)] = width.max(0.0);
    }
}

impl Default for CharWidths {
    fn default() -> Self {
        CharWidths::filled(DEFAULT_CHAR_WIDTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphProvenance {
    pub cmap: Origin,
    pub hmtx: Origin,
    pub header: Origin,
}

/// Everything the layout needs to know about individual characters.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub code_to_glyph: CodeToGlyphMap,
    pub glyph_widths: GlyphWidthTable,
    pub widths: CharWidths,
    /// 1000 / units per em, or 1 when the header is unreadable.
    pub scale: f32,
    /// Width given to codes without a known advance.
    pub missing_width: f32,
    pub provenance: GlyphProvenance,
}

impl GlyphMetrics {
    pub fn fallback() -> GlyphMetrics {
        GlyphMetrics {
            code_to_glyph: CodeToGlyphMap::default(),
            glyph_widths: GlyphWidthTable::default(),
            widths: CharWidths::default(),
            scale: 1.0,
            missing_width: DEFAULT_CHAR_WIDTH,
            provenance: GlyphProvenance {
                cmap: Origin::Defaulted,
                hmtx: Origin::Defaulted,
                header: Origin::Defaulted,
            },
        }
    }
}

pub fn extract_glyph_metrics(
    font: &[u8],
    glyph_fallback: GlyphFallback,
    missing_width: MissingWidthPolicy,
) -> GlyphMetrics {
    glyph_metrics_from(&TtfDecoder::new(font), glyph_fallback, missing_width)
}

pub(crate) fn glyph_metrics_from<D: FontDecoder>(
    decoder: &D,
    glyph_fallback: GlyphFallback,
    missing_width: MissingWidthPolicy,
) -> GlyphMetrics {
    let mut metrics = GlyphMetrics::fallback();

    let code_to_glyph = decoder.fold_cmap_groups(BTreeMap::new(), |mut map, group| {
        let last = group.end_code.min(255);
        for code in group.start_code..=last {
            let Ok(code) = u8::try_from(code) else {
                continue;
            };
            if !PRINTABLE.contains(&code) {
                continue;
            }
            let glyph = u32::from(group.start_glyph) + (u32::from(code) - group.start_code);
            if let Ok(glyph) = GlyphIndex::try_from(glyph) {
                map.insert(code, glyph);
            }
        }
        map
    });
    match code_to_glyph {
        Ok(map) => {
            metrics.code_to_glyph = CodeToGlyphMap(map);
            metrics.provenance.cmap = Origin::Decoded;
        }
        Err(e) => match glyph_fallback {
            GlyphFallback::Offset(offset) => {
                warn!("{}, guessing glyph = code - {}", e, offset);
                metrics.code_to_glyph = CodeToGlyphMap::with_offset(offset);
            }
            GlyphFallback::None => warn!("{}, leaving every code unmapped", e),
        },
    }

    match decoder.fold_horizontal_metrics(HashMap::new(), |mut table, glyph, advance| {
        table.insert(glyph, advance);
        table
    }) {
        Ok(table) => {
            metrics.glyph_widths = GlyphWidthTable(table);
            metrics.provenance.hmtx = Origin::Decoded;
        }
        Err(e) => warn!("{}, no advance widths available", e),
    }

    match decoder.header() {
        Ok(head) => {
            metrics.scale = 1000.0 / f32::from(head.units_per_em);
            metrics.provenance.header = Origin::Decoded;
        }
        Err(e) => debug!("{}, width scale stays 1.0", e),
    }

    let requested = match missing_width {
        MissingWidthPolicy::Fixed(width) => width,
        MissingWidthPolicy::NotdefGlyph => metrics
            .glyph_widths
            .get(0)
            .map(|advance| f32::from(advance) * metrics.scale)
            .unwrap_or(DEFAULT_CHAR_WIDTH),
    };
    // Same value ends up in /MissingWidth and in every unmapped /Widths slot.
    metrics.missing_width = if requested.is_finite() {
        requested.max(0.0)
    } else {
        warn!("missing width {} is not a number, using {}", requested, DEFAULT_CHAR_WIDTH);
        DEFAULT_CHAR_WIDTH
    };

    let mut widths = CharWidths::filled(metrics.missing_width);
    let mut unresolved = 0;
    for (code, glyph) in metrics.code_to_glyph.pairs() {
        match metrics.glyph_widths.get(glyph) {
            Some(advance) => widths.set(code, f32::from(advance) * metrics.scale),
            None => unresolved += 1,
        }
    }
    metrics.widths = widths;

    debug!(
        "{} codes mapped, {} glyph widths, {} codes without width, scale {}",
        metrics.code_to_glyph.len(),
        metrics.glyph_widths.len(),
        unresolved,
        metrics.scale
    );
    metrics
}
