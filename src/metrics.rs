use tracing::{debug, warn};

use crate::decoder::{FontDecoder, TtfDecoder};
use crate::types::FontBox;

pub const FALLBACK_FONT_NAME: &str = "CustomFont";
pub const FALLBACK_BBOX: FontBox = FontBox {
    left: -200.0,
    bottom: -250.0,
    right: 1200.0,
    top: 950.0,
};
pub const FALLBACK_UNITS_PER_EM: f32 = 1000.0;
pub const FALLBACK_ASCENT: f32 = 800.0;
pub const FALLBACK_DESCENT: f32 = -200.0;

/// Whether a value came out of the font or was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Decoded,
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsProvenance {
    pub name: Origin,
    pub header: Origin,
    pub horizontal_header: Origin,
}

impl MetricsProvenance {
    pub fn fully_decoded(&self) -> bool {
        [self.name, self.header, self.horizontal_header]
            .iter()
            .all(|origin| *origin == Origin::Decoded)
    }
}

/// Font-wide metrics normalized to a 1000 units-per-em space.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    pub postscript_name: String,
    pub bbox: FontBox,
    pub units_per_em: f32,
    pub ascent: f32,
    pub descent: f32,
    pub provenance: MetricsProvenance,
}

impl FontMetrics {
    pub fn fallback() -> FontMetrics {
        FontMetrics {
            postscript_name: FALLBACK_FONT_NAME.to_owned(),
            bbox: FALLBACK_BBOX,
            units_per_em: FALLBACK_UNITS_PER_EM,
            ascent: FALLBACK_ASCENT,
            descent: FALLBACK_DESCENT,
            provenance: MetricsProvenance {
                name: Origin::Defaulted,
                header: Origin::Defaulted,
                horizontal_header: Origin::Defaulted,
            },
        }
    }

    /// Estimated cap height; simple TrueType fonts don't always carry one.
    pub fn cap_height(&self) -> f32 {
        self.ascent * 0.8
    }
}

/// Reads name, bounding box, and vertical metrics from raw font bytes. Each
/// lookup falls back independently, so a font with a broken `name` table still
/// contributes its real bounding box.
pub fn extract_metrics(font: &[u8]) -> FontMetrics {
    metrics_from(&TtfDecoder::new(font))
}

pub(crate) fn metrics_from<D: FontDecoder>(decoder: &D) -> FontMetrics {
    let mut metrics = FontMetrics::fallback();

    match decoder.postscript_name().map(sanitize_name) {
        Ok(Some(name)) => {
            metrics.postscript_name = name;
            metrics.provenance.name = Origin::Decoded;
        }
        Ok(None) => warn!("PostScript name has no usable characters, using {}", FALLBACK_FONT_NAME),
        Err(e) => warn!("{}, using {}", e, FALLBACK_FONT_NAME),
    }

    match decoder.header() {
        Ok(head) => {
            metrics.units_per_em = f32::from(head.units_per_em);
            let scale = 1000.0 / metrics.units_per_em;
            metrics.bbox = FontBox {
                left: f32::from(head.x_min) * scale,
                bottom: f32::from(head.y_min) * scale,
                right: f32::from(head.x_max) * scale,
                top: f32::from(head.y_max) * scale,
            };
            metrics.provenance.header = Origin::Decoded;
        }
        Err(e) => warn!("{}, using default bounding box", e),
    }

    // Without a header the vertical metrics are taken as already in 1000 units.
    let scale = 1000.0 / metrics.units_per_em;
    match decoder.horizontal_header() {
        Ok(hhea) => {
            metrics.ascent = f32::from(hhea.ascender) * scale;
            metrics.descent = f32::from(hhea.descender) * scale;
            metrics.provenance.horizontal_header = Origin::Decoded;
        }
        Err(e) => warn!("{}, using default ascent/descent", e),
    }

    debug!(
        "metrics for {}: bbox {} ascent {:.1} descent {:.1} upem {}",
        metrics.postscript_name, metrics.bbox, metrics.ascent, metrics.descent, metrics.units_per_em
    );
    metrics
}

/// Keeps only characters that are legal inside a PDF name and a PostScript
/// font name.
fn sanitize_name(name: String) -> Option<String> {
    let clean: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    (!clean.is_empty()).then_some(clean)
}
