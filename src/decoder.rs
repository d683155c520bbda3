use tracing::debug;
use ttf_parser::{Face, FaceParsingError, GlyphId, PlatformId, name_id};

use crate::error::DecodeFailure;

pub type GlyphIndex = u16;

/// Raw `head` table values, still in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HeaderTable {
    pub(crate) units_per_em: u16,
    pub(crate) x_min: i16,
    pub(crate) y_min: i16,
    pub(crate) x_max: i16,
    pub(crate) y_max: i16,
}

/// Raw `hhea` table values, still in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HorizontalHeader {
    pub(crate) ascender: i16,
    pub(crate) descender: i16,
}

/// A run of consecutive character codes mapped to consecutive glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CmapGroup {
    pub(crate) start_code: u32,
    pub(crate) end_code: u32,
    pub(crate) start_glyph: GlyphIndex,
}

/// The font tables the label renderer reads. Every lookup can fail on its own;
/// callers decide what to substitute.
pub(crate) trait FontDecoder {
    fn postscript_name(&self) -> Result<String, DecodeFailure>;

    fn header(&self) -> Result<HeaderTable, DecodeFailure>;

    fn horizontal_header(&self) -> Result<HorizontalHeader, DecodeFailure>;

    fn fold_cmap_groups<B, F>(&self, init: B, f: F) -> Result<B, DecodeFailure>
    where
        F: FnMut(B, CmapGroup) -> B;

    /// Folds over `(glyph, advance width)` pairs of the `hmtx` table.
    fn fold_horizontal_metrics<B, F>(&self, init: B, f: F) -> Result<B, DecodeFailure>
    where
        F: FnMut(B, GlyphIndex, u16) -> B;
}

pub(crate) struct TtfDecoder<'a> {
    face: Result<Face<'a>, FaceParsingError>,
}

impl<'a> TtfDecoder<'a> {
    pub(crate) fn new(data: &'a [u8]) -> TtfDecoder<'a> {
        let face = Face::parse(data, 0);
        if let Err(e) = &face {
            debug!("font buffer of {} bytes did not parse: {}", data.len(), e);
        }
        TtfDecoder { face }
    }

    fn face(&self) -> Result<&Face<'a>, DecodeFailure> {
        self.face.as_ref().map_err(|e| DecodeFailure::Parse(*e))
    }
}

impl<'a> FontDecoder for TtfDecoder<'a> {
    fn postscript_name(&self) -> Result<String, DecodeFailure> {
        let face = self.face()?;
        if face.tables().name.is_none() {
            return Err(DecodeFailure::MissingTable("name"));
        }

        face.names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| {
                name.to_string().or_else(|| {
                    // Macintosh Roman records are plain ASCII for PostScript names.
                    (name.platform_id == PlatformId::Macintosh)
                        .then(|| String::from_utf8_lossy(name.name).into_owned())
                })
            })
            .ok_or(DecodeFailure::MissingName)
    }

    fn header(&self) -> Result<HeaderTable, DecodeFailure> {
        let head = &self.face()?.tables().head;
        if head.units_per_em == 0 {
            return Err(DecodeFailure::MissingTable("head"));
        }
        Ok(HeaderTable {
            units_per_em: head.units_per_em,
            x_min: head.global_bbox.x_min,
            y_min: head.global_bbox.y_min,
            x_max: head.global_bbox.x_max,
            y_max: head.global_bbox.y_max,
        })
    }

    fn horizontal_header(&self) -> Result<HorizontalHeader, DecodeFailure> {
        let hhea = &self.face()?.tables().hhea;
        Ok(HorizontalHeader {
            ascender: hhea.ascender,
            descender: hhea.descender,
        })
    }

    fn fold_cmap_groups<B, F>(&self, init: B, mut f: F) -> Result<B, DecodeFailure>
    where
        F: FnMut(B, CmapGroup) -> B,
    {
        let face = self.face()?;
        let subtable = face
            .tables()
            .cmap
            .iter()
            .flat_map(|cmap| cmap.subtables)
            .find(|subtable| subtable.is_unicode())
            .ok_or(DecodeFailure::MissingTable("cmap"))?;

        let mut pairs: Vec<(u32, GlyphIndex)> = Vec::new();
        subtable.codepoints(|codepoint| {
            if let Some(glyph) = subtable.glyph_index(codepoint) {
                pairs.push((codepoint, glyph.0));
            }
        });
        pairs.sort_unstable();
        pairs.dedup_by_key(|pair| pair.0);
        debug!(
            "cmap subtable platform={:?} encoding={} maps {} codepoints",
            subtable.platform_id,
            subtable.encoding_id,
            pairs.len()
        );

        let mut groups: Vec<CmapGroup> = Vec::new();
        for (code, glyph) in pairs {
            match groups.last_mut() {
                Some(group)
                    if group.end_code + 1 == code
                        && u32::from(group.start_glyph) + (code - group.start_code)
                            == u32::from(glyph) =>
                {
                    group.end_code = code;
                }
                _ => groups.push(CmapGroup {
                    start_code: code,
                    end_code: code,
                    start_glyph: glyph,
                }),
            }
        }

        Ok(groups.into_iter().fold(init, |acc, group| f(acc, group)))
    }

    fn fold_horizontal_metrics<B, F>(&self, init: B, mut f: F) -> Result<B, DecodeFailure>
    where
        F: FnMut(B, GlyphIndex, u16) -> B,
    {
        let face = self.face()?;
        if face.tables().hmtx.is_none() {
            return Err(DecodeFailure::MissingTable("hmtx"));
        }

        let mut acc = init;
        for id in 0..face.number_of_glyphs() {
            if let Some(advance) = face.glyph_hor_advance(GlyphId(id)) {
                acc = f(acc, id, advance);
            }
        }
        Ok(acc)
    }
}
