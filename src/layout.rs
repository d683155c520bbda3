use crate::types::{CellRect, PageSize, Point, cell_rect, mm_to_pt};

/// Geometry of a commercial label sheet, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub name: &'static str,
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    pub cols: u32,
    pub rows: u32,
    pub margin_left_mm: f32,
    pub margin_top_mm: f32,
    pub spacing_x_mm: f32,
    pub spacing_y_mm: f32,
}

const L7160: LabelLayout = LabelLayout {
    name: "Avery L7160",
    label_width_mm: 63.5,
    label_height_mm: 38.1,
    cols: 3,
    rows: 7,
    margin_left_mm: 7.0,
    margin_top_mm: 15.0,
    spacing_x_mm: 2.5,
    spacing_y_mm: 0.0,
};

/// Known sheets. The first entry is the default.
pub static LAYOUTS: [LabelLayout; 3] = [
    L7160,
    // Inkjet version of the same sheet.
    LabelLayout {
        name: "Avery J8160",
        ..L7160
    },
    LabelLayout {
        name: "Avery L7162",
        label_width_mm: 99.1,
        label_height_mm: 33.9,
        cols: 2,
        rows: 8,
        margin_left_mm: 6.0,
        margin_top_mm: 15.0,
        spacing_x_mm: 0.0,
        spacing_y_mm: 0.0,
    },
];

pub fn layouts() -> &'static [LabelLayout] {
    &LAYOUTS
}

pub fn default_layout() -> &'static LabelLayout {
    &LAYOUTS[0]
}

/// Exact, case-sensitive lookup.
pub fn layout_by_name(name: &str) -> Option<&'static LabelLayout> {
    LAYOUTS.iter().find(|layout| layout.name == name)
}

impl LabelLayout {
    pub const PAGE: PageSize = PageSize::A4_PORTRAIT;

    pub fn label_count(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    pub fn label_width_pt(&self) -> f32 {
        mm_to_pt(self.label_width_mm)
    }

    pub fn label_height_pt(&self) -> f32 {
        mm_to_pt(self.label_height_mm)
    }

    /// Bottom-left corner of the cell at `row`, `col`; row 0 is the top row.
    pub fn position_of(&self, row: u32, col: u32) -> Point {
        let x_mm = self.margin_left_mm + col as f32 * (self.label_width_mm + self.spacing_x_mm);
        let top_mm = self.margin_top_mm + row as f32 * (self.label_height_mm + self.spacing_y_mm);
        Point::new(
            mm_to_pt(x_mm),
            Self::PAGE.height - mm_to_pt(top_mm) - self.label_height_pt(),
        )
    }

    /// Every cell position, row by row from the top, left to right.
    pub fn positions(&self) -> Vec<Point> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| self.position_of(row, col)))
            .collect()
    }

    /// The cells as rectangles, in the same order as `positions`.
    pub fn cells(&self) -> Vec<CellRect> {
        self.positions()
            .into_iter()
            .map(|origin| cell_rect(origin, self.label_width_pt(), self.label_height_pt()))
            .collect()
    }
}

/// Rough upper bound for a font size that fits `text` on one label.
///
/// Assumes glyphs average 0.6 em wide and measures the whole text as one
/// line, so it is only a starting point; wrapping uses the real widths.
pub fn optimal_font_size(layout: &LabelLayout, text: &str, max_size: f32) -> f32 {
    const AVERAGE_CHAR_WIDTH: f32 = 0.6;
    const MAX_HEIGHT_RATIO: f32 = 0.8;

    let length = text.chars().count();
    let width_cap = if length == 0 {
        f32::INFINITY
    } else {
        layout.label_width_pt() / (length as f32 * AVERAGE_CHAR_WIDTH)
    };
    let height_cap = layout.label_height_pt() * MAX_HEIGHT_RATIO;

    max_size.min(width_cap).min(height_cap)
}
