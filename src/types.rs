use std::fmt;

use euclid::{Point2D, Rect, Size2D};

/// Millimetres to PDF points (1/72 inch).
pub const MM_TO_PT: f32 = 2.834645669;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// PDF user space: points, origin at the bottom-left corner of the page.
pub struct PageSpace;

pub type Point = Point2D<f32, PageSpace>;
pub type CellRect = Rect<f32, PageSpace>;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4_PORTRAIT: PageSize = PageSize {
        width: A4_WIDTH_MM * MM_TO_PT,
        height: A4_HEIGHT_MM * MM_TO_PT,
    };

    pub fn contains(&self, point: Point) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Bounding box in 1000-units-per-em glyph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl FontBox {
    pub fn to_array(self) -> [f32; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

impl fmt::Display for FontBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(l: {:.1}, b: {:.1}, r: {:.1}, t: {:.1})",
            self.left, self.bottom, self.right, self.top
        )
    }
}

pub(crate) fn cell_rect(origin: Point, width: f32, height: f32) -> CellRect {
    Rect::new(origin, Size2D::new(width, height))
}
