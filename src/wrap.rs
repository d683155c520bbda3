use crate::widths::CharWidths;

/// One entry of wrapped label text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrappedLine {
    Text(String),
    /// Paragraph break: half a line of vertical space, nothing drawn.
    Gap,
}

impl WrappedLine {
    pub fn is_gap(&self) -> bool {
        matches!(self, WrappedLine::Gap)
    }

    /// The printed text; empty for a gap.
    pub fn as_str(&self) -> &str {
        match self {
            WrappedLine::Text(text) => text,
            WrappedLine::Gap => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapOptions {
    /// Line width available in points.
    pub max_width: f32,
    /// Narrower width used while the line starts within `height_threshold` of
    /// the top, leaving room for a marker in the corner.
    pub max_width_near_top: f32,
    pub height_threshold: f32,
    pub font_size: f32,
    pub line_height: f32,
}

impl WrapOptions {
    pub fn new(max_width: f32, font_size: f32, line_height: f32) -> WrapOptions {
        WrapOptions {
            max_width,
            max_width_near_top: max_width,
            height_threshold: 0.0,
            font_size,
            line_height,
        }
    }

    /// Reserves `reserved` points on the right of every line starting no
    /// lower than `height` below the top.
    pub fn with_top_reserve(mut self, reserved: f32, height: f32) -> WrapOptions {
        self.max_width_near_top = (self.max_width - reserved).max(0.0);
        self.height_threshold = height;
        self
    }

    fn width_at(&self, offset: f32) -> f32 {
        if offset <= self.height_threshold {
            self.max_width_near_top
        } else {
            self.max_width
        }
    }
}

/// Greedy word wrap. Lines break on `'\n'` and on spaces; a word wider than
/// the line is never split and ends up alone on its line.
pub fn wrap_text(text: &str, options: &WrapOptions, widths: &CharWidths) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut offset = 0.0;

    for (index, paragraph) in text.split('\n').enumerate() {
        if index > 0 {
            lines.push(WrappedLine::Gap);
        }
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);

        let mut current: Vec<&str> = Vec::new();
        for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
            current.push(word);
            let width = widths.text_width(&current.join(" "), options.font_size);
            if width <= options.width_at(offset) || current.len() == 1 {
                continue;
            }

            current.pop();
            lines.push(WrappedLine::Text(current.join(" ")));
            current.clear();
            current.push(word);
            offset += options.line_height;
        }
        if !current.is_empty() {
            lines.push(WrappedLine::Text(current.join(" ")));
        }

        offset += options.line_height * 1.5;
    }

    lines
}
