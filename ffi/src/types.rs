use std::ffi::CStr;
use std::os::raw::c_char;

/// Generation options passed by value or pointer from C.
///
/// `layout` may be null for the default sheet.
#[repr(C)]
pub struct FfiLabelOptions {
    pub layout: *const c_char,
    pub font_size: f32,
    pub show_borders: bool,
    pub include_checkbox: bool,
    pub auto_font_size: bool,
}

impl Default for FfiLabelOptions {
    fn default() -> Self {
        FfiLabelOptions {
            layout: std::ptr::null(),
            font_size: 12.0,
            show_borders: false,
            include_checkbox: false,
            auto_font_size: false,
        }
    }
}

impl FfiLabelOptions {
    /// # Safety
    ///
    /// `layout` must be null or point to a NUL-terminated string.
    pub unsafe fn to_sheet(&self) -> Result<label_sheet::LabelSheet, String> {
        let mut builder = label_sheet::LabelSheet::builder()
            .font_size(self.font_size)
            .show_borders(self.show_borders)
            .include_checkbox(self.include_checkbox)
            .auto_font_size(self.auto_font_size);

        if !self.layout.is_null() {
            let name = CStr::from_ptr(self.layout)
                .to_str()
                .map_err(|e| format!("Invalid UTF-8 in layout name: {}", e))?;
            builder = builder.layout(name);
        }

        Ok(builder.build())
    }
}

#[repr(C)]
pub struct FfiLabelLayout {
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    pub cols: u32,
    pub rows: u32,
    pub margin_left_mm: f32,
    pub margin_top_mm: f32,
    pub spacing_x_mm: f32,
    pub spacing_y_mm: f32,
}

impl From<&label_sheet::LabelLayout> for FfiLabelLayout {
    fn from(layout: &label_sheet::LabelLayout) -> Self {
        FfiLabelLayout {
            label_width_mm: layout.label_width_mm,
            label_height_mm: layout.label_height_mm,
            cols: layout.cols,
            rows: layout.rows,
            margin_left_mm: layout.margin_left_mm,
            margin_top_mm: layout.margin_top_mm,
            spacing_x_mm: layout.spacing_x_mm,
            spacing_y_mm: layout.spacing_y_mm,
        }
    }
}
