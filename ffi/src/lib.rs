mod types;

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

pub use types::{FfiLabelLayout, FfiLabelOptions};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(err: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(err).ok();
    });
}

/// A rendered label sheet.
pub struct LabelPdfHandle {
    bytes: Vec<u8>,
}

/// Reads the font, text and options of a generation request.
///
/// # Safety
///
/// Pointers must be null or valid for the given length / NUL-terminated.
unsafe fn read_request<'a>(
    font: *const u8,
    font_len: usize,
    text: *const c_char,
    options: *const FfiLabelOptions,
) -> Result<(&'a [u8], String, label_sheet::LabelSheet), String> {
    let font: &[u8] = if font.is_null() {
        if font_len != 0 {
            return Err("Font pointer is null".to_string());
        }
        &[]
    } else {
        std::slice::from_raw_parts(font, font_len)
    };

    if text.is_null() {
        return Err("Text pointer is null".to_string());
    }
    let text = CStr::from_ptr(text)
        .to_str()
        .map_err(|e| format!("Invalid UTF-8 in text: {}", e))?
        .to_string();

    let sheet = if options.is_null() {
        label_sheet::LabelSheet::default()
    } else {
        (*options).to_sheet()?
    };

    Ok((font, text, sheet))
}

#[no_mangle]
pub extern "C" fn label_sheet_default_options() -> FfiLabelOptions {
    FfiLabelOptions::default()
}

/// Renders `text` onto every label of a sheet. `options` may be null.
#[no_mangle]
pub extern "C" fn label_sheet_generate(
    font: *const u8,
    font_len: usize,
    text: *const c_char,
    options: *const FfiLabelOptions,
) -> *mut LabelPdfHandle {
    let (font, text, sheet) = match unsafe { read_request(font, font_len, text, options) } {
        Ok(request) => request,
        Err(e) => {
            set_last_error(e);
            return ptr::null_mut();
        }
    };

    match sheet.generate(font, &text) {
        Ok(bytes) => Box::into_raw(Box::new(LabelPdfHandle { bytes })),
        Err(e) => {
            set_last_error(format!("Failed to generate labels: {}", e));
            ptr::null_mut()
        }
    }
}

/// Renders and writes the sheet to `path`. Returns 0 on success, -1 on error.
#[no_mangle]
pub extern "C" fn label_sheet_save(
    font: *const u8,
    font_len: usize,
    text: *const c_char,
    options: *const FfiLabelOptions,
    path: *const c_char,
) -> i32 {
    if path.is_null() {
        set_last_error("Path pointer is null".to_string());
        return -1;
    }

    let path_str = unsafe {
        match CStr::from_ptr(path).to_str() {
            Ok(s) => s,
            Err(e) => {
                set_last_error(format!("Invalid UTF-8 in path: {}", e));
                return -1;
            }
        }
    };

    let (font, text, sheet) = match unsafe { read_request(font, font_len, text, options) } {
        Ok(request) => request,
        Err(e) => {
            set_last_error(e);
            return -1;
        }
    };

    match sheet.save(font, &text, path_str) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(format!("Failed to save labels: {}", e));
            -1
        }
    }
}

#[no_mangle]
pub extern "C" fn label_pdf_len(handle: *const LabelPdfHandle) -> usize {
    if handle.is_null() {
        set_last_error("Handle is null".to_string());
        return 0;
    }

    let handle = unsafe { &*handle };
    handle.bytes.len()
}

/// Borrowed pointer to the PDF bytes, valid until `label_pdf_free`.
#[no_mangle]
pub extern "C" fn label_pdf_data(handle: *const LabelPdfHandle) -> *const u8 {
    if handle.is_null() {
        set_last_error("Handle is null".to_string());
        return ptr::null();
    }

    let handle = unsafe { &*handle };
    handle.bytes.as_ptr()
}

#[no_mangle]
pub extern "C" fn label_pdf_free(handle: *mut LabelPdfHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

#[no_mangle]
pub extern "C" fn label_layout_count() -> usize {
    label_sheet::layouts().len()
}

#[no_mangle]
pub extern "C" fn label_layout_get(index: usize, out: *mut FfiLabelLayout) -> i32 {
    if out.is_null() {
        set_last_error("Output pointer is null".to_string());
        return -1;
    }

    match label_sheet::layouts().get(index) {
        Some(layout) => {
            unsafe {
                *out = FfiLabelLayout::from(layout);
            }
            0
        }
        None => {
            set_last_error(format!("Layout index {} out of bounds", index));
            -1
        }
    }
}

/// Name of the layout at `index`; free with `label_string_free`.
#[no_mangle]
pub extern "C" fn label_layout_name(index: usize) -> *mut c_char {
    let Some(layout) = label_sheet::layouts().get(index) else {
        set_last_error(format!("Layout index {} out of bounds", index));
        return ptr::null_mut();
    };

    match CString::new(layout.name) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            set_last_error(format!("Failed to convert layout name to C string: {}", e));
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn label_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

#[no_mangle]
pub extern "C" fn label_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}
