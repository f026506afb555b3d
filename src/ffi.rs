//! C Foreign Function Interface for barscan-rs.
//!
//! Opaque handles and C-compatible functions for use from C/C++
//! projects, gated behind the `ffi` feature. Shape grounded on this
//! crate's own teacher module (opaque `#[repr(C)]` handle + numeric
//! error codes), with the boundary status codes matching
//! `BarcodeError::boundary_code`.

use std::os::raw::{c_char, c_int, c_uchar};
use std::ptr;

use crate::format::fourcc;
use crate::image_scanner::{GrayImage, ImageScanner, ScannerConfig};

/// Opaque image scanner handle.
#[repr(C)]
pub struct BarcodeImageScanner {
    _private: [u8; 0],
}

/// One decoded symbol, as a flat C struct. `data` is a NUL-terminated
/// UTF-8 string owned by the scanner; valid until the next
/// `barcode_image_scanner_scan` call or `barcode_image_scanner_free`.
#[repr(C)]
pub struct BarcodeSymbol {
    pub symbol_type: c_int,
    pub quality: u32,
    pub data: *mut c_char,
}

struct ScannerState {
    scanner: ImageScanner,
    results: Vec<BarcodeSymbol>,
    owned_strings: Vec<std::ffi::CString>,
}

/// Creates a new image scanner with default configuration.
#[unsafe(no_mangle)]
pub extern "C" fn barcode_image_scanner_new() -> *mut BarcodeImageScanner {
    let state = Box::new(ScannerState {
        scanner: ImageScanner::new(),
        results: Vec::new(),
        owned_strings: Vec::new(),
    });
    Box::into_raw(state) as *mut BarcodeImageScanner
}

/// Frees a scanner handle created by `barcode_image_scanner_new`.
///
/// # Safety
/// `scanner` must be a valid handle from `barcode_image_scanner_new`,
/// not already freed.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barcode_image_scanner_free(scanner: *mut BarcodeImageScanner) {
    if !scanner.is_null() {
        let _ = unsafe { Box::from_raw(scanner as *mut ScannerState) };
    }
}

/// Sets the X/Y scan density (spec §4.3 configs).
///
/// # Safety
/// `scanner` must be a valid handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barcode_image_scanner_set_density(
    scanner: *mut BarcodeImageScanner,
    x_density: c_int,
    y_density: c_int,
) -> c_int {
    if scanner.is_null() {
        return -1;
    }
    let state = unsafe { &mut *(scanner as *mut ScannerState) };
    let config = ScannerConfig {
        x_density,
        y_density,
        ..ScannerConfig::default()
    };
    state.scanner.set_config_all(config);
    0
}

/// Scans an 8-bit grayscale image and returns the number of symbols
/// found, or a negative `BarcodeError::boundary_code` on failure.
/// Results are retrieved with `barcode_image_scanner_get_result`.
///
/// # Safety
/// `scanner` must be valid; `data` must point to `width * height`
/// readable bytes.
#[unsafe(no_mangle)]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub unsafe extern "C" fn barcode_image_scanner_scan(
    scanner: *mut BarcodeImageScanner,
    data: *const c_uchar,
    width: u32,
    height: u32,
) -> c_int {
    if scanner.is_null() || data.is_null() {
        return -1;
    }
    let state = unsafe { &mut *(scanner as *mut ScannerState) };
    let slice = unsafe { std::slice::from_raw_parts(data, (width as usize) * (height as usize)) };

    let img = match GrayImage::new(width, height, slice) {
        Ok(img) => img,
        Err(e) => return e.boundary_code(),
    };

    let syms = match state.scanner.scan_image(&img) {
        Ok(syms) => syms,
        Err(e) => return e.boundary_code(),
    };

    state.owned_strings.clear();
    state.results.clear();
    for sym in &syms {
        let cstr = std::ffi::CString::new(sym.data.clone()).unwrap_or_default();
        state.results.push(BarcodeSymbol {
            symbol_type: i8::from(sym.symbol_type) as c_int,
            quality: sym.quality,
            data: cstr.as_ptr() as *mut c_char,
        });
        state.owned_strings.push(cstr);
    }

    state.results.len() as c_int
}

/// Retrieves the `index`th result from the previous scan call, or a
/// null `data` pointer if out of range.
///
/// # Safety
/// `scanner` must be valid and not freed since the last scan call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barcode_image_scanner_get_result(
    scanner: *mut BarcodeImageScanner,
    index: usize,
) -> BarcodeSymbol {
    if scanner.is_null() {
        return BarcodeSymbol { symbol_type: 0, quality: 0, data: ptr::null_mut() };
    }
    let state = unsafe { &*(scanner as *mut ScannerState) };
    match state.results.get(index) {
        Some(sym) => BarcodeSymbol {
            symbol_type: sym.symbol_type,
            quality: sym.quality,
            data: sym.data,
        },
        None => BarcodeSymbol { symbol_type: 0, quality: 0, data: ptr::null_mut() },
    }
}

/// Negotiates a supported grayscale pixel format from a list of
/// candidate fourcc codes (spec §4.5); returns the chosen fourcc packed
/// into a `u32`, or 0 if none are supported.
///
/// # Safety
/// `candidates` must point to `count` valid 4-byte fourcc codes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn barcode_negotiate_format(candidates: *const u32, count: usize) -> u32 {
    if candidates.is_null() {
        return 0;
    }
    let slice = unsafe { std::slice::from_raw_parts(candidates, count) };
    let codes: Vec<[u8; 4]> = slice.iter().map(|&c| c.to_be_bytes()).collect();
    match crate::format::negotiate(&codes) {
        Ok(code) => u32::from_be_bytes(code),
        Err(_) => 0,
    }
}

/// The `Y800` grayscale fourcc, exposed so callers can build their
/// candidate list without duplicating the constant.
#[unsafe(no_mangle)]
pub extern "C" fn barcode_fourcc_y800() -> u32 {
    u32::from_be_bytes(fourcc(b'Y', b'8', b'0', b'0'))
}
