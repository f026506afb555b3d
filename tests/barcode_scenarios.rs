//! 1-D scan pipeline integration tests, seeded from concrete end-to-end
//! scenarios. Barcode patterns are rendered directly from the published
//! EAN-13 symbology tables as literal fixtures (the library itself has
//! no encoder — generating bar codes is out of scope) and driven
//! through the public `ImageScanner` API, one file per subsystem built
//! from literal fixtures.

use barscan_rs::{ConfigKey, GrayImage, ImageScanner, Symbology, SymbolType};

const L_CODE: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

const G_CODE: [[u8; 4]; 10] = [
    [1, 1, 2, 3],
    [1, 2, 2, 2],
    [2, 2, 1, 2],
    [1, 1, 4, 1],
    [2, 3, 1, 1],
    [1, 3, 2, 1],
    [4, 1, 1, 1],
    [2, 1, 3, 1],
    [3, 1, 2, 1],
    [2, 1, 1, 3],
];

const EAN13_FIRST_DIGIT_PARITY: [&str; 10] = [
    "OOOOOO", "OOEOEE", "OOEEOE", "OOEEEO", "OEOOEE", "OEEOOE", "OEEEOO", "OEOEOE", "OEOEEO",
    "OEEOEO",
];

/// Computes the EAN-13 check digit for the first 12 digits (standard
/// alternating 1/3 weighting).
fn ean13_check_digit(first12: &[u8; 12]) -> u8 {
    let mut sum: u32 = 0;
    let mut weight = 1u32;
    for &d in first12 {
        sum += d as u32 * weight;
        weight = if weight == 3 { 1 } else { 3 };
    }
    ((10 - (sum % 10)) % 10) as u8
}

/// Renders the 95-module EAN-13 bar pattern for `digits` (13 entries,
/// the 13th being the check digit) as a sequence of module counts.
fn ean13_modules(digits: &[u8; 13]) -> Vec<u8> {
    let parity = EAN13_FIRST_DIGIT_PARITY[digits[0] as usize];
    let mut modules = vec![1u8, 1, 1];
    for (i, p) in parity.chars().enumerate() {
        let digit = digits[1 + i] as usize;
        let quartet = if p == 'O' { L_CODE[digit] } else { G_CODE[digit] };
        modules.extend_from_slice(&quartet);
    }
    modules.extend_from_slice(&[1, 1, 1, 1, 1]);
    for &d in &digits[7..13] {
        modules.extend_from_slice(&L_CODE[d as usize]);
    }
    modules.extend_from_slice(&[1, 1, 1]);
    modules
}

/// Renders a solid-quiet-zone grayscale image containing one EAN-13
/// barcode, repeated over every row.
fn render_ean13_image(digits: &[u8; 13], module_px: u32, quiet: u32, height: u32) -> (u32, u32, Vec<u8>) {
    let modules = ean13_modules(digits);
    let body_px: u32 = modules.iter().map(|&m| m as u32 * module_px).sum();
    let width = quiet * 2 + body_px;

    let mut row = vec![235u8; width as usize];
    let mut x = quiet;
    let mut dark = true;
    for &m in &modules {
        let run = m as u32 * module_px;
        let level = if dark { 20u8 } else { 235u8 };
        for px in 0..run {
            row[(x + px) as usize] = level;
        }
        x += run;
        dark = !dark;
    }

    let mut data = Vec::with_capacity((width * height) as usize);
    for _ in 0..height {
        data.extend_from_slice(&row);
    }
    (width, height, data)
}

fn digits13(first12: [u8; 12]) -> [u8; 13] {
    let check = ean13_check_digit(&first12);
    let mut out = [0u8; 13];
    out[..12].copy_from_slice(&first12);
    out[12] = check;
    out
}

/// Code 128 element patterns (code set B, values 0..102) needed to
/// render the scenario-3 "Hello" fixture; mirrors `decoder/code128.rs`'s
/// own table, kept independent here since integration tests exercise
/// the public API only.
const CODE128_PATTERNS: [[u8; 6]; 103] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1],
];
const CODE128_START_B: [u8; 6] = [2, 1, 1, 2, 1, 4];
const CODE128_STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

/// Renders a single-row Code 128 (code set B) grayscale image encoding
/// `text`, at `module_px` pixels per module, with `quiet`-pixel margins.
fn render_code128_image(text: &str, module_px: u32, quiet: u32, height: u32) -> (u32, u32, Vec<u8>) {
    let values: Vec<u8> = text.bytes().map(|b| b - 32).collect();
    let start_value = 104u32; // Start B
    let mut weighted = start_value;
    for (i, &v) in values.iter().enumerate() {
        weighted += (i as u32 + 1) * v as u32;
    }
    let check = (weighted % 103) as u8;

    let mut modules: Vec<u8> = Vec::new();
    modules.extend_from_slice(&CODE128_START_B);
    for &v in &values {
        modules.extend_from_slice(&CODE128_PATTERNS[v as usize]);
    }
    modules.extend_from_slice(&CODE128_PATTERNS[check as usize]);
    modules.extend_from_slice(&CODE128_STOP);

    let body_px: u32 = modules.iter().map(|&m| m as u32 * module_px).sum();
    let width = quiet * 2 + body_px;

    let mut row = vec![235u8; width as usize];
    let mut x = quiet;
    let mut dark = true;
    for &m in &modules {
        let run = m as u32 * module_px;
        let level = if dark { 20u8 } else { 235u8 };
        for px in 0..run {
            row[(x + px) as usize] = level;
        }
        x += run;
        dark = !dark;
    }

    let mut data = Vec::with_capacity((width * height) as usize);
    for _ in 0..height {
        data.extend_from_slice(&row);
    }
    (width, height, data)
}

/// Scenario 3: Code 128-B "Hello" at a 2-module-per-pixel width ->
/// returns one CODE128 symbol with data "Hello".
#[test]
fn scenario_code128_hello() {
    let (w, h, data) = render_code128_image("Hello", 2, 40, 12);
    let img = GrayImage::new(w, h, &data).unwrap();
    let mut iscn = ImageScanner::new();
    iscn.set_config(Symbology::All, ConfigKey::XDensity, 0).unwrap();
    iscn.set_config(Symbology::All, ConfigKey::YDensity, 1).unwrap();
    let syms = iscn.scan_image(&img).unwrap();

    assert!(syms.iter().any(|s| s.symbol_type == SymbolType::Code128 && s.data == "Hello"));
}

/// Scenario 1: EAN-13 "9780201379624", quiet zones, returns exactly one
/// symbol of type EAN13 with quality >= 3.
#[test]
fn scenario_ean13_isbn() {
    let digits = [9u8, 7, 8, 0, 2, 0, 1, 3, 7, 9, 6, 2, 4];
    assert_eq!(ean13_check_digit(&digits[..12].try_into().unwrap()), 4);

    let (w, h, data) = render_ean13_image(&digits, 8, 40, 12);
    let img = GrayImage::new(w, h, &data).unwrap();
    let mut iscn = ImageScanner::new();
    let syms = iscn.scan_image(&img).unwrap();

    assert_eq!(syms.len(), 1);
    let sym = &syms[0];
    assert_eq!(sym.symbol_type, SymbolType::Ean13);
    assert_eq!(sym.data, "9780201379624");
    assert!(sym.quality >= 3);
}

/// Scenario 4: a uniform grey image yields no symbols and the data
/// handler is never invoked.
#[test]
fn scenario_uniform_grey_yields_nothing() {
    let width = 200u32;
    let height = 40u32;
    let data = vec![128u8; (width * height) as usize];
    let img = GrayImage::new(width, height, &data).unwrap();

    let mut iscn = ImageScanner::new();
    let fired = std::rc::Rc::new(std::cell::Cell::new(false));
    let fired2 = fired.clone();
    iscn.set_data_handler(move |_| fired2.set(true));

    let syms = iscn.scan_image(&img).unwrap();
    assert!(syms.is_empty());
    assert!(!fired.get());
}

/// Scenario 5: two different EAN-13 codes stacked vertically with
/// Y_DENSITY=1 surface as two symbols, both confirmed (quality >= 3),
/// in top-to-bottom order.
#[test]
fn scenario_two_stacked_ean13_top_to_bottom() {
    let top_digits = digits13([9, 7, 8, 0, 2, 0, 1, 3, 7, 9, 6, 2]);
    let bottom_digits = digits13([4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]);

    let module_px = 8u32;
    let quiet = 40u32;
    let band_height = 12u32;

    let (w_top, _, data_top) = render_ean13_image(&top_digits, module_px, quiet, band_height);
    let (w_bottom, _, data_bottom) = render_ean13_image(&bottom_digits, module_px, quiet, band_height);
    let width = w_top.max(w_bottom);

    let mut data = Vec::with_capacity((width * band_height * 2) as usize);
    for chunk_start in (0..data_top.len()).step_by(w_top as usize) {
        let mut row = data_top[chunk_start..chunk_start + w_top as usize].to_vec();
        row.resize(width as usize, 235);
        data.extend_from_slice(&row);
    }
    for chunk_start in (0..data_bottom.len()).step_by(w_bottom as usize) {
        let mut row = data_bottom[chunk_start..chunk_start + w_bottom as usize].to_vec();
        row.resize(width as usize, 235);
        data.extend_from_slice(&row);
    }

    let height = band_height * 2;
    let img = GrayImage::new(width, height, &data).unwrap();
    let mut iscn = ImageScanner::new();
    iscn.set_config(Symbology::All, ConfigKey::YDensity, 1).unwrap();
    iscn.set_config(Symbology::All, ConfigKey::XDensity, 0).unwrap();
    let syms = iscn.scan_image(&img).unwrap();

    assert_eq!(syms.len(), 2);
    assert!(syms.iter().all(|s| s.symbol_type == SymbolType::Ean13 && s.quality >= 3));
    assert_eq!(syms[0].data, "9780201379624");
    assert_eq!(syms[1].data, "4006381333931");
}

/// Scenario 6: the same EAN-13 presented in four successive frames,
/// 300ms apart, with the cache enabled. Frames 1-3 surface the symbol
/// with `cache_count < 0`; frame 4 surfaces it with `cache_count >= 0`
/// (spec §4.3 cache consistency, §8 "Cache consistency").
#[test]
fn scenario_cache_confirms_on_fourth_frame() {
    let digits = digits13([9, 7, 8, 0, 2, 0, 1, 3, 7, 9, 6, 2]);
    let (w, h, data) = render_ean13_image(&digits, 8, 40, 12);
    let img = GrayImage::new(w, h, &data).unwrap();

    let mut iscn = ImageScanner::new();
    iscn.enable_cache(true);

    let mut last_count = i32::MIN;
    for frame in 0..4 {
        iscn.set_clock_ms(frame * 300);
        let syms = iscn.scan_image(&img).unwrap();
        assert_eq!(syms.len(), 1);
        last_count = syms[0].cache_count;
        if frame < 3 {
            assert!(last_count < 0, "frame {frame} should not yet be confirmed");
        }
    }
    assert!(last_count >= 0, "fourth frame should confirm the symbol");
}
