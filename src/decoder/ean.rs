//! EAN/UPC family decoder (spec §4.2).
//!
//! `decoder/ean.c` was not retained in the original source pack handed
//! to this rewrite (only `scanner.c`, `decoder.c`, `img_scanner.c`, and
//! the QR text extractor survived distillation), so the element-width
//! quartet tables and parity lookups below are reconstructed directly
//! from the published EAN/UPC/Code symbologies rather than ported
//! line-by-line from a C source. The state-machine shape — private
//! per-symbology accumulator, reset independently of the shared ring —
//! follows spec §3/§4.2 and the sibling `code128.rs`.

use crate::symbol::SymbolType;

/// Left-side "odd" (L-code) / right-side digit run-length patterns, in
/// modules, for digits 0-9. Right-side (R-code) digits share these exact
/// run lengths — only the starting polarity differs, which this decoder
/// does not need to track since it only sees widths.
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

/// Left-side "even" (G-code) patterns for digits 0-9.
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

/// EAN-13 first-digit parity pattern table, 'O' = odd (L), 'E' = even (G).
/// Index 0 ("OOOOOO") is also the optical encoding of a UPC-A barcode.
const EAN13_FIRST_DIGIT_PARITY: [&str; 10] = [
    "OOOOOO", "OOEOEE", "OOEEOE", "OOEEEO", "OEOOEE", "OEEOOE", "OEEEOO", "OEOEOE", "OEOEEO",
    "OEEOEO",
];

/// UPC-E parity pattern table for number system 0, indexed by the
/// implicit check digit it encodes.
const UPCE_PARITY_NS0: [&str; 10] = [
    "EEEOOO", "EEOEOO", "EEOOEO", "EEOOOE", "EOEEOO", "EOOEEO", "EOOOEE", "EOEOEO", "EOEOOE",
    "EOOEOE",
];

const MAX_BUF: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DigitParity {
    Odd,
    Even,
}

/// Which members of the EAN/UPC family `set_config` permits this
/// decoder to report (spec §4.3 "per-symbology enables").
#[derive(Debug, Clone, Copy)]
pub(crate) struct EanEnables {
    pub ean13: bool,
    pub upca: bool,
    pub ean8: bool,
    pub upce: bool,
}

impl Default for EanEnables {
    fn default() -> Self {
        EanEnables { ean13: true, upca: true, ean8: true, upce: true }
    }
}

pub(crate) struct EanDecoder {
    buf: Vec<i64>,
    enables: EanEnables,
}

impl EanDecoder {
    pub fn new() -> Self {
        EanDecoder { buf: Vec::new(), enables: EanEnables::default() }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn new_scan(&mut self) {
        self.buf.clear();
    }

    pub fn set_enabled(&mut self, ty: SymbolType, enabled: bool) {
        match ty {
            SymbolType::Ean13 => self.enables.ean13 = enabled,
            SymbolType::UpcA => self.enables.upca = enabled,
            SymbolType::Ean8 => self.enables.ean8 = enabled,
            SymbolType::UpcE => self.enables.upce = enabled,
            _ => {}
        }
    }

    /// Feed one more element width; returns `None`/`Partial`/a concrete
    /// type plus (via `out_data`) the decoded payload on success.
    pub fn advance(&mut self, width: i64, out_data: &mut String) -> SymbolType {
        self.buf.push(width);
        if self.buf.len() > MAX_BUF {
            self.buf.remove(0);
        }

        for start in 0..self.buf.len() {
            let slice = &self.buf[start..];
            if let Some((ty, text)) = try_decode(slice, &self.enables) {
                out_data.clear();
                out_data.push_str(&text);
                self.buf.clear();
                return ty;
            }
        }

        if self.has_plausible_partial() {
            SymbolType::Partial
        } else {
            SymbolType::None
        }
    }

    /// Whether some suffix of the buffered widths is still a genuine,
    /// not-yet-disproven prefix of a guard/quartet sequence for an
    /// enabled symbology (spec §4.2 "committed to a partial parse").
    /// Merely having buffered three widths is not enough — those widths
    /// must actually quantize as a start guard (and every quartet
    /// completed so far must match a real digit pattern) before the
    /// shared lock is worth holding against sibling decoders.
    fn has_plausible_partial(&self) -> bool {
        for start in 0..self.buf.len() {
            let slice = &self.buf[start..];
            if slice.len() < 3 {
                continue;
            }
            if (self.enables.ean13 || self.enables.upca) && prefix_ok_ean13_upca(slice) {
                return true;
            }
            if self.enables.ean8 && prefix_ok_ean8(slice) {
                return true;
            }
            if self.enables.upce && prefix_ok_upce(slice) {
                return true;
            }
        }
        false
    }
}

fn quantize(raw: i64, module: f64) -> Option<u8> {
    if module <= 0.0 {
        return None;
    }
    let units = (raw as f64) / module;
    let rounded = units.round();
    if !(1.0..=4.4).contains(&units) || (units - rounded).abs() > 0.42 {
        return None;
    }
    Some(rounded.clamp(1.0, 4.0) as u8)
}

fn quantize_guard(raw: &[i64], module: f64) -> bool {
    raw.iter().all(|&w| {
        let units = (w as f64) / module;
        (0.58..=1.42).contains(&units)
    })
}

fn quantize_quartet(raw: &[i64], module: f64) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    for (i, &w) in raw.iter().enumerate() {
        out[i] = quantize(w, module)?;
    }
    if out.iter().map(|&v| v as u32).sum::<u32>() != 7 {
        return None;
    }
    Some(out)
}

fn match_digit(pattern: &[u8; 4]) -> Option<(u8, DigitParity)> {
    for (digit, candidate) in L_CODE.iter().enumerate() {
        if candidate == pattern {
            return Some((digit as u8, DigitParity::Odd));
        }
    }
    for (digit, candidate) in G_CODE.iter().enumerate() {
        if candidate == pattern {
            return Some((digit as u8, DigitParity::Even));
        }
    }
    None
}

/// Right-side digits always use the R-code run-lengths, which are
/// identical to `L_CODE`; only the parity is irrelevant there.
fn match_right_digit(pattern: &[u8; 4]) -> Option<u8> {
    L_CODE.iter().position(|c| c == pattern).map(|d| d as u8)
}

fn checksum_weighted(data: &[u8], first_weight: u8) -> u8 {
    let mut sum: u32 = 0;
    let mut weight = first_weight;
    for &d in data {
        sum += d as u32 * weight as u32;
        weight = if weight == 3 { 1 } else { 3 };
    }
    ((10 - (sum % 10)) % 10) as u8
}

fn checksum_ean13(data12: &[u8]) -> u8 {
    // Standard weighting: position 1 (leftmost) = 1, alternating.
    checksum_weighted(data12, 1)
}

fn checksum_ean8(data7: &[u8]) -> u8 {
    checksum_weighted(data7, 3)
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| (b'0' + d) as char).collect()
}

fn try_decode(widths: &[i64], enables: &EanEnables) -> Option<(SymbolType, String)> {
    if enables.ean13 || enables.upca {
        if let Some((ty, text)) = try_decode_ean13_upca(widths) {
            let permitted = match ty {
                SymbolType::UpcA => enables.upca,
                SymbolType::Ean13 => enables.ean13,
                _ => true,
            };
            if permitted {
                return Some((ty, text));
            }
        }
    }
    if enables.ean8 {
        if let Some(hit) = try_decode_ean8(widths) {
            return Some(hit);
        }
    }
    if enables.upce {
        if let Some(hit) = try_decode_upce(widths) {
            return Some(hit);
        }
    }
    None
}

const EAN13_UPCA_TOTAL: usize = 59;
const EAN8_TOTAL: usize = 43;
const UPCE_TOTAL: usize = 33;

/// Every composition of four run-lengths summing to the fixed 7-module
/// body (the L_CODE/G_CODE tables together enumerate all twenty of them)
/// is *some* digit pattern, so a single validated quartet — or a bare
/// guard match — carries almost no power to discriminate a real EAN/UPC
/// prefix from an unrelated symbology's element run. Require this many
/// complete, independently-matched left-half quartets, on top of the
/// guard, before treating a buffered prefix as genuine progress worth
/// holding the shared lock for (spec §4.2 "committed to a partial
/// parse").
const MIN_PARTIAL_QUARTETS: usize = 2;

/// Whether `slice` within `module`'s tolerance looks like an in-progress
/// (not necessarily complete) guard: every width so far is in the 1x
/// guard band, whether or not all of the guard's widths have arrived
/// yet.
fn guard_prefix_ok(slice: &[i64], module: f64) -> bool {
    slice.iter().all(|&w| (0.58..=1.42).contains(&(w as f64 / module)))
}

/// Validates every complete 4-width quartet in `widths[from..to]`
/// (stopping at whichever is smaller: `to` or the last full quartet
/// boundary) against `matcher`, returning the count of quartets that
/// matched. Returns `None` the moment a complete quartet fails to match
/// a real digit pattern — a genuine disproof, not just "not enough data
/// yet".
fn count_valid_quartets(
    widths: &[i64],
    from: usize,
    to: usize,
    module: f64,
    matcher: impl Fn(&[u8; 4]) -> bool,
) -> Option<usize> {
    let mut pos = from;
    let end = to.min(widths.len());
    let mut count = 0;
    while pos + 4 <= end {
        match quantize_quartet(&widths[pos..pos + 4], module) {
            Some(quartet) if matcher(&quartet) => count += 1,
            _ => return None,
        }
        pos += 4;
    }
    Some(count)
}

/// Is `slice` still a plausible, not-yet-disproven prefix of an
/// EAN-13/UPC-A symbol? Validates the start guard, every completed left
/// quartet, the middle guard, and every completed right quartet against
/// the real digit tables, and additionally demands
/// `MIN_PARTIAL_QUARTETS` confirmed left quartets before conceding
/// plausibility — a guard match alone is too weak a signal (see
/// `MIN_PARTIAL_QUARTETS`).
fn prefix_ok_ean13_upca(widths: &[i64]) -> bool {
    if widths.len() >= EAN13_UPCA_TOTAL {
        return false;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !guard_prefix_ok(&widths[0..3], module) {
        return false;
    }
    let left = match count_valid_quartets(widths, 3, 27, module, |q| match_digit(q).is_some()) {
        Some(n) => n,
        None => return false,
    };
    if left < MIN_PARTIAL_QUARTETS {
        return false;
    }
    if widths.len() > 27 && !guard_prefix_ok(&widths[27..widths.len().min(32)], module) {
        return false;
    }
    if count_valid_quartets(widths, 32, 56, module, |q| match_right_digit(q).is_some()).is_none() {
        return false;
    }
    if widths.len() > 56 && !guard_prefix_ok(&widths[56..widths.len().min(59)], module) {
        return false;
    }
    true
}

/// Same shape as `prefix_ok_ean13_upca`, for EAN-8 (start guard + 4
/// odd-parity left quartets + middle guard + 4 right quartets + end
/// guard).
fn prefix_ok_ean8(widths: &[i64]) -> bool {
    if widths.len() >= EAN8_TOTAL {
        return false;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !guard_prefix_ok(&widths[0..3], module) {
        return false;
    }
    let left = match count_valid_quartets(widths, 3, 19, module, |q| {
        matches!(match_digit(q), Some((_, DigitParity::Odd)))
    }) {
        Some(n) => n,
        None => return false,
    };
    if left < MIN_PARTIAL_QUARTETS {
        return false;
    }
    if widths.len() > 19 && !guard_prefix_ok(&widths[19..widths.len().min(24)], module) {
        return false;
    }
    if count_valid_quartets(widths, 24, 40, module, |q| match_right_digit(q).is_some()).is_none() {
        return false;
    }
    if widths.len() > 40 && !guard_prefix_ok(&widths[40..widths.len().min(43)], module) {
        return false;
    }
    true
}

/// Same shape as the above, for UPC-E (start guard + 6 mixed-parity
/// body quartets + end guard); the parity pattern itself is only
/// checked against the full table once the complete body has arrived
/// (`try_decode_upce`), so here every quartet is accepted as long as it
/// matches *some* digit pattern, gated by the same `MIN_PARTIAL_QUARTETS`
/// floor as the other two.
fn prefix_ok_upce(widths: &[i64]) -> bool {
    if widths.len() >= UPCE_TOTAL {
        return false;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !guard_prefix_ok(&widths[0..3], module) {
        return false;
    }
    let body = match count_valid_quartets(widths, 3, 27, module, |q| match_digit(q).is_some()) {
        Some(n) => n,
        None => return false,
    };
    if body < MIN_PARTIAL_QUARTETS {
        return false;
    }
    if widths.len() > 27 && !guard_prefix_ok(&widths[27..widths.len().min(33)], module) {
        return false;
    }
    true
}

fn try_decode_ean13_upca(widths: &[i64]) -> Option<(SymbolType, String)> {
    // 3 (start) + 24 (left) + 5 (middle) + 24 (right) + 3 (end) = 59.
    if widths.len() != 59 {
        return None;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !quantize_guard(&widths[0..3], module) {
        return None;
    }
    if !quantize_guard(&widths[27..32], module) {
        return None;
    }
    if !quantize_guard(&widths[56..59], module) {
        return None;
    }

    let mut left_digits = [0u8; 6];
    let mut parity = String::with_capacity(6);
    for i in 0..6 {
        let start = 3 + i * 4;
        let quartet = quantize_quartet(&widths[start..start + 4], module)?;
        let (digit, p) = match_digit(&quartet)?;
        left_digits[i] = digit;
        parity.push(if p == DigitParity::Odd { 'O' } else { 'E' });
    }

    let mut right_digits = [0u8; 6];
    for i in 0..6 {
        let start = 32 + i * 4;
        let quartet = quantize_quartet(&widths[start..start + 4], module)?;
        right_digits[i] = match_right_digit(&quartet)?;
    }

    let first_digit = EAN13_FIRST_DIGIT_PARITY
        .iter()
        .position(|&p| p == parity)?;

    let mut data12 = Vec::with_capacity(12);
    data12.push(first_digit as u8);
    data12.extend_from_slice(&left_digits);
    data12.extend_from_slice(&right_digits[..5]);
    let check = checksum_ean13(&data12);
    if check != right_digits[5] {
        return None;
    }

    if first_digit == 0 {
        // UPC-A collapse: drop the implicit leading zero.
        let mut upc = Vec::with_capacity(12);
        upc.extend_from_slice(&left_digits);
        upc.extend_from_slice(&right_digits);
        Some((SymbolType::UpcA, digits_to_string(&upc)))
    } else {
        let mut ean = Vec::with_capacity(13);
        ean.push(first_digit as u8);
        ean.extend_from_slice(&left_digits);
        ean.extend_from_slice(&right_digits);
        Some((SymbolType::Ean13, digits_to_string(&ean)))
    }
}

fn try_decode_ean8(widths: &[i64]) -> Option<(SymbolType, String)> {
    // 3 (start) + 16 (left) + 5 (middle) + 16 (right) + 3 (end) = 43.
    if widths.len() != 43 {
        return None;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !quantize_guard(&widths[0..3], module) {
        return None;
    }
    if !quantize_guard(&widths[19..24], module) {
        return None;
    }
    if !quantize_guard(&widths[40..43], module) {
        return None;
    }

    let mut left_digits = [0u8; 4];
    for i in 0..4 {
        let start = 3 + i * 4;
        let quartet = quantize_quartet(&widths[start..start + 4], module)?;
        let (digit, parity) = match_digit(&quartet)?;
        if parity != DigitParity::Odd {
            return None;
        }
        left_digits[i] = digit;
    }

    let mut right_digits = [0u8; 4];
    for i in 0..4 {
        let start = 24 + i * 4;
        let quartet = quantize_quartet(&widths[start..start + 4], module)?;
        right_digits[i] = match_right_digit(&quartet)?;
    }

    let mut data7 = Vec::with_capacity(7);
    data7.extend_from_slice(&left_digits);
    data7.extend_from_slice(&right_digits[..3]);
    let check = checksum_ean8(&data7);
    if check != right_digits[3] {
        return None;
    }

    let mut all = data7;
    all.push(check);
    Some((SymbolType::Ean8, digits_to_string(&all)))
}

/// Expands a UPC-E 6-digit body (with number system 0) into the 11
/// UPC-A data digits (system digit + manufacturer + product).
fn expand_upce(body: &[u8; 6]) -> [u8; 11] {
    let last = body[5];
    let mut out = [0u8; 11];
    out[0] = 0; // number system
    match last {
        0..=2 => {
            out[1] = body[0];
            out[2] = body[1];
            out[3] = last;
            out[4] = 0;
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = body[2];
            out[9] = body[3];
            out[10] = body[4];
        }
        3 => {
            out[1] = body[0];
            out[2] = body[1];
            out[3] = body[2];
            out[4] = 0;
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = body[3];
            out[10] = body[4];
        }
        4 => {
            out[1] = body[0];
            out[2] = body[1];
            out[3] = body[2];
            out[4] = body[3];
            out[5] = 0;
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = 0;
            out[10] = body[4];
        }
        _ => {
            out[1] = body[0];
            out[2] = body[1];
            out[3] = body[2];
            out[4] = body[3];
            out[5] = body[4];
            out[6] = 0;
            out[7] = 0;
            out[8] = 0;
            out[9] = 0;
            out[10] = last;
        }
    }
    out
}

fn try_decode_upce(widths: &[i64]) -> Option<(SymbolType, String)> {
    // 3 (start) + 24 (body) + 6 (end) = 33.
    if widths.len() != 33 {
        return None;
    }
    let module = (widths[0] + widths[1] + widths[2]) as f64 / 3.0;
    if !quantize_guard(&widths[0..3], module) {
        return None;
    }
    if !quantize_guard(&widths[27..33], module) {
        return None;
    }

    let mut body = [0u8; 6];
    let mut parity = String::with_capacity(6);
    for i in 0..6 {
        let start = 3 + i * 4;
        let quartet = quantize_quartet(&widths[start..start + 4], module)?;
        let (digit, p) = match_digit(&quartet)?;
        body[i] = digit;
        parity.push(if p == DigitParity::Odd { 'O' } else { 'E' });
    }

    let check = UPCE_PARITY_NS0.iter().position(|&p| p == parity)? as u8;
    let expanded = expand_upce(&body);
    let verify = checksum_ean13(&expanded);
    if verify != check {
        return None;
    }

    let mut text = String::with_capacity(8);
    text.push('0');
    text.push_str(&digits_to_string(&body));
    text.push((b'0' + check) as char);
    Some((SymbolType::UpcE, text))
}
