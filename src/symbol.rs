//! Symbol types and the decoded `Symbol` record (spec §3).
//!
//! `SymbolType` mirrors the discriminant-per-variant style of the
//! teacher's `JpegMarkerCode` (`jpeg_marker_code.rs`), and the
//! `NONE`/`PARTIAL`/concrete-type/`name()` shape is grounded directly on
//! zbar's `zebra_symbol_type_t` and `zebra_get_symbol_name`
//! (`zebra/decoder.c`).

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The result of decoding: nothing, a partial/locked-in-progress parse, or
/// a concrete symbology. Ordering matters — `decoder/mod.rs` treats any
/// value greater than `Partial` as "stronger than partial" when picking a
/// winner among competing symbologies (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(i8)]
pub enum SymbolType {
    /// No symbol recognized at this width.
    None = 0,
    /// A decoder has committed to a partial parse; the shared lock is held.
    Partial = 1,
    Ean8 = 2,
    UpcE = 3,
    UpcA = 4,
    Ean13 = 5,
    Code128 = 6,
    QrCode = 7,
}

impl SymbolType {
    /// Human readable symbology name, grounded on `zebra_get_symbol_name`.
    pub const fn name(self) -> &'static str {
        match self {
            SymbolType::None => "NONE",
            SymbolType::Partial => "PARTIAL",
            SymbolType::Ean8 => "EAN-8",
            SymbolType::UpcE => "UPC-E",
            SymbolType::UpcA => "UPC-A",
            SymbolType::Ean13 => "EAN-13",
            SymbolType::Code128 => "CODE-128",
            SymbolType::QrCode => "QR-Code",
        }
    }

    /// Whether this type is a concrete decode result (stronger than a
    /// still-in-progress partial match).
    pub const fn is_decoded(self) -> bool {
        matches!(self, |SymbolType::Ean8| SymbolType::UpcE
            | SymbolType::UpcA
            | SymbolType::Ean13
            | SymbolType::Code128
            | SymbolType::QrCode)
    }

    /// Whether this type participates in the per-line quality filter of
    /// spec §4.3 ("linear symbols", i.e. not QR).
    pub const fn is_linear(self) -> bool {
        self.is_decoded() && !matches!(self, SymbolType::QrCode)
    }
}

/// 2-/5-digit EAN/UPC add-on, recognized alongside the base symbol
/// (spec §3 "optional ADDON2/5 flags"; grounded on `ZEBRA_ADDON2`/
/// `ZEBRA_ADDON5` in `zebra/decoder.c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddonFlag {
    #[default]
    None,
    Addon2,
    Addon5,
}

impl AddonFlag {
    pub const fn name(self) -> &'static str {
        match self {
            AddonFlag::None => "",
            AddonFlag::Addon2 => "+2",
            AddonFlag::Addon5 => "+5",
        }
    }
}

/// A single point recorded along a symbol's scan path, in image
/// coordinates (spec §3 "sequence of polygon points").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A confirmed (or cached) symbol detection.
///
/// Ownership: at any moment a `Symbol` lives in exactly one of an image's
/// symbol list, the image scanner's recycle pool, or the cross-image
/// cache (spec §3 invariant). The recycle pool and cache are modeled as
/// plain `Vec`/`Option<Box<_>>` storage in `image_scanner.rs` rather than
/// an intrusive free list with manual refcounting, since Rust's ownership
/// model already enforces the single-owner invariant; callers who need a
/// symbol to outlive the next `scan_image` call simply `clone()` it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub symbol_type: SymbolType,
    pub addon: AddonFlag,
    /// Count of independent confirmations within a single image; starts
    /// at 1 on creation.
    pub quality: u32,
    /// Decoded UTF-8 payload.
    pub data: String,
    /// Polygon points in image coordinates, populated only when the
    /// `POSITION` config is enabled.
    pub points: Vec<Point>,
    /// Monotonic milliseconds at first confirmation.
    pub time_ms: i64,
    /// Cross-image cache consistency counter; `< 0` means not yet
    /// confirmed, `>= 0` means surfaced (spec §4.3).
    pub cache_count: i32,
}

impl Symbol {
    pub fn new(symbol_type: SymbolType, data: String, time_ms: i64) -> Self {
        Symbol {
            symbol_type,
            addon: AddonFlag::None,
            quality: 1,
            data,
            points: Vec::new(),
            time_ms,
            cache_count: 0,
        }
    }

    pub fn matches(&self, symbol_type: SymbolType, data: &str) -> bool {
        self.symbol_type == symbol_type && self.data == data
    }
}
