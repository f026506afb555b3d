//! Fixed design constants shared across the scanner, decoders, and image
//! scanner. Grounded on zebra's `scanner.c` (ZEBRA_FIXED, initial
//! thresholds) and `img_scanner.c` (cache timing constants).

/// Fractional bits of the fixed-point position representation (spec §3).
/// Units are 1/32 of a pixel with the design default of `F = 5`.
pub const FIXED_POINT_BITS: u32 = 5;
pub const FIXED_POINT_ONE: i64 = 1 << FIXED_POINT_BITS;

/// Minimum adaptive slope threshold the intensity scanner will decay to.
pub const MIN_EDGE_THRESHOLD: i32 = 8;

/// Denominator applied when decaying the adaptive threshold back toward
/// `MIN_EDGE_THRESHOLD` between committed edges (spec §4.1).
pub const THRESHOLD_DECAY_DENOMINATOR: i64 = 4;

/// Width of the shared element-width ring buffer consumed by the 1-D
/// symbology decoders (spec §3, §4.2, §9).
pub const RING_SIZE: usize = 8;
pub const RING_MASK: usize = RING_SIZE - 1;

/// Module counts for the EAN/UPC family (spec §4.2).
pub const EAN_CHAR_MODULES: u32 = 7;
pub const EAN_GUARD_MODULES: u32 = 3;

/// Module count per Code 128 character (spec §4.2).
pub const CODE128_CHAR_MODULES: u32 = 11;
/// Code 128 checksum modulus.
pub const CODE128_MODULUS: u32 = 103;

/// Cross-image cache timing, fixed design defaults (spec §4.3).
pub const CACHE_CONSISTENCY: i32 = 3;
pub const CACHE_PROXIMITY_MS: i64 = 1000;
pub const CACHE_HYSTERESIS_MS: i64 = 2000;
pub const CACHE_TIMEOUT_MS: i64 = CACHE_HYSTERESIS_MS * 2;

/// ASCII group separator emitted for a bare `%` escape in FNC1-flagged
/// QR alphanumeric data, and for an FNC1 marker in Code 128 (spec §4.2,
/// §4.4, GLOSSARY).
pub const GROUP_SEPARATOR: u8 = 0x1D;
