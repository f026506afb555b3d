//! Pixel format negotiation (spec §4.5).
//!
//! Grounded on `zebra/convert.c`'s `format_prefs` preference list and
//! cost-based conversion table. Color-space conversion itself is out of
//! scope (spec Non-goals) — this module only recognizes the family of
//! fourcc codes that already describe 8-bit grayscale, the only family
//! the scanner consumes directly, and reports a clear error for
//! anything else rather than attempting a conversion.

use crate::error::BarcodeError;

/// A four-character-code pixel format tag, as used throughout the V4L2/
/// zbar ecosystem this design is grounded on.
pub type FourCc = [u8; 4];

pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> FourCc {
    [a, b, c, d]
}

/// Fourcc codes recognized as 8-bit grayscale, in preference order
/// (subset of `format_prefs` relevant to a grayscale-only scanner).
const GRAY_FORMATS: &[FourCc] = &[
    fourcc(b'Y', b'8', b'0', b'0'),
    fourcc(b'G', b'R', b'E', b'Y'),
    fourcc(b'Y', b'8', b' ', b' '),
];

/// Picks the first mutually supported format from `candidates`, in the
/// caller's preference order, falling back to this crate's own
/// preference order when the caller expresses none.
pub fn negotiate(candidates: &[FourCc]) -> Result<FourCc, BarcodeError> {
    for &candidate in candidates {
        if GRAY_FORMATS.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(BarcodeError::UnsupportedFormat)
}

/// Whether `format` is already one this crate's scanner can consume
/// without conversion.
pub fn is_grayscale(format: FourCc) -> bool {
    GRAY_FORMATS.contains(&format)
}
