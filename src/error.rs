use thiserror::Error;

/// Errors surfaced by this crate's Rust API.
///
/// Variants are grouped and numbered in bands, matching the three error
/// kinds of the design: invalid input/config (1..=49), transcoding
/// failures during QR text extraction (50..=69). `RecoverableNoise`
/// conditions (bad checksums, guard mismatches, out-of-spec module sums)
/// never reach this enum — they are absorbed inside the 1-D decoders and
/// simply fail to produce a symbol, per the decoder design.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeError {
    #[error("unsupported image pixel format")]
    UnsupportedFormat = 1,
    #[error("image dimensions do not match the supplied buffer length")]
    InvalidImageDimensions = 2,
    #[error("invalid configuration key")]
    InvalidConfigKey = 3,
    #[error("invalid configuration value")]
    InvalidConfigValue = 4,
    #[error("invalid symbology selector")]
    InvalidSymbology = 5,

    #[error("malformed QR data record")]
    InvalidQrRecord = 20,
    #[error("QR structured-append index out of range")]
    InvalidStructuredAppendIndex = 21,
    #[error("unrecognized ECI designator")]
    UnrecognizedEci = 22,

    #[error("QR byte-mode entry failed every candidate text encoding")]
    TranscodeExhausted = 50,
    #[error("declared ECI designates an encoding this build cannot transcode")]
    TranscodeUnsupportedEci = 51,
    #[error("Shift-JIS kanji entry contained an invalid double-byte sequence")]
    TranscodeInvalidKanji = 52,
}

impl BarcodeError {
    /// The boundary status code used by the FFI/ABI surface (spec §6):
    /// `0` success is represented by `Ok` at call sites, never by this type.
    pub const fn boundary_code(self) -> i32 {
        match self {
            BarcodeError::UnsupportedFormat => -1,
            _ => 1,
        }
    }
}
