//! Low-level QR decode records (spec §4.4).
//!
//! Mirrors `qr_code_data`/`qr_code_data_entry`/`qr_mode`
//! (`qrcode/src/qrcode.h`). The C `union` payload becomes a Rust enum
//! carrying its own data, and structured-append bookkeeping lives
//! directly on `QrCodeData` as in the original.

/// The encoding mode of one parsed data block (`qr_mode`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrEntry {
    Numeric(Vec<u8>),
    Alphanumeric(Vec<u8>),
    /// Structured-append header; carried as its own entry so multi-part
    /// symbols can embed the header alongside data blocks.
    StructuredAppend { sa_size: u8, sa_index: u8, sa_parity: u8 },
    Byte(Vec<u8>),
    Fnc1First,
    Eci(u32),
    Kanji(Vec<u8>),
    Fnc1Second,
}

impl QrEntry {
    /// Whether this mode carries a raw data buffer to be transcoded
    /// (`QR_MODE_HAS_DATA`).
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            QrEntry::Numeric(b) | QrEntry::Alphanumeric(b) | QrEntry::Byte(b) | QrEntry::Kanji(b) => Some(b),
            _ => None,
        }
    }
}

/// One decoded QR symbol's entries plus structured-append metadata
/// (`qr_code_data`).
#[derive(Debug, Clone, Default)]
pub struct QrCodeData {
    pub entries: Vec<QrEntry>,
    pub version: u8,
    pub ecc_level: u8,
    /// Size of the structured-append group, or 0 if this symbol is
    /// standalone.
    pub sa_size: u8,
    pub sa_index: u8,
    pub sa_parity: u8,
    pub self_parity: u8,
}

impl QrCodeData {
    pub fn new() -> Self {
        QrCodeData::default()
    }

    pub fn is_structured_append(&self) -> bool {
        self.sa_size != 0
    }
}
