//! ECI (Extended Channel Interpretation) designator handling (spec §4.4).
//!
//! Mirrors `qr_eci_encoding` (`qrcode/src/qrcode.h`) and the `QR_MODE_ECI`
//! dispatch inside `qr_code_data_list_extract_text` (`qrdectxt.c`), with
//! `encoding_rs` standing in for `iconv`. ISO-8859-1 is decoded with a
//! direct byte-to-codepoint mapping rather than through `encoding_rs`,
//! since `encoding_rs` only exposes the WHATWG windows-1252 superset for
//! that label, which would remap the very C1 control bytes (0x80-0x9F)
//! the move-to-front heuristic in `extract.rs` keys off.

use crate::error::BarcodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eci {
    /// Like CP437, reset at each structured-append member boundary.
    Gli0,
    /// Like ISO-8859-1, reset at each structured-append member boundary.
    Gli1,
    Cp437,
    /// `n` is the ISO/IEC 8859 part number (1..=16, excluding 12).
    Iso8859(u8),
    Sjis,
}

impl Eci {
    /// Maps a raw ECI designator value to a recognized encoding, or
    /// `None` if it is reserved/unassigned (silently skipped, matching
    /// the original's `continue` for an unrecognized `cur_eci`).
    pub fn from_designator(value: u32) -> Option<Eci> {
        match value {
            0 => Some(Eci::Gli0),
            1 => Some(Eci::Gli1),
            2 => Some(Eci::Cp437),
            14 => None,
            3..=18 => Some(Eci::Iso8859((value.max(3) - 2) as u8)),
            20 => Some(Eci::Sjis),
            _ => None,
        }
    }

    /// Whether this designator resets at the next structured-append
    /// member boundary (spec §4.4, GLI0/GLI1 semantics).
    pub fn resets_at_boundary(self) -> bool {
        matches!(self, Eci::Gli0 | Eci::Gli1)
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String, BarcodeError> {
        match self {
            Eci::Gli1 | Eci::Iso8859(1) => Ok(decode_latin1(bytes)),
            Eci::Gli0 | Eci::Cp437 => Err(BarcodeError::TranscodeUnsupportedEci),
            Eci::Iso8859(n) => decode_iso8859(n, bytes),
            Eci::Sjis => decode_sjis(bytes),
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_iso8859(n: u8, bytes: &[u8]) -> Result<String, BarcodeError> {
    let encoding = match n {
        2 => encoding_rs::ISO_8859_2,
        3 => encoding_rs::ISO_8859_3,
        4 => encoding_rs::ISO_8859_4,
        5 => encoding_rs::ISO_8859_5,
        6 => encoding_rs::ISO_8859_6,
        7 => encoding_rs::ISO_8859_7,
        8 => encoding_rs::ISO_8859_8,
        10 => encoding_rs::ISO_8859_10,
        13 => encoding_rs::ISO_8859_13,
        14 => encoding_rs::ISO_8859_14,
        15 => encoding_rs::ISO_8859_15,
        16 => encoding_rs::ISO_8859_16,
        // ISO-8859-9 (Turkish) and -11 (Thai) have no dedicated WHATWG
        // label and so no `encoding_rs` constant.
        _ => return Err(BarcodeError::TranscodeUnsupportedEci),
    };
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(BarcodeError::TranscodeExhausted);
    }
    Ok(text.into_owned())
}

fn decode_sjis(bytes: &[u8]) -> Result<String, BarcodeError> {
    let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
    if had_errors {
        return Err(BarcodeError::TranscodeInvalidKanji);
    }
    Ok(text.into_owned())
}
