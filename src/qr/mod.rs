//! QR text extraction pipeline (spec §4.4).
//!
//! Grounded on `qrcode/src/qrcode.h` and `qrcode/src/qrdectxt.c`. This
//! crate does not attempt QR module/finder-pattern localization or
//! Reed-Solomon decoding (out of scope, spec Non-goals) — `QrCodeData`
//! is the boundary: callers supply already bit-decoded entries (e.g.
//! from an upstream QR reader) and this module turns them into text.

mod eci;
mod extract;
mod record;

pub use eci::Eci;
pub use extract::extract_text;
pub use record::{QrCodeData, QrEntry};
