/*!
# barscan-rs

`barscan-rs` reads one-dimensional bar codes (UPC-A, UPC-E, EAN-8, EAN-13,
Code 128) and extracts UTF-8 text from already-located QR codes, given a
grayscale raster image or a list of decoded QR data records.

## Pipeline

- [`scanner`] — the intensity scanner (component B): luminance samples in,
  sub-pixel bar/space edge events out.
- [`decoder`] — the 1-D symbology decoders (component A): a shared
  element-width ring feeding independent EAN/UPC and Code 128 state
  machines.
- [`image_scanner`] — the image scanner (component C): drives the two
  above across a 2-D image along configurable density lines, dedupes
  within an image, and (optionally) cross-checks against a short
  recent-image cache.
- [`qr`] — the QR text extractor (component D): turns already-decoded QR
  data records into UTF-8 strings, handling ECI, Shift-JIS kanji, FNC1
  escaping, and structured-append reassembly.
- [`format`] — the format negotiator (component E), summarised only: picks
  a mutually supported grayscale pixel format.

## Scope

This crate does not locate bar codes or QR finder patterns, perform
Reed-Solomon error correction, or convert between color pixel formats; it
consumes a grayscale image directly and a pre-decoded QR record list
directly. See `SPEC_FULL.md` in the repository for the full requirements
this crate implements.
*/

pub mod constants;
pub mod decoder;
pub mod error;
pub mod format;
pub mod image_scanner;
pub mod qr;
pub mod scanner;
pub mod symbol;

pub(crate) mod trace;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use decoder::Decoder;
pub use error::BarcodeError;
pub use image_scanner::{ConfigKey, GrayImage, ImageScanner, ScannerConfig, Symbology};
pub use qr::{extract_text, Eci, QrCodeData, QrEntry};
pub use scanner::Scanner;
pub use symbol::{AddonFlag, Point, Symbol, SymbolType};
