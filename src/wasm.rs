//! WebAssembly bindings for barscan-rs (spec §5.4), gated behind the
//! `wasm` feature and `cfg(target_arch = "wasm32")`.
//!
//! A thin `#[wasm_bindgen]` wrapper returning `Result<_, JsValue>`,
//! adapted to this crate's two entry points: scanning a grayscale image
//! (component C) and extracting text from already-decoded QR records
//! (component D). QR records are built incrementally through
//! `WasmQrRecordBuilder` rather than passed as a single complex JS
//! object, since this crate carries no `serde`/`serde-wasm-bindgen`
//! dependency for structured JS<->Rust conversion.

use wasm_bindgen::prelude::*;

use crate::image_scanner::{ConfigKey, GrayImage, ImageScanner, Symbology};
use crate::qr::{extract_text, Eci, QrCodeData, QrEntry};
use crate::symbol::{Symbol, SymbolType};

/// One decoded symbol, exposed to JS via getters (spec §3 "Symbol").
#[wasm_bindgen]
pub struct WasmSymbol {
    symbol_type: String,
    data: String,
    quality: u32,
    cache_count: i32,
}

#[wasm_bindgen]
impl WasmSymbol {
    #[wasm_bindgen(getter)]
    pub fn symbol_type(&self) -> String {
        self.symbol_type.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn data(&self) -> String {
        self.data.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> u32 {
        self.quality
    }

    #[wasm_bindgen(getter)]
    pub fn cache_count(&self) -> i32 {
        self.cache_count
    }
}

impl From<&Symbol> for WasmSymbol {
    fn from(sym: &Symbol) -> Self {
        WasmSymbol {
            symbol_type: sym.symbol_type.name().to_string(),
            data: sym.data.clone(),
            quality: sym.quality,
            cache_count: sym.cache_count,
        }
    }
}

/// JS-facing wrapper around [`ImageScanner`] (spec §4.3).
#[wasm_bindgen]
pub struct WasmImageScanner {
    inner: ImageScanner,
}

#[wasm_bindgen]
impl WasmImageScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        WasmImageScanner { inner: ImageScanner::new() }
    }

    /// Sets the horizontal and vertical scan density; 0 disables that
    /// axis (spec §4.3 `X_DENSITY`/`Y_DENSITY`).
    pub fn set_density(&mut self, x_density: i32, y_density: i32) -> Result<(), JsValue> {
        self.inner
            .set_config(Symbology::All, ConfigKey::XDensity, x_density)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner
            .set_config(Symbology::All, ConfigKey::YDensity, y_density)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn enable_cache(&mut self, enable: bool) {
        self.inner.enable_cache(enable);
    }

    /// Scans an 8-bit grayscale `Y800`/`GRAY` image of `width`x`height`
    /// pixels, returning the surfaced symbols.
    pub fn scan(&mut self, data: &[u8], width: u32, height: u32) -> Result<Vec<WasmSymbol>, JsValue> {
        let img = GrayImage::new(width, height, data).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let syms = self
            .inner
            .scan_image(&img)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(syms.iter().map(WasmSymbol::from).collect())
    }
}

impl Default for WasmImageScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Incrementally builds one QR data record (spec §3 "QR data record")
/// for the JS caller, since `wasm-bindgen` cannot marshal the tagged
/// `QrEntry` enum directly.
#[wasm_bindgen]
pub struct WasmQrRecordBuilder {
    record: QrCodeData,
}

#[wasm_bindgen]
impl WasmQrRecordBuilder {
    #[wasm_bindgen(constructor)]
    pub fn new(sa_size: u8, sa_index: u8, sa_parity: u8) -> Self {
        let mut record = QrCodeData::new();
        record.sa_size = sa_size;
        record.sa_index = sa_index;
        record.sa_parity = sa_parity;
        WasmQrRecordBuilder { record }
    }

    pub fn push_numeric(&mut self, bytes: &[u8]) {
        self.record.entries.push(QrEntry::Numeric(bytes.to_vec()));
    }

    pub fn push_alphanumeric(&mut self, bytes: &[u8]) {
        self.record.entries.push(QrEntry::Alphanumeric(bytes.to_vec()));
    }

    pub fn push_byte(&mut self, bytes: &[u8]) {
        self.record.entries.push(QrEntry::Byte(bytes.to_vec()));
    }

    pub fn push_kanji(&mut self, bytes: &[u8]) {
        self.record.entries.push(QrEntry::Kanji(bytes.to_vec()));
    }

    pub fn push_eci(&mut self, designator: u32) {
        self.record.entries.push(QrEntry::Eci(designator));
    }

    pub fn push_fnc1_first(&mut self) {
        self.record.entries.push(QrEntry::Fnc1First);
    }

    pub fn push_fnc1_second(&mut self) {
        self.record.entries.push(QrEntry::Fnc1Second);
    }
}

/// Accumulates QR records built with [`WasmQrRecordBuilder`] and
/// extracts UTF-8 text across them (spec §4.4).
#[wasm_bindgen]
pub struct WasmQrExtractor {
    records: Vec<QrCodeData>,
}

#[wasm_bindgen]
impl WasmQrExtractor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        WasmQrExtractor { records: Vec::new() }
    }

    pub fn add_record(&mut self, builder: WasmQrRecordBuilder) {
        self.records.push(builder.record);
    }

    /// Extracts one string per structured-append group or standalone
    /// record (spec §4.4 "Output").
    pub fn extract_text(&self, allow_partial_sa: bool) -> Vec<JsValue> {
        extract_text(&self.records, allow_partial_sa)
            .into_iter()
            .map(|s| JsValue::from_str(&s))
            .collect()
    }
}

impl Default for WasmQrExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a raw ECI designator to its canonical name, or an empty string
/// if unrecognized (spec §4.4 "ECI"). Exposed mainly for diagnostics.
#[wasm_bindgen]
pub fn eci_name(designator: u32) -> String {
    match Eci::from_designator(designator) {
        Some(Eci::Gli0) => "GLI0".to_string(),
        Some(Eci::Gli1) => "GLI1".to_string(),
        Some(Eci::Cp437) => "CP437".to_string(),
        Some(Eci::Iso8859(n)) => format!("ISO-8859-{n}"),
        Some(Eci::Sjis) => "Shift-JIS".to_string(),
        None => String::new(),
    }
}

/// Human readable symbology name for a [`WasmSymbol::symbol_type`]
/// value that a caller wants to re-derive from a raw type id, matching
/// the library's own `SymbolType::name()`.
#[wasm_bindgen]
pub fn symbol_type_name(type_id: i8) -> String {
    SymbolType::try_from(type_id).map(|t| t.name().to_string()).unwrap_or_default()
}
