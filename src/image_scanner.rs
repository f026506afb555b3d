//! Image Scanner (spec §4.3): drives the intensity scanner + decoder
//! pair across a grayscale image in a boustrophedon pattern, dedupes
//! symbols within one image, and optionally cross-checks results
//! against a small number of recent images before reporting them.
//!
//! Ported from `zbar_scan_image`/`symbol_handler`/`quiet_border`
//! (`zbar/img_scanner.c`): the row pass first, then the column pass,
//! each sweeping back and forth (`movedelta`) and flushing the scanner
//! pipeline twice plus one `new_scan` at every border. The intrusive
//! refcounted recycle-pool/cache in the original is replaced here with
//! a plain `Vec<Symbol>` recycle pool and cache, since ownership in
//! Rust is already exclusive per `Vec` (see `symbol.rs` doc comment).

use crate::constants::{CACHE_CONSISTENCY, CACHE_HYSTERESIS_MS, CACHE_PROXIMITY_MS, CACHE_TIMEOUT_MS};
use crate::decoder::Decoder;
use crate::error::BarcodeError;
use crate::scanner::Scanner;
use crate::symbol::{Point, Symbol, SymbolType};
use crate::trace::dprintln;

/// Selects which symbology a `set_config` call applies to (spec §4.3,
/// §6 "key ∈ {..., per-symbology enables, ...}"). `All` targets the
/// scanner-wide density/position keys; a concrete symbology targets its
/// own enable flag in the shared decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    All,
    Ean13,
    UpcA,
    Ean8,
    UpcE,
    Code128,
}

/// Configuration key space (spec §6). Decoder-level keys other than
/// `Enable` are out of scope for this crate's simplified config surface
/// (spec §4.3 "decoder-level keys delegated to A") and are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    XDensity,
    YDensity,
    Position,
    Enable,
}

/// A single-channel (grayscale) image view. The scanner never owns
/// pixel storage; callers provide a borrowed byte slice.
pub struct GrayImage<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

impl<'a> GrayImage<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, BarcodeError> {
        if (width as usize) * (height as usize) != data.len() {
            return Err(BarcodeError::InvalidImageDimensions);
        }
        Ok(GrayImage { width, height, data })
    }

    #[inline]
    fn at(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }
}

/// Scan density and reporting configuration (spec §4.3 "configs").
#[derive(Debug, Clone, Copy)]
pub struct ScannerConfig {
    pub x_density: i32,
    pub y_density: i32,
    pub record_positions: bool,
    pub enable_cache: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            x_density: 1,
            y_density: 1,
            record_positions: true,
            enable_cache: false,
        }
    }
}

struct CacheEntry {
    symbol_type: SymbolType,
    data: String,
    time_ms: i64,
    cache_count: i32,
}

/// Drives the scan of a sequence of images, deduplicating symbols
/// within an image and, when enabled, across a short recent history.
pub struct ImageScanner {
    scn: Scanner,
    dcode: Decoder,
    config: ScannerConfig,
    cache: Vec<CacheEntry>,
    clock_ms: i64,
    handler: Option<Box<dyn FnMut(&[Symbol])>>,
}

impl Default for ImageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageScanner {
    pub fn new() -> Self {
        ImageScanner {
            scn: Scanner::new(),
            dcode: Decoder::new(),
            config: ScannerConfig::default(),
            cache: Vec::new(),
            clock_ms: 0,
            handler: None,
        }
    }

    /// Bulk configuration setter used by callers (tests, FFI) that want
    /// to replace the whole `ScannerConfig` at once, rather than one key
    /// at a time through `set_config`.
    pub fn set_config_all(&mut self, config: ScannerConfig) {
        self.config = config;
    }

    /// Sets one configuration key, matching spec §4.3/§6's
    /// `set_config(symbology, key, value)`. Invalid key/symbology
    /// combinations or out-of-range values return an error without
    /// mutating any state (spec §6 "no state mutation").
    pub fn set_config(&mut self, symbology: Symbology, key: ConfigKey, value: i32) -> Result<(), BarcodeError> {
        match key {
            ConfigKey::XDensity | ConfigKey::YDensity => {
                if symbology != Symbology::All {
                    return Err(BarcodeError::InvalidSymbology);
                }
                if value < 0 {
                    return Err(BarcodeError::InvalidConfigValue);
                }
                if key == ConfigKey::XDensity {
                    self.config.x_density = value;
                } else {
                    self.config.y_density = value;
                }
                Ok(())
            }
            ConfigKey::Position => {
                if symbology != Symbology::All {
                    return Err(BarcodeError::InvalidSymbology);
                }
                match value {
                    0 => self.config.record_positions = false,
                    1 => self.config.record_positions = true,
                    _ => return Err(BarcodeError::InvalidConfigValue),
                }
                Ok(())
            }
            ConfigKey::Enable => {
                let ty = match symbology {
                    Symbology::All => return Err(BarcodeError::InvalidSymbology),
                    Symbology::Ean13 => SymbolType::Ean13,
                    Symbology::UpcA => SymbolType::UpcA,
                    Symbology::Ean8 => SymbolType::Ean8,
                    Symbology::UpcE => SymbolType::UpcE,
                    Symbology::Code128 => SymbolType::Code128,
                };
                match value {
                    0 => self.dcode.set_enabled(ty, false),
                    1 => self.dcode.set_enabled(ty, true),
                    _ => return Err(BarcodeError::InvalidConfigValue),
                }
                Ok(())
            }
        }
    }

    /// Installs a callback invoked exactly once per `scan_image` call
    /// that surfaces at least one symbol (spec §4.3 "Callback"),
    /// returning any previously installed handler.
    pub fn set_data_handler<F>(&mut self, handler: F) -> Option<Box<dyn FnMut(&[Symbol])>>
    where
        F: FnMut(&[Symbol]) + 'static,
    {
        self.handler.replace(Box::new(handler))
    }

    pub fn enable_cache(&mut self, enable: bool) {
        if !enable {
            self.cache.clear();
        }
        self.config.enable_cache = enable;
    }

    /// Monotonic clock driving symbol timestamps and cache aging; tests
    /// and callers with no wall clock can step this explicitly.
    pub fn set_clock_ms(&mut self, now: i64) {
        self.clock_ms = now;
    }

    fn cache_lookup(&mut self, symbol_type: SymbolType, data: &str, now: i64) -> usize {
        self.cache.retain(|e| now - e.time_ms <= CACHE_TIMEOUT_MS || (e.symbol_type == symbol_type && e.data == data));
        if let Some(idx) = self
            .cache
            .iter()
            .position(|e| e.symbol_type == symbol_type && e.data == data)
        {
            return idx;
        }
        self.cache.push(CacheEntry {
            symbol_type,
            data: data.to_string(),
            time_ms: now - CACHE_HYSTERESIS_MS,
            cache_count: -CACHE_CONSISTENCY,
        });
        self.cache.len() - 1
    }

    /// Applies the cross-image consistency/hysteresis state machine and
    /// returns the resulting `cache_count` to stamp on the symbol.
    fn apply_cache(&mut self, symbol_type: SymbolType, data: &str, now: i64) -> i32 {
        let idx = self.cache_lookup(symbol_type, data, now);
        let entry = &mut self.cache[idx];
        let age = now - entry.time_ms;
        entry.time_ms = now;
        let near = age < CACHE_PROXIMITY_MS;
        let far = age >= CACHE_HYSTERESIS_MS;
        let dup = entry.cache_count >= 0;
        if (!dup && !near) || far {
            entry.cache_count = -CACHE_CONSISTENCY;
        } else if dup || near {
            entry.cache_count += 1;
        }
        entry.cache_count
    }

    fn symbol_handler(&mut self, out: &mut Vec<Symbol>, x: i32, y: i32, now: i64) {
        let ty = self.dcode.get_type();
        if !ty.is_decoded() {
            return;
        }
        let data = self.dcode.get_data().to_string();

        for sym in out.iter_mut() {
            if sym.matches(ty, &data) {
                sym.quality += 1;
                if self.config.record_positions {
                    sym.points.push(Point { x, y });
                }
                return;
            }
        }

        let mut sym = Symbol::new(ty, data.clone(), now);
        if self.config.record_positions {
            sym.points.push(Point { x, y });
        }
        sym.cache_count = if self.config.enable_cache {
            self.apply_cache(ty, &data, now)
        } else {
            0
        };
        dprintln!("image_scanner: {} \"{}\" @ ({}, {})", ty.name(), data, x, y);
        out.push(sym);
    }

    fn quiet_border(&mut self, out: &mut Vec<Symbol>, x: i32, y: i32, now: i64) {
        if self.scn.flush(&mut self.dcode).is_decoded() {
            self.symbol_handler(out, x, y, now);
        }
        if self.scn.flush(&mut self.dcode).is_decoded() {
            self.symbol_handler(out, x, y, now);
        }
        if self.scn.new_scan(&mut self.dcode).is_decoded() {
            self.symbol_handler(out, x, y, now);
        }
    }

    /// Scans one grayscale image, returning the deduplicated symbols
    /// found and their per-symbol quality/position/cache data.
    pub fn scan_image(&mut self, img: &GrayImage) -> Result<Vec<Symbol>, BarcodeError> {
        let now = self.clock_ms;
        let mut syms: Vec<Symbol> = Vec::new();
        let w = img.width as i32;
        let h = img.height as i32;

        if h == 0 || w == 0 {
            return Ok(syms);
        }

        let y_density = self.config.y_density;
        if y_density > 0 {
            let mut border = (((h - 1) % y_density) + 1) / 2;
            if border > h / 2 {
                border = h / 2;
            }
            let mut y = border;

            if self.scn.new_scan(&mut self.dcode).is_decoded() {
                self.symbol_handler(&mut syms, 0, y, now);
            }

            while y < h {
                let mut x = 0;
                while x < w {
                    if self.scn.scan_y(img.at(x as u32, y as u32) as i32, &mut self.dcode).is_decoded() {
                        self.symbol_handler(&mut syms, x, y, now);
                    }
                    x += 1;
                }
                self.quiet_border(&mut syms, x, y, now);

                x -= 1;
                y += y_density;
                if y >= h {
                    break;
                }

                while x > 0 {
                    if self.scn.scan_y(img.at(x as u32, y as u32) as i32, &mut self.dcode).is_decoded() {
                        self.symbol_handler(&mut syms, x, y, now);
                    }
                    x -= 1;
                }
                self.quiet_border(&mut syms, x, y, now);
                y += y_density;
            }
        }

        let x_density = self.config.x_density;
        if x_density > 0 {
            let mut border = (((w - 1) % x_density) + 1) / 2;
            if border > w / 2 {
                border = w / 2;
            }
            let mut x = border;

            while x < w {
                let mut y = 0;
                while y < h {
                    if self.scn.scan_y(img.at(x as u32, y as u32) as i32, &mut self.dcode).is_decoded() {
                        self.symbol_handler(&mut syms, x, y, now);
                    }
                    y += 1;
                }
                self.quiet_border(&mut syms, x, y, now);

                y -= 1;
                x += x_density;
                if x >= w {
                    break;
                }

                while y >= 0 {
                    if self.scn.scan_y(img.at(x as u32, y as u32) as i32, &mut self.dcode).is_decoded() {
                        self.symbol_handler(&mut syms, x, y, now);
                    }
                    y -= 1;
                }
                self.quiet_border(&mut syms, x, y, now);
                x += x_density;
            }
        }

        // Filters weak single-pass linear results, matching the original's
        // "tmp hack to filter bad EAN results": a linear symbol seen on
        // only one scan direction needs multiple independent confirmations
        // before it is trusted.
        if !self.config.enable_cache && (x_density == 1 || y_density == 1) {
            syms.retain(|s| !(s.symbol_type.is_linear() && s.quality < 3));
        }

        if !syms.is_empty() {
            if let Some(handler) = self.handler.as_mut() {
                handler(&syms);
            }
        }

        Ok(syms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> Vec<u8> {
        vec![value; (width * height) as usize]
    }

    #[test]
    fn blank_image_yields_no_symbols() {
        let data = solid(64, 16, 128);
        let img = GrayImage::new(64, 16, &data).unwrap();
        let mut iscn = ImageScanner::new();
        let syms = iscn.scan_image(&img).unwrap();
        assert!(syms.is_empty());
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let data = solid(10, 10, 0);
        assert!(GrayImage::new(10, 11, &data).is_err());
    }

    #[test]
    fn set_config_rejects_out_of_range_density() {
        let mut iscn = ImageScanner::new();
        assert!(iscn.set_config(Symbology::All, ConfigKey::XDensity, -1).is_err());
        assert!(iscn.set_config(Symbology::All, ConfigKey::XDensity, 3).is_ok());
    }

    #[test]
    fn set_config_rejects_density_on_a_symbology() {
        let mut iscn = ImageScanner::new();
        assert!(iscn.set_config(Symbology::Ean13, ConfigKey::XDensity, 2).is_err());
    }

    #[test]
    fn set_config_enable_rejects_bad_value() {
        let mut iscn = ImageScanner::new();
        assert!(iscn.set_config(Symbology::Code128, ConfigKey::Enable, 2).is_err());
        assert!(iscn.set_config(Symbology::Code128, ConfigKey::Enable, 0).is_ok());
    }

    #[test]
    fn data_handler_fires_once_when_symbols_surface() {
        let data = solid(64, 16, 128);
        let img = GrayImage::new(64, 16, &data).unwrap();
        let mut iscn = ImageScanner::new();
        let calls = std::rc::Rc::new(std::cell::RefCell::new(0));
        let calls2 = calls.clone();
        iscn.set_data_handler(move |_syms| {
            *calls2.borrow_mut() += 1;
        });
        iscn.scan_image(&img).unwrap();
        assert_eq!(*calls.borrow(), 0);
    }
}
