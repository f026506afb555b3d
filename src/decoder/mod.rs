//! Decoder dispatcher (spec §4.2, §9): owns the shared element-width
//! ring buffer plus one independent accumulator per symbology, and
//! picks the first to commit to a concrete symbol.
//!
//! Grounded on `zebra/decoder.c`'s dispatcher shape (`zebra_decode_width`
//! fans a single incoming width out to `zebra_decode_ean`/
//! `zebra_decode_code128`/...); the symbology-specific bodies themselves
//! are not in the retained source excerpt, so `ean.rs`/`code128.rs` are
//! reconstructed from the public symbologies (see module docs there).

mod code128;
mod ean;

use crate::constants::{RING_MASK, RING_SIZE};
use crate::symbol::SymbolType;
use crate::trace::dprintln;

/// Fixed-size history of recent element widths, shared read-only context
/// for decoders that need to look behind the current element (e.g. Code
/// 128's checksum over the whole symbol is handled internally by
/// `code128::Code128Decoder` instead, but the ring remains available for
/// future symbologies per the §9 design note).
#[derive(Debug, Clone)]
struct Ring {
    buf: [i64; RING_SIZE],
    head: usize,
    len: usize,
}

impl Ring {
    fn new() -> Self {
        Ring {
            buf: [0; RING_SIZE],
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, width: i64) {
        self.buf[self.head] = width;
        self.head = (self.head + 1) & RING_MASK;
        if self.len < RING_SIZE {
            self.len += 1;
        }
    }

    fn reset(&mut self) {
        self.buf = [0; RING_SIZE];
        self.head = 0;
        self.len = 0;
    }
}

/// Dispatches each incoming element width to every registered symbology
/// decoder in parallel. The first decoder to report a concrete (not
/// `None`/`Partial`) `SymbolType` wins and the shared lock engages so
/// sibling decoders stop contending until the next scan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockOwner {
    Ean,
    Code128,
}

pub struct Decoder {
    ring: Ring,
    lock: Option<LockOwner>,
    ean: ean::EanDecoder,
    code128: code128::Code128Decoder,
    last_data: String,
    last_type: SymbolType,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            ring: Ring::new(),
            lock: None,
            ean: ean::EanDecoder::new(),
            code128: code128::Code128Decoder::new(),
            last_data: String::new(),
            last_type: SymbolType::None,
        }
    }

    /// Clears all per-symbology state and the shared lock, but keeps the
    /// decoder ready for the next image.
    pub fn reset(&mut self) {
        self.ring.reset();
        self.lock = None;
        self.ean.reset();
        self.code128.reset();
        self.last_data.clear();
        self.last_type = SymbolType::None;
    }

    /// The type of the most recently decoded symbol (spec §4.3,
    /// grounded on `zebra_decoder_get_type`).
    pub fn get_type(&self) -> SymbolType {
        self.last_type
    }

    /// Enables or disables one symbology's participation in the shared
    /// race (spec §4.3 `set_config` per-symbology enables; grounded on
    /// `zebra_decoder_set_config`'s `ZBAR_CFG_ENABLE`).
    pub fn set_enabled(&mut self, ty: SymbolType, enabled: bool) {
        match ty {
            SymbolType::Code128 => self.code128.set_enabled(enabled),
            SymbolType::Ean13 | SymbolType::UpcA | SymbolType::Ean8 | SymbolType::UpcE => {
                self.ean.set_enabled(ty, enabled)
            }
            _ => {}
        }
    }

    /// Called at scan-line boundaries (`Scanner::new_scan`): releases the
    /// shared lock and resets each symbology's accumulator, since a new
    /// scan line cannot continue a partial parse from the previous one.
    pub fn new_scan(&mut self) {
        self.lock = None;
        self.ean.new_scan();
        self.code128.new_scan();
    }

    /// The most recently decoded payload, valid until the next call that
    /// returns a concrete `SymbolType`.
    pub fn get_data(&self) -> &str {
        &self.last_data
    }

    /// Feeds one element width to every symbology decoder and returns the
    /// strongest result (spec §4.2 "first decoder to commit wins").
    ///
    /// Every enabled decoder sees every width, unconditionally (spec §4.1:
    /// "each width produced by B is pushed to all active decoders in A in
    /// lockstep") — withholding a width from a decoder because a sibling
    /// holds the lock would desynchronize its internal accumulator from
    /// the element stream it's supposed to be tracking. The lock instead
    /// arbitrates which decoder's *result* is authoritative: a concrete
    /// decode always wins outright (it is ground truth, not a competing
    /// guess, and immediately releases the lock per spec §4.2 "it clears
    /// when that decoder terminates"); short of that, whichever decoder
    /// currently holds the lock keeps reporting through it until it
    /// resolves one way or the other.
    pub fn decode_width(&mut self, width: i64) -> SymbolType {
        self.ring.push(width);

        let mut ean_data = String::new();
        let ean_result = self.ean.advance(width, &mut ean_data);

        let mut c128_data = String::new();
        let c128_result = self.code128.advance(width, &mut c128_data);

        let (result, data, owner) = if ean_result.is_decoded() {
            (ean_result, ean_data, LockOwner::Ean)
        } else if c128_result.is_decoded() {
            (c128_result, c128_data, LockOwner::Code128)
        } else if self.lock == Some(LockOwner::Code128) {
            (c128_result, c128_data, LockOwner::Code128)
        } else if self.lock == Some(LockOwner::Ean) {
            (ean_result, ean_data, LockOwner::Ean)
        } else if ean_result >= c128_result {
            (ean_result, ean_data, LockOwner::Ean)
        } else {
            (c128_result, c128_data, LockOwner::Code128)
        };

        self.last_type = result;
        if result.is_decoded() {
            dprintln!("decoder: {} -> {:?}", result.name(), data);
            self.last_data = data;
            self.lock = None;
        } else if result == SymbolType::Partial {
            self.lock = Some(owner);
        } else {
            self.lock = None;
        }

        result
    }
}
