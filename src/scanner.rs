//! Intensity Scanner (§4.1): turns a stream of luminance samples into a
//! stream of (bar|space, width) events with sub-pixel edge positions.
//!
//! Ported from the two-step second-difference edge interpolation in
//! zbar's `zebra_scan_y` (`zebra/scanner.c`), with the decoder threaded
//! through each call instead of held as a raw pointer (§9 design note).

use crate::constants::{FIXED_POINT_BITS, FIXED_POINT_ONE, MIN_EDGE_THRESHOLD, THRESHOLD_DECAY_DENOMINATOR};
use crate::decoder::Decoder;
use crate::symbol::SymbolType;
use crate::trace::dprintln;

/// The color of the element currently under the scan head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Space,
    Bar,
}

/// Streaming sub-pixel edge detector (spec §3 "Scanner state").
#[derive(Debug, Clone)]
pub struct Scanner {
    x: u32,
    y0: [i32; 4],
    y1_sign: i32,
    y1_thresh: i32,
    y1_min_thresh: i32,
    cur_edge: i64,
    last_edge: i64,
    width: i64,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Scanner {
            x: 0,
            y0: [0; 4],
            y1_sign: 0,
            y1_thresh: MIN_EDGE_THRESHOLD,
            y1_min_thresh: MIN_EDGE_THRESHOLD,
            cur_edge: 0,
            last_edge: 0,
            width: 0,
        }
    }

    /// Returns to the initial state; emits nothing.
    pub fn reset(&mut self) {
        *self = Scanner::new();
    }

    /// The fixed-point width of the last emitted element.
    pub fn get_width(&self) -> i64 {
        self.width
    }

    /// The color of the element currently under the scan head.
    pub fn get_color(&self) -> Color {
        if self.y1_sign <= 0 {
            Color::Space
        } else {
            Color::Bar
        }
    }

    #[cfg(feature = "trace")]
    pub fn debug_state(&self) -> (u32, i64, i64, [i32; 4], i32) {
        (self.x, self.cur_edge, self.last_edge, self.y0, self.y1_thresh)
    }

    fn calc_thresh(&mut self) -> i32 {
        let thresh = self.y1_thresh;
        if thresh <= self.y1_min_thresh || self.width == 0 {
            return self.y1_min_thresh;
        }
        let elapsed = ((self.x as i64) << FIXED_POINT_BITS) - self.last_edge;
        let mut t = (thresh as i64) * elapsed;
        t /= self.width;
        t /= THRESHOLD_DECAY_DENOMINATOR;
        t = ((t >> (FIXED_POINT_BITS - 1)) + 1) >> 1;
        let mut new_thresh = thresh - t as i32;
        if new_thresh < self.y1_min_thresh {
            new_thresh = self.y1_min_thresh;
            self.y1_thresh = new_thresh;
        }
        new_thresh
    }

    fn process_edge(&mut self, y1: i32, decoder: &mut Decoder) -> SymbolType {
        self.width = self.cur_edge - self.last_edge;
        self.last_edge = self.cur_edge;

        self.y1_thresh = ((y1 + 1) / 2).abs();
        if self.y1_thresh < self.y1_min_thresh {
            self.y1_thresh = self.y1_min_thresh;
        }

        if self.width != 0 {
            self.y1_sign = y1;
            dprintln!("scanner: edge width={} color={:?}", self.width, self.get_color());
            decoder.decode_width(self.width)
        } else {
            SymbolType::None
        }
    }

    /// Consume one luminance sample, returning `NONE`, `PARTIAL`, or a
    /// concrete symbol type propagated from the decoder.
    pub fn scan_y(&mut self, y: i32, decoder: &mut Decoder) -> SymbolType {
        let idx1 = (self.x.wrapping_sub(1) & 3) as usize;
        let y0_1 = self.y0[idx1];
        let y0_0 = if self.x != 0 {
            let updated = y0_1 + ((y - y0_1 + 1) / 2);
            self.y0[(self.x & 3) as usize] = updated;
            updated
        } else {
            self.y0 = [y; 4];
            y
        };
        let y0_2 = self.y0[(self.x.wrapping_sub(2) & 3) as usize];
        let y0_3 = self.y0[(self.x.wrapping_sub(3) & 3) as usize];

        let mut y1_1 = y0_0 - y0_2;
        let y1_2 = y0_1 - y0_3;
        if y1_1.abs() < y1_2.abs() {
            y1_1 = y1_2;
        }

        let y2_1 = y0_0 - 2 * y0_1 + y0_2;
        let y2_2 = y0_1 - 2 * y0_2 + y0_3;

        let mut edge = SymbolType::None;

        let zero_crossing = y2_1 == 0 || (if y2_1 > 0 { y2_2 < 0 } else { y2_2 > 0 });
        if zero_crossing && self.calc_thresh() < y1_1.abs() {
            let reversal = if self.y1_sign > 0 { y1_1 < 0 } else { y1_1 > 0 };
            if reversal {
                edge = self.process_edge(y1_1, decoder);
            }

            let d = y2_1 - y2_2;
            let mut cur = FIXED_POINT_ONE;
            if d == 0 {
                cur >>= 1;
            } else if y2_1 != 0 {
                cur -= ((y2_1 as i64) * FIXED_POINT_ONE + 1) / d as i64;
            }
            cur += (self.x as i64) << FIXED_POINT_BITS;
            self.cur_edge = cur;
        }

        self.x = self.x.wrapping_add(1);
        edge
    }

    /// Synthesizes one trailing sample, far in the opposite polarity of
    /// the current color, to force any pending edge through the pipeline.
    /// This is the scanner's emulation of a mandatory quiet zone
    /// (GLOSSARY: "the scanner emulates it via synthetic trailing
    /// samples").
    fn synth_quiet_sample(&mut self, decoder: &mut Decoder) -> SymbolType {
        let idx = (self.x.wrapping_sub(1) & 3) as usize;
        let base = self.y0[idx];
        let delta = if self.y1_sign <= 0 { 1000 } else { -1000 };
        self.scan_y(base + delta, decoder)
    }

    /// Forces pending edge bookkeeping out; may emit a symbol if the
    /// decoder was holding a partial code that completes on this
    /// boundary.
    pub fn flush(&mut self, decoder: &mut Decoder) -> SymbolType {
        self.synth_quiet_sample(decoder)
    }

    /// Ends the current scan line; may emit at most one terminal edge
    /// event, then prepares for the next line.
    pub fn new_scan(&mut self, decoder: &mut Decoder) -> SymbolType {
        let result = self.synth_quiet_sample(decoder);
        self.x = 0;
        self.y0 = [0; 4];
        self.cur_edge = 0;
        self.last_edge = 0;
        decoder.new_scan();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;

    fn feed_bars(scn: &mut Scanner, dcode: &mut Decoder, widths: &[i32], start_dark: bool) {
        // Render alternating bar/space runs of the given module widths at
        // a fixed intensity, one luminance sample per scanner column.
        let mut dark = start_dark;
        for &w in widths {
            let level = if dark { 20 } else { 235 };
            for _ in 0..w {
                scn.scan_y(level, dcode);
            }
            dark = !dark;
        }
    }

    #[test]
    fn edges_strictly_monotone_and_color_alternates() {
        let mut scn = Scanner::new();
        let mut dcode = Decoder::new();
        let mut last_color = scn.get_color();
        let mut saw_edge = false;
        let mut dark = true;
        for &w in &[40, 6, 6, 6, 6, 6, 6, 40] {
            let level = if dark { 20 } else { 235 };
            for _ in 0..w {
                scn.scan_y(level, &mut dcode);
                if scn.get_width() != 0 {
                    saw_edge = true;
                    assert!(scn.get_width() > 0);
                    assert_ne!(scn.get_color(), last_color);
                }
                last_color = scn.get_color();
            }
            dark = !dark;
        }
        assert!(saw_edge);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut scn = Scanner::new();
        let mut dcode = Decoder::new();
        feed_bars(&mut scn, &mut dcode, &[20, 6, 6, 6], true);
        scn.reset();
        assert_eq!(scn.get_width(), 0);
        assert_eq!(scn.get_color(), Color::Space);
    }
}
