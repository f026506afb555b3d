//! QR text extraction (spec §4.4).
//!
//! Ported from `qr_code_data_list_extract_text` (`qrdectxt.c`): groups
//! structured-append members, detects FNC1, then walks each member's
//! entries converting raw mode data to UTF-8. `encoding_rs` replaces
//! `iconv`; the move-to-front 3-candidate encoding list and the
//! Latin-1-demotion heuristic are preserved as in the original.

use crate::constants::GROUP_SEPARATOR;
use crate::qr::eci::Eci;
use crate::qr::record::{QrCodeData, QrEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Latin1,
    Sjis,
    Utf8,
}

/// `text_is_latin1`: any byte in the C1 control range disqualifies a
/// buffer from being treated as Latin-1.
fn is_latin1_safe(bytes: &[u8]) -> bool {
    !bytes.iter().any(|&b| (0x80..0xA0).contains(&b))
}

fn mtf(list: &mut Vec<Candidate>, used: Candidate) {
    if let Some(pos) = list.iter().position(|&c| c == used) {
        list.remove(pos);
        list.insert(0, used);
    }
}

/// Auto-detects and decodes a byte-mode entry with no established ECI:
/// UTF-8 BOM short-circuit, then the move-to-front candidate list with
/// the Latin-1-demotion heuristic.
fn decode_byte_auto(bytes: &[u8], enc_list: &mut Vec<Candidate>) -> Option<String> {
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        if let Ok(s) = std::str::from_utf8(&bytes[3..]) {
            mtf(enc_list, Candidate::Utf8);
            return Some(s.to_string());
        }
    }

    let mut order = enc_list.clone();
    if let Some(pos) = order.iter().position(|&c| c == Candidate::Latin1) {
        if pos < 2 && !is_latin1_safe(bytes) {
            let latin1 = order.remove(pos);
            order.push(latin1);
        }
    }

    for cand in order {
        let decoded = match cand {
            Candidate::Latin1 => Some(bytes.iter().map(|&b| b as char).collect::<String>()),
            Candidate::Sjis => {
                let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
                if had_errors {
                    None
                } else {
                    Some(text.into_owned())
                }
            }
            Candidate::Utf8 => std::str::from_utf8(bytes).ok().map(|s| s.to_string()),
        };
        if let Some(text) = decoded {
            mtf(enc_list, cand);
            return Some(text);
        }
    }
    None
}

/// Alphanumeric-mode bytes are 1:1 ASCII; under FNC1, `%` is an escape
/// (`%%` -> literal `%`, lone `%` -> ASCII group separator).
fn append_alnum(bytes: &[u8], fnc1: bool, out: &mut String) {
    if !fnc1 {
        out.extend(bytes.iter().map(|&b| b as char));
        return;
    }
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'%' {
                out.push('%');
                i += 2;
            } else {
                out.push(GROUP_SEPARATOR as char);
                i += 1;
            }
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
}

/// Groups `list[i]` with any other unmarked members sharing its
/// structured-append size/parity, in `sa_index` order. Returns one slot
/// per expected index (`None` for a missing member) and whether every
/// slot was filled.
fn collect_group(list: &[QrCodeData], marked: &mut [bool], i: usize) -> (Vec<Option<usize>>, bool) {
    if list[i].sa_size == 0 {
        marked[i] = true;
        return (vec![Some(i)], true);
    }

    let sa_size = list[i].sa_size as usize;
    let sa_parity = list[i].sa_parity;
    let mut slots: Vec<Option<usize>> = vec![None; sa_size];
    for (j, candidate) in list.iter().enumerate().skip(i) {
        if marked[j] {
            continue;
        }
        if candidate.sa_size as usize == sa_size && candidate.sa_parity == sa_parity {
            let idx = candidate.sa_index as usize;
            if idx < sa_size && slots[idx].is_none() {
                slots[idx] = Some(j);
                marked[j] = true;
            }
        }
    }

    let complete = slots.iter().all(|s| s.is_some());
    (slots, complete)
}

/// Converts one structured-append group's present members into one or
/// more UTF-8 strings (a gap between members starts a new string).
///
/// A transcode failure (an exhausted byte-mode candidate list, or
/// invalid Shift-JIS in a Kanji entry) drops only the run currently being
/// built, not the whole group: runs completed earlier in the same group
/// are kept (spec §4.4 "drop the partially-built string and continue",
/// mirroring `qrdectxt.c`'s `text[ntext++]` strings surviving a `free`d
/// in-progress `sa_text`).
fn build_group_text(list: &[QrCodeData], members: &[Option<usize>]) -> Vec<String> {
    let fnc1 = members.iter().flatten().any(|&idx| {
        list[idx]
            .entries
            .iter()
            .any(|e| matches!(e, QrEntry::Fnc1First | QrEntry::Fnc1Second))
    });

    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut run_failed = false;
    let mut enc_list = vec![Candidate::Latin1, Candidate::Sjis, Candidate::Utf8];
    let mut eci: Option<Eci> = None;

    let mut idx = 0;
    while idx < members.len() {
        let Some(member_idx) = members[idx] else {
            if in_run && !run_failed {
                out.push(std::mem::take(&mut current));
            }
            current.clear();
            in_run = false;
            run_failed = false;
            idx += 1;
            continue;
        };

        in_run = true;
        if run_failed {
            idx += 1;
            continue;
        }

        let data = &list[member_idx];
        for entry in &data.entries {
            match entry {
                QrEntry::Numeric(bytes) => current.extend(bytes.iter().map(|&b| b as char)),
                QrEntry::Alphanumeric(bytes) => append_alnum(bytes, fnc1, &mut current),
                QrEntry::StructuredAppend { .. } | QrEntry::Fnc1First | QrEntry::Fnc1Second => {}
                QrEntry::Byte(bytes) => {
                    let text = match eci {
                        Some(designated) => designated.decode(bytes).ok(),
                        None => decode_byte_auto(bytes, &mut enc_list),
                    };
                    match text {
                        Some(text) => current.push_str(&text),
                        None => {
                            run_failed = true;
                            break;
                        }
                    }
                }
                QrEntry::Kanji(bytes) => {
                    let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(bytes);
                    if had_errors {
                        run_failed = true;
                        break;
                    }
                    current.push_str(&text);
                }
                QrEntry::Eci(designator) => {
                    eci = Eci::from_designator(*designator);
                }
            }
        }

        if eci.map(|e| e.resets_at_boundary()).unwrap_or(false) {
            eci = None;
        }
        idx += 1;
    }

    if in_run && !run_failed {
        out.push(current);
    }
    out
}

/// Extracts UTF-8 text from every QR symbol in `list`, grouping
/// structured-append members together. When `allow_partial_sa` is
/// false, incomplete groups are dropped entirely; otherwise each
/// contiguous run of present members is decoded as its own string.
pub fn extract_text(list: &[QrCodeData], allow_partial_sa: bool) -> Vec<String> {
    let mut marked = vec![false; list.len()];
    let mut out = Vec::new();

    for i in 0..list.len() {
        if marked[i] {
            continue;
        }
        let (members, complete) = collect_group(list, &mut marked, i);
        if !allow_partial_sa && !complete {
            continue;
        }
        out.extend(build_group_text(list, &members));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_entry(s: &str) -> QrEntry {
        QrEntry::Byte(s.as_bytes().to_vec())
    }

    #[test]
    fn decodes_plain_utf8_byte_mode() {
        let mut code = QrCodeData::new();
        code.entries.push(byte_entry("caf\u{e9}"));
        let strings = extract_text(&[code], true);
        assert_eq!(strings, vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn decodes_utf8_bom_short_circuit() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("caf\u{e9}".as_bytes());
        let mut code = QrCodeData::new();
        code.entries.push(QrEntry::Byte(bytes));
        let strings = extract_text(&[code], true);
        assert_eq!(strings, vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn structured_append_concatenates_in_order() {
        let mut first = QrCodeData::new();
        first.sa_size = 2;
        first.sa_index = 0;
        first.sa_parity = 7;
        first.entries.push(byte_entry("Hello "));

        let mut second = QrCodeData::new();
        second.sa_size = 2;
        second.sa_index = 1;
        second.sa_parity = 7;
        second.entries.push(byte_entry("world"));

        let strings = extract_text(&[first, second], true);
        assert_eq!(strings, vec!["Hello world".to_string()]);
    }

    #[test]
    fn incomplete_structured_append_dropped_when_disallowed() {
        let mut first = QrCodeData::new();
        first.sa_size = 2;
        first.sa_index = 0;
        first.sa_parity = 7;
        first.entries.push(byte_entry("Hello "));

        let strings = extract_text(&[first], false);
        assert!(strings.is_empty());
    }

    #[test]
    fn failing_run_drops_only_itself_not_earlier_completed_runs() {
        let mut first = QrCodeData::new();
        first.sa_size = 3;
        first.sa_index = 0;
        first.sa_parity = 5;
        first.entries.push(byte_entry("Hello"));

        // Index 1 is never transmitted, so index 0 and index 2 are
        // separate runs within the same group.
        let mut third = QrCodeData::new();
        third.sa_size = 3;
        third.sa_index = 2;
        third.sa_parity = 5;
        third.entries.push(QrEntry::Eci(2)); // CP437: unsupported, always fails.
        third.entries.push(byte_entry("boom"));

        let strings = extract_text(&[first, third], true);
        assert_eq!(strings, vec!["Hello".to_string()]);
    }

    #[test]
    fn fnc1_percent_escapes_in_alphanumeric_mode() {
        let mut code = QrCodeData::new();
        code.entries.push(QrEntry::Fnc1First);
        code.entries.push(QrEntry::Alphanumeric(b"10%125%%OFF".to_vec()));
        let strings = extract_text(&[code], true);
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].as_bytes()[2], GROUP_SEPARATOR);
        assert!(strings[0].contains("125%OFF"));
    }
}
