//! Monetary-amount recognition and parsing.
//!
//! Price lists mix two separator conventions: `1.234,56` (comma decimal) and
//! `1,234.56` (point decimal). Both are recognized, as are plain `12,90` and
//! `12.90`, and amounts are returned as integer cents. An amount must carry
//! exactly two decimal digits unless a currency marker (`R$`, `RS`, `$`, `€`)
//! is attached to it, in which case a whole number such as `R$ 5` is also
//! accepted.

use crate::models::Cents;
use crate::normalize::is_unit_word;

/// Longest digit run considered an amount; anything longer is an article
/// code or a barcode.
const MAX_DIGITS: usize = 12;

const CURRENCY_PREFIXES: &[&str] = &["R$", "RS", "$", "€"];
const CURRENCY_SUFFIXES: &[&str] = &["R$", "€"];

/// A monetary amount located inside a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub cents: Cents,
    /// Byte offset where the amount (including any currency marker) starts.
    pub start: usize,
    /// Byte offset one past the end of the amount, including a trailing
    /// unit word when there is one.
    pub end: usize,
    /// Followed by a unit word (`0,50 kg`, `4,99 un`): a measured quantity,
    /// or a price per unit when the line has no other amount.
    pub per_unit: bool,
}

/// Parses a single amount such as `"R$ 1.234,56"` or `"12.90"`.
///
/// Returns `None` unless the whole string (after trimming) is one amount.
pub fn parse_price(text: &str) -> Option<Cents> {
    let trimmed = text.trim();
    match find_amounts(trimmed).as_slice() {
        [only] if only.start == 0 && only.end == trimmed.len() && !only.per_unit => {
            Some(only.cents)
        }
        _ => None,
    }
}

/// Finds every monetary amount in `line`, left to right.
pub fn find_amounts(line: &str) -> Vec<Amount> {
    let bytes = line.as_bytes();
    let mut out: Vec<Amount> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() || !is_boundary_before(line, i) {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut run_end = i;
        while run_end < bytes.len() && matches!(bytes[run_end], b'0'..=b'9' | b'.' | b',') {
            run_end += 1;
        }
        // Sentence punctuation after an amount is not part of it.
        while run_end > run_start && !bytes[run_end - 1].is_ascii_digit() {
            run_end -= 1;
        }

        if !is_boundary_after(line, run_end) {
            i = skip_word(bytes, run_end);
            continue;
        }

        let run = &line[run_start..run_end];
        // Spans never overlap: a marker already claimed as the previous
        // amount's suffix cannot also prefix this one.
        let claimed = out.last().map_or(0, |a| a.end);
        let prefix = currency_before(line, run_start).filter(|&start| start >= claimed);
        let suffix = currency_after(line, run_end);
        let has_marker = prefix.is_some() || suffix.is_some();

        if let Some(cents) = parse_run(run, has_marker) {
            let end = suffix.unwrap_or(run_end);
            let unit_end = unit_after(line, end);
            out.push(Amount {
                cents,
                start: prefix.unwrap_or(run_start),
                end: unit_end.unwrap_or(end),
                per_unit: unit_end.is_some(),
            });
        }
        i = run_end.max(i + 1);
    }

    out
}

/// Formats cents as a plain decimal string, e.g. `-150` → `"-1.50"`.
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn parse_run(run: &str, has_marker: bool) -> Option<Cents> {
    let digit_count = run.bytes().filter(u8::is_ascii_digit).count();
    if digit_count == 0 || digit_count > MAX_DIGITS {
        return None;
    }

    let last_sep = run.rfind(['.', ',']);
    let (int_part, frac) = match last_sep {
        Some(pos) if run.len() - pos - 1 == 2 => (&run[..pos], &run[pos + 1..]),
        // No decimal part: only acceptable as a whole amount next to a
        // currency marker.
        None if has_marker => (run, "00"),
        _ => return None,
    };

    let units = parse_grouped_integer(int_part)?;
    let frac: i64 = frac.parse().ok()?;
    units.checked_mul(100)?.checked_add(frac)
}

/// Parses `1234`, `1.234` or `1,234` (a single thousands separator kind,
/// groups of exactly three digits after the first).
fn parse_grouped_integer(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    let has_dot = s.contains('.');
    let has_comma = s.contains(',');
    if has_dot && has_comma {
        return None;
    }
    let digits: String = if has_dot || has_comma {
        let sep = if has_dot { '.' } else { ',' };
        let mut groups = s.split(sep);
        let first = groups.next()?;
        if first.is_empty() || first.len() > 3 {
            return None;
        }
        let mut joined = first.to_string();
        for g in groups {
            if g.len() != 3 {
                return None;
            }
            joined.push_str(g);
        }
        joined
    } else {
        s.to_string()
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn is_boundary_before(line: &str, idx: usize) -> bool {
    let mut prev = line[..idx].chars().rev();
    match prev.next() {
        None => true,
        Some(c) if c.is_alphanumeric() => false,
        // `,` or `.` directly after a digit continues a number; after
        // anything else it is a field delimiter.
        Some('.' | ',') => !prev.next().is_some_and(|c| c.is_ascii_digit()),
        Some(_) => true,
    }
}

fn is_boundary_after(line: &str, idx: usize) -> bool {
    match line[idx..].chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}

fn skip_word(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] >= 0x80) {
        idx += 1;
    }
    idx
}

/// Start offset of a currency marker immediately before `idx` (spaces allowed).
fn currency_before(line: &str, idx: usize) -> Option<usize> {
    let head = line[..idx].trim_end();
    CURRENCY_PREFIXES.iter().find_map(|marker| {
        let tail = head.get(head.len().checked_sub(marker.len())?..)?;
        if !tail.eq_ignore_ascii_case(marker) {
            return None;
        }
        let start = head.len() - marker.len();
        // `RS` must stand alone, not end a word like "CARS".
        let standalone = line[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        standalone.then_some(start)
    })
}

/// End offset of a unit word (`kg`, `ml`, `un`, ...) immediately after `idx`.
fn unit_after(line: &str, idx: usize) -> Option<usize> {
    let tail = &line[idx..];
    let rest = tail.trim_start();
    let word_len = rest
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map_or(rest.len(), |(i, _)| i);
    let word = &rest[..word_len];
    if word.is_empty() || !is_unit_word(&word.to_lowercase()) {
        return None;
    }
    Some(idx + (tail.len() - rest.len()) + word_len)
}

/// End offset of a currency marker immediately after `idx` (spaces allowed).
///
/// A marker followed by another number belongs to that number instead.
fn currency_after(line: &str, idx: usize) -> Option<usize> {
    let tail = &line[idx..];
    let skipped = tail.len() - tail.trim_start().len();
    let rest = tail.trim_start();
    CURRENCY_SUFFIXES.iter().find_map(|marker| {
        let after = rest.strip_prefix(marker)?;
        let prefixes_next = after
            .trim_start()
            .starts_with(|c: char| c.is_ascii_digit());
        (!prefixes_next).then_some(idx + skipped + marker.len())
    })
}
