//! Filename convention for derived images.
//!
//! Every edit produces a new file in the derived pool named
//! `{base}_{tag}_{disambiguator}.png`:
//!
//! - `base` is the source stem with any earlier derived suffix removed, so
//!   editing an edit does not grow the name: `dawn_edited_17.png` → `dawn`.
//! - `tag` is [`GRAYSCALE_TAG`] for grayscale-only requests, otherwise
//!   [`EDITED_TAG`].
//! - `disambiguator` is a strictly increasing number handed out by
//!   [`Disambiguator`], so repeated edits of one source never collide.
//!
//! Only a trailing `_{known tag}_{digits}` group is treated as a derived
//! suffix. Underscores elsewhere in an original's name are kept verbatim:
//! `my_trip_01.jpg` stays `my_trip_01`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tag for edits that applied brightness and/or contrast.
pub const EDITED_TAG: &str = "edited";
/// Tag for requests whose only effective edit is grayscale conversion.
pub const GRAYSCALE_TAG: &str = "grayscale";

const DERIVED_TAGS: &[&str] = &[EDITED_TAG, GRAYSCALE_TAG];

/// Extension of every derived artifact (lossless, so pixels survive a round trip).
pub const DERIVED_EXTENSION: &str = "png";

/// Result of splitting a file name into its original stem and derived suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Stem with every trailing derived suffix removed.
    pub base: String,
    /// Tag of the outermost derived suffix, if the name was derived.
    pub tag: Option<String>,
    /// Disambiguator of the outermost derived suffix, if the name was derived.
    pub disambiguator: Option<u64>,
}

/// Parse a file name in the derived naming convention.
///
/// - `"dawn.jpg"` → base="dawn", tag=None
/// - `"dawn_edited_1700000000000.png"` → base="dawn", tag=Some("edited")
/// - `"dawn_grayscale_5_edited_9.png"` → base="dawn", tag=Some("edited"), disambiguator=Some(9)
/// - `"my_trip_01.jpg"` → base="my_trip_01", tag=None
pub fn parse_name(name: &str) -> ParsedName {
    let stem = match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    };

    let mut base = stem;
    let mut outermost: Option<(&str, u64)> = None;
    while let Some((rest, tag, number)) = split_derived_suffix(base) {
        if outermost.is_none() {
            outermost = Some((tag, number));
        }
        base = rest;
    }

    ParsedName {
        base: base.to_string(),
        tag: outermost.map(|(tag, _)| tag.to_string()),
        disambiguator: outermost.map(|(_, number)| number),
    }
}

/// Split one `_{tag}_{digits}` group off the end of `stem`.
///
/// Returns `None` when the stem doesn't end in a derived suffix or when
/// stripping it would leave nothing.
fn split_derived_suffix(stem: &str) -> Option<(&str, &str, u64)> {
    let (head, digits) = stem.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = digits.parse::<u64>().ok()?;
    let (rest, tag) = head.rsplit_once('_')?;
    if rest.is_empty() {
        return None;
    }
    DERIVED_TAGS
        .iter()
        .find(|known| **known == tag)
        .map(|known| (rest, *known, number))
}

/// Build the derived file name for an edit of `source`.
pub fn derived_file_name(source: &str, tag: &str, disambiguator: u64) -> String {
    let parsed = parse_name(source);
    format!("{}_{}_{}.{DERIVED_EXTENSION}", parsed.base, tag, disambiguator)
}

/// Hands out strictly increasing disambiguators.
///
/// Values track wall-clock milliseconds so names sort chronologically, but
/// two calls within the same millisecond (or a clock stepping backwards)
/// still get distinct, increasing values.
#[derive(Debug)]
pub struct Disambiguator {
    last: AtomicU64,
}

impl Disambiguator {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// A generator whose first value is greater than `floor`.
    pub fn starting_after(floor: u64) -> Self {
        Self {
            last: AtomicU64::new(floor),
        }
    }

    pub fn next(&self) -> u64 {
        let now = now_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}

impl Default for Disambiguator {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
