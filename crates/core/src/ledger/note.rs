//! Entry note conventions.
//!
//! Notes carry two embedded facts:
//! - a date marker, `"<label> - DD/MM/YYYY"`, optionally followed by free text
//! - an hour suffix, `"(Nh)"`, that mirrors the entry's hour quantity
//!
//! All knowledge of that text layout lives in this module. Nothing else in the
//! crate should inspect note contents directly.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use rust_decimal::Decimal;

static DATE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(?P<label>.*?\S) - (?P<day>\d{2})/(?P<month>\d{2})/(?P<year>\d{4})\b")
        .expect("Invalid date marker pattern")
});

static HOUR_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((?P<hours>\d+(?:[.,]\d+)?)h\)\s*$")
        .expect("Invalid hour suffix pattern")
});

/// Extracts the calendar date from a note's date marker.
///
/// Returns `None` when the marker is absent or names an impossible date.
#[must_use]
pub fn marker_date(note: &str) -> Option<NaiveDate> {
    let caps = DATE_MARKER.captures(note)?;
    let field = |name: &str| caps.name(name)?.as_str().parse::<u32>().ok();
    let year = i32::try_from(field("year")?).ok()?;
    NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)
}

/// Returns true if the note carries a parsable date marker.
#[must_use]
pub fn has_marker(note: Option<&str>) -> bool {
    note.and_then(marker_date).is_some()
}

/// Returns true if `label` can head a note without shadowing its date marker.
///
/// A label that itself contains `" - DD/MM/YYYY"` would be read as the
/// marker, so the entry would resolve to the wrong day.
#[must_use]
pub fn is_valid_label(label: &str) -> bool {
    let label = label.trim();
    !label.is_empty() && !DATE_MARKER.is_match(label)
}

/// Extracts the hour quantity from the `(Nh)` suffix ending the note.
#[must_use]
pub fn suffix_hours(note: &str) -> Option<Decimal> {
    let raw = HOUR_SUFFIX.captures(note)?.name("hours")?.as_str().replace(',', ".");
    raw.parse().ok()
}

/// Formats hours the way the suffix stores them (`12`, `1.5`).
#[must_use]
pub fn format_hours(hours: Decimal) -> String {
    hours.normalize().to_string()
}

/// Builds the note for a newly registered entry.
///
/// Layout: `"<label> - DD/MM/YYYY[ <detail>] (Nh)"`.
#[must_use]
pub fn compose(label: &str, date: NaiveDate, detail: Option<&str>, hours: Decimal) -> String {
    let mut note = format!("{} - {}", label.trim(), date.format("%d/%m/%Y"));
    if let Some(detail) = detail.map(str::trim).filter(|d| !d.is_empty()) {
        note.push(' ');
        note.push_str(detail);
    }
    note.push_str(&format!(" ({}h)", format_hours(hours)));
    note
}

/// Rewrites the `(Nh)` suffix ending the note to `hours`, keeping every other
/// character.
///
/// Notes without a trailing suffix are returned unchanged, including any
/// `(Nh)` text earlier in the note.
#[must_use]
pub fn rewrite_hours(note: &str, hours: Decimal) -> String {
    let replacement = format!("({}h)", format_hours(hours));
    HOUR_SUFFIX.replace(note, NoExpand(&replacement)).into_owned()
}
