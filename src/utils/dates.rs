//! Date extraction and normalization
//!
//! Real-world documents carry publish dates in wildly inconsistent shapes:
//! RFC 2822 feed stamps, ISO timestamps, and free-text forms such as
//! "Jan. 9 2024" or "9 jan. 2024". This module guesses a UTC timestamp from
//! whatever text is available and clamps the result so it never lies in the
//! future.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Formats tried against the normalized text, in order.
///
/// Normalization lowercases the input and strips dots and commas, so month
/// abbreviations match `%b` regardless of the "jan." / "Jan" spelling.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dt%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Guess a UTC timestamp from arbitrary date text.
///
/// Tries RFC 3339 and RFC 2822 first, then a table of common layouts on a
/// normalized copy of the text. Returns `None` when nothing matches; callers
/// that need a non-null timestamp fall back to [`Utc::now`] themselves.
pub fn guess_date(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(clamp_to_now(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(clamp_to_now(dt.with_timezone(&Utc)));
    }

    let normalized = normalize(trimmed);

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(clamp_to_now(Utc.from_utc_datetime(&naive)));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, fmt) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(clamp_to_now(Utc.from_utc_datetime(&naive)));
        }
    }

    None
}

/// Guess a date, falling back to now when the text carries no usable signal.
pub fn guess_date_or_now(text: &str) -> DateTime<Utc> {
    guess_date(text).unwrap_or_else(Utc::now)
}

/// A guessed date later than "now" is clamped to "now".
pub fn clamp_to_now(date: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if date > now {
        now
    } else {
        date
    }
}

fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| *c != ',' && *c != '.')
        .collect();
    crate::utils::normalize_whitespace(&stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_guess_iso_date() {
        let dt = guess_date("2024-01-09").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 9));
    }

    #[test]
    fn test_guess_dotted_month_forms() {
        let a = guess_date("Jan. 9 2024").unwrap();
        let b = guess_date("9 jan. 2024").unwrap();
        let c = guess_date("2024-01-09").unwrap();
        assert_eq!(a.date_naive(), c.date_naive());
        assert_eq!(b.date_naive(), c.date_naive());
    }

    #[test]
    fn test_guess_rfc2822() {
        let dt = guess_date("Tue, 09 Jan 2024 10:00:00 GMT").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 9));
    }

    #[test]
    fn test_future_date_clamped() {
        let dt = guess_date("2099-12-31").unwrap();
        assert!(dt <= Utc::now());
    }

    #[test]
    fn test_garbage_returns_none() {
        assert!(guess_date("not a date").is_none());
        assert!(guess_date("").is_none());
    }

    #[test]
    fn test_guess_or_now_never_null() {
        let dt = guess_date_or_now("complete nonsense");
        assert!(dt <= Utc::now());
    }
}
