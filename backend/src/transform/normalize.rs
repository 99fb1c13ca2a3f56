//! Date-of-birth coercion.
//!
//! Unparseable or empty values become `None` instead of failing the run;
//! validation drops those records later.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{PersonRecord, RawPerson};

/// Date-only layouts, tried in order. Month-first wins for slashed dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Date-time layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date of birth leniently.
///
/// Returns `None` for empty or unrecognized input. Surrounding whitespace
/// is ignored.
pub fn normalize_dob(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(value) {
        return Some(date);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

/// `YYYYMMDD` with no separators.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Coerce one extracted record.
pub fn normalize(raw: RawPerson) -> PersonRecord {
    let dob = normalize_dob(&raw.dob);
    PersonRecord {
        name: raw.name,
        id: raw.id,
        dob,
        street: raw.street,
        city: raw.city,
        state: raw.state,
        zipcode: raw.zipcode,
        country: raw.country,
    }
}

/// Coerce a batch, preserving order.
pub fn normalize_all(raw: Vec<RawPerson>) -> Vec<PersonRecord> {
    raw.into_iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(normalize_dob("1990-05-12"), Some(date(1990, 5, 12)));
        assert_eq!(normalize_dob("  1990-05-12\n"), Some(date(1990, 5, 12)));
    }

    #[test]
    fn test_other_layouts() {
        let expected = Some(date(1990, 5, 12));
        assert_eq!(normalize_dob("1990/05/12"), expected);
        assert_eq!(normalize_dob("05/12/1990"), expected);
        assert_eq!(normalize_dob("12.05.1990"), expected);
        assert_eq!(normalize_dob("19900512"), expected);
        assert_eq!(normalize_dob("May 12, 1990"), expected);
        assert_eq!(normalize_dob("12 May 1990"), expected);
        assert_eq!(normalize_dob("1990-05-12T08:30:00"), expected);
        assert_eq!(normalize_dob("1990-05-12 08:30:00.250"), expected);
        assert_eq!(normalize_dob("1990-05-12T08:30:00+02:00"), expected);
    }

    #[test]
    fn test_unparseable_becomes_none() {
        assert_eq!(normalize_dob(""), None);
        assert_eq!(normalize_dob("   "), None);
        assert_eq!(normalize_dob("not a date"), None);
        assert_eq!(normalize_dob("1990-02-30"), None);
        assert_eq!(normalize_dob("19901340"), None);
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        for raw in ["1990-05-12", "05/12/1990", "May 12, 1990", "2000-02-29"] {
            let once = normalize_dob(raw).unwrap();
            let twice = normalize_dob(&once.to_string()).unwrap();
            assert_eq!(once, twice, "drift for {raw}");
        }
    }

    #[test]
    fn test_normalize_keeps_other_fields() {
        let raw = RawPerson {
            name: "Ned".into(),
            id: "7".into(),
            dob: "garbage".into(),
            city: "Springfield".into(),
            ..RawPerson::default()
        };
        let record = normalize(raw);
        assert_eq!(record.name, "Ned");
        assert_eq!(record.id, "7");
        assert_eq!(record.city, "Springfield");
        assert_eq!(record.dob, None);
    }
}
