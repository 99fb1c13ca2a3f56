//! Presence validation for normalized person records.
//!
//! The empty string is the canonical "missing" marker; a `dob` that failed
//! coercion counts as missing too. Records with any missing field are dropped,
//! the rest keep their relative order.
//!
//! # Example
//!
//! ```
//! use census::{drop_invalid, PersonRecord};
//!
//! let outcome = drop_invalid(vec![PersonRecord::default()]);
//! assert!(outcome.valid.is_empty());
//! assert_eq!(outcome.rejected[0].missing.len(), 8);
//! ```

use serde::Serialize;

use crate::models::PersonRecord;

/// A record dropped by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position in the extracted batch (0-based)
    pub index: usize,
    /// Source `id`, possibly empty
    pub id: String,
    /// Names of the absent fields
    pub missing: Vec<&'static str>,
}

/// Result of [`drop_invalid`].
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: Vec<PersonRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// Names of the fields absent from `record`, in document order.
pub fn missing_fields(record: &PersonRecord) -> Vec<&'static str> {
    let mut missing: Vec<&'static str> = Vec::new();
    let fields = record.text_fields();
    for (name, value) in &fields[..2] {
        if value.is_empty() {
            missing.push(*name);
        }
    }
    if record.dob.is_none() {
        missing.push("dob");
    }
    for (name, value) in &fields[2..] {
        if value.is_empty() {
            missing.push(*name);
        }
    }
    missing
}

/// `true` when no field is missing.
pub fn is_valid(record: &PersonRecord) -> bool {
    record.dob.is_some() && record.text_fields().iter().all(|(_, v)| !v.is_empty())
}

/// Split a batch into valid records and rejections.
///
/// An all-invalid batch is not an error here.
pub fn drop_invalid(records: Vec<PersonRecord>) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for (index, record) in records.into_iter().enumerate() {
        let missing = missing_fields(&record);
        if missing.is_empty() {
            outcome.valid.push(record);
        } else {
            outcome.rejected.push(RejectedRecord {
                index,
                id: record.id.clone(),
                missing,
            });
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn complete(id: &str) -> PersonRecord {
        PersonRecord {
            name: "Marge Simpson".into(),
            id: id.into(),
            dob: NaiveDate::from_ymd_opt(1956, 3, 19),
            street: "742 Evergreen Terrace".into(),
            city: "Springfield".into(),
            state: "OR".into(),
            zipcode: "97403".into(),
            country: "USA".into(),
        }
    }

    #[test]
    fn test_complete_record_is_valid() {
        let r = complete("1");
        assert!(is_valid(&r));
        assert!(missing_fields(&r).is_empty());
    }

    #[test]
    fn test_missing_dob_is_invalid() {
        let r = PersonRecord { dob: None, ..complete("1") };
        assert!(!is_valid(&r));
        assert_eq!(missing_fields(&r), vec!["dob"]);
    }

    #[test]
    fn test_each_empty_field_invalidates() {
        for field in ["name", "id", "street", "city", "state", "zipcode", "country"] {
            let mut r = complete("1");
            match field {
                "name" => r.name.clear(),
                "id" => r.id.clear(),
                "street" => r.street.clear(),
                "city" => r.city.clear(),
                "state" => r.state.clear(),
                "zipcode" => r.zipcode.clear(),
                _ => r.country.clear(),
            }
            assert!(!is_valid(&r));
            assert_eq!(missing_fields(&r), vec![field]);
        }
    }

    #[test]
    fn test_whitespace_is_present() {
        let r = PersonRecord { state: " ".into(), ..complete("1") };
        assert!(is_valid(&r));
    }

    #[test]
    fn test_drop_invalid_preserves_order() {
        let batch = vec![
            complete("a"),
            PersonRecord { city: String::new(), ..complete("b") },
            complete("c"),
            PersonRecord { dob: None, country: String::new(), ..complete("d") },
            complete("e"),
        ];

        let outcome = drop_invalid(batch);
        let ids: Vec<&str> = outcome.valid.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);

        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].index, 1);
        assert_eq!(outcome.rejected[1].missing, vec!["dob", "country"]);
        assert!(outcome.valid.iter().all(is_valid));
    }

    #[test]
    fn test_all_invalid_is_empty_not_error() {
        let outcome = drop_invalid(vec![PersonRecord::default(), PersonRecord::default()]);
        assert!(outcome.valid.is_empty());
        assert_eq!(outcome.rejected.len(), 2);
    }
}
