//! Country inference from ZIP codes.

use crate::models::PersonRecord;

/// Country assigned to records with a US-style ZIP code.
pub const INFERRED_COUNTRY: &str = "USA";

/// `true` for exactly five ASCII digits, nothing else.
pub fn is_us_zipcode(zipcode: &str) -> bool {
    zipcode.len() == 5 && zipcode.bytes().all(|b| b.is_ascii_digit())
}

/// Fill an empty country when the ZIP code looks American.
///
/// Returns `true` when the country was set.
pub fn infer_country(record: &mut PersonRecord) -> bool {
    if record.country.is_empty() && is_us_zipcode(&record.zipcode) {
        record.country = INFERRED_COUNTRY.to_string();
        true
    } else {
        false
    }
}

/// Apply [`infer_country`] to a batch. Returns the records and how many changed.
pub fn infer_countries(mut records: Vec<PersonRecord>) -> (Vec<PersonRecord>, usize) {
    let inferred = records.iter_mut().map(infer_country).filter(|&changed| changed).count();
    (records, inferred)
}
