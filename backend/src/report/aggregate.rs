//! Age classification and per-city aggregation.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::logs::{log_info_indent, log_warning};
use crate::models::{AgePolicy, Category, CityCounts, ClassifiedPerson, PersonRecord};

/// Adult/child counts keyed by city, in lexicographic city order.
pub type CityReport = BTreeMap<String, CityCounts>;

/// Rounded mean age keyed by city.
pub type CityAverages = BTreeMap<String, i64>;

/// Derive age and category for one record.
///
/// Returns `None` when the record has no date of birth.
pub fn classify(record: PersonRecord, today: NaiveDate, policy: AgePolicy) -> Option<ClassifiedPerson> {
    let dob = record.dob?;
    let age = policy.age_on(dob, today);
    Some(ClassifiedPerson {
        record,
        age,
        category: Category::for_age(age),
    })
}

/// Classify every record and count adults and children per city.
///
/// Logs one `City: …, Adults: …, Children: …` line per city. Records
/// without a birth date are skipped with a warning.
pub fn classify_and_count(
    records: Vec<PersonRecord>,
    today: NaiveDate,
    policy: AgePolicy,
) -> (CityReport, Vec<ClassifiedPerson>) {
    let total = records.len();
    let classified: Vec<ClassifiedPerson> = records
        .into_iter()
        .filter_map(|r| classify(r, today, policy))
        .collect();

    if classified.len() < total {
        log_warning(format!(
            "{} record(s) without a birth date skipped",
            total - classified.len()
        ));
    }

    let report = count_by_city(&classified);
    for (city, counts) in &report {
        log_info_indent(
            format!("City: {}, Adults: {}, Children: {}", city, counts.adult, counts.child),
            1,
        );
    }

    (report, classified)
}

/// Count categories per city.
pub fn count_by_city(people: &[ClassifiedPerson]) -> CityReport {
    let mut report = CityReport::new();
    for person in people {
        report
            .entry(person.city().to_string())
            .or_default()
            .add(person.category);
    }
    report
}

/// Mean age per city, rounded half away from zero.
pub fn average_age_by_city(people: &[ClassifiedPerson]) -> CityAverages {
    let mut sums: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for person in people {
        let entry = sums.entry(person.city()).or_default();
        entry.0 += u64::from(person.age);
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(city, (sum, count))| {
            let mean = sum as f64 / count as f64;
            (city.to_string(), mean.round() as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn person(city: &str, dob: NaiveDate) -> PersonRecord {
        PersonRecord {
            name: "N".into(),
            id: "1".into(),
            dob: Some(dob),
            street: "S".into(),
            city: city.into(),
            state: "ST".into(),
            zipcode: "12345".into(),
            country: "USA".into(),
        }
    }

    fn aged(city: &str, years: i32) -> PersonRecord {
        let t = today();
        person(city, NaiveDate::from_ymd_opt(t.year() - years, 1, 1).unwrap())
    }

    #[test]
    fn test_adult_boundary_exactly_eighteen() {
        let dob = NaiveDate::from_ymd_opt(2008, 10, 19).unwrap();
        let c = classify(person("X", dob), today(), AgePolicy::Calendar).unwrap();
        assert_eq!(c.age, 18);
        assert_eq!(c.category, Category::Adult);
    }

    #[test]
    fn test_one_day_short_is_child() {
        let dob = NaiveDate::from_ymd_opt(2008, 10, 20).unwrap();
        let c = classify(person("X", dob), today(), AgePolicy::Calendar).unwrap();
        assert_eq!(c.age, 17);
        assert_eq!(c.category, Category::Child);
    }

    #[test]
    fn test_classify_without_dob() {
        let r = PersonRecord { dob: None, ..aged("X", 30) };
        assert!(classify(r, today(), AgePolicy::Calendar).is_none());
    }

    #[test]
    fn test_counts_and_averages_by_city() {
        let records = vec![
            aged("Springfield", 10),
            aged("Springfield", 30),
            aged("Shelbyville", 20),
            aged("Shelbyville", 25),
        ];

        let (report, classified) = classify_and_count(records, today(), AgePolicy::Calendar);
        assert_eq!(report["Springfield"], CityCounts { adult: 1, child: 1 });
        assert_eq!(report["Shelbyville"], CityCounts { adult: 2, child: 0 });

        let averages = average_age_by_city(&classified);
        assert_eq!(averages["Springfield"], 20);
        // 22.5 rounds up
        assert_eq!(averages["Shelbyville"], 23);
    }

    #[test]
    fn test_totals_match_record_count() {
        let records: Vec<PersonRecord> = (0..40)
            .map(|i| aged(["A", "B", "C"][i % 3], (i * 2) as i32))
            .collect();

        let (report, classified) = classify_and_count(records, today(), AgePolicy::Days365);
        let total: usize = report.values().map(|c| c.total()).sum();
        assert_eq!(total, 40);
        assert_eq!(classified.len(), 40);
    }

    #[test]
    fn test_cities_are_sorted() {
        let records = vec![aged("Zeta", 40), aged("Alpha", 40), aged("Mu", 40)];
        let (report, _) = classify_and_count(records, today(), AgePolicy::Calendar);
        let cities: Vec<&str> = report.keys().map(String::as_str).collect();
        assert_eq!(cities, vec!["Alpha", "Mu", "Zeta"]);
    }

    #[test]
    fn test_empty_input_gives_empty_results() {
        let (report, classified) = classify_and_count(Vec::new(), today(), AgePolicy::Calendar);
        assert!(report.is_empty());
        assert!(classified.is_empty());
        assert!(average_age_by_city(&classified).is_empty());
    }
}
