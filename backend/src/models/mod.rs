//! Domain models for the census pipeline.
//!
//! Records move through three shapes, one per stage boundary:
//!
//! - [`RawPerson`] - eight strings exactly as extracted from XML
//! - [`PersonRecord`] - `dob` coerced to a date, country possibly inferred
//! - [`ClassifiedPerson`] - a valid record enriched with age and [`Category`]
//!
//! Aggregates:
//!
//! - [`CityCounts`] - adult/child counts for one city
//! - [`AgePolicy`] - how completed years are derived from a birth date

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Age from which a person counts as an adult.
pub const ADULT_AGE: u32 = 18;

// =============================================================================
// Raw Person (extractor output)
// =============================================================================

/// One `<person>` element, flattened. Missing elements are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPerson {
    pub name: String,
    pub id: String,
    pub dob: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

// =============================================================================
// Person Record (normalized)
// =============================================================================

/// A person after date coercion.
///
/// `dob` is `None` when the source string was empty or unparseable. Empty
/// strings mark every other absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: String,
    pub id: String,
    pub dob: Option<NaiveDate>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl PersonRecord {
    /// String fields paired with their names, in document order.
    pub fn text_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("name", &self.name),
            ("id", &self.id),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipcode", &self.zipcode),
            ("country", &self.country),
        ]
    }
}

// =============================================================================
// Category
// =============================================================================

/// Adult or child, decided by [`ADULT_AGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Adult,
    Child,
}

impl Category {
    /// Category for a given age in completed years.
    pub fn for_age(age: u32) -> Self {
        if age >= ADULT_AGE {
            Category::Adult
        } else {
            Category::Child
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Adult => "Adult",
            Category::Child => "Child",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Age Policy
// =============================================================================

/// How completed years are computed from a birth date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AgePolicy {
    /// Completed calendar years: the birthday must have been reached this year.
    #[default]
    Calendar,
    /// `floor(days / 365)`, ignoring leap days.
    Days365,
}

impl AgePolicy {
    /// Age on `today` of someone born on `dob`. Birth dates in the future give 0.
    pub fn age_on(&self, dob: NaiveDate, today: NaiveDate) -> u32 {
        if dob > today {
            return 0;
        }
        match self {
            AgePolicy::Calendar => {
                let mut years = today.year() - dob.year();
                if (today.month(), today.day()) < (dob.month(), dob.day()) {
                    years -= 1;
                }
                years.max(0) as u32
            }
            AgePolicy::Days365 => ((today - dob).num_days() / 365) as u32,
        }
    }
}

// =============================================================================
// Classified Person
// =============================================================================

/// A valid record with its derived age and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPerson {
    #[serde(flatten)]
    pub record: PersonRecord,
    pub age: u32,
    pub category: Category,
}

impl ClassifiedPerson {
    pub fn city(&self) -> &str {
        &self.record.city
    }
}

// =============================================================================
// City Counts
// =============================================================================

/// Adult and child counts for one city.
///
/// Serializes as `{"Adult": n, "Child": m}`; a zero count is written, not omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCounts {
    #[serde(rename = "Adult")]
    pub adult: usize,
    #[serde(rename = "Child")]
    pub child: usize,
}

impl CityCounts {
    pub fn add(&mut self, category: Category) {
        match category {
            Category::Adult => self.adult += 1,
            Category::Child => self.child += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.adult + self.child
    }
}

// =============================================================================
// Tests
// =============================================================================
