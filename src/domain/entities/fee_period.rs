//! Fee period entity: one semester's billing cycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

/// Identifies a fee period by year and semester.
///
/// Ordering is chronological: `(2023, 2) < (2024, 1) < (2024, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PeriodKey {
    pub year: i32,
    pub semester: u8,
}

impl PeriodKey {
    /// Creates a key for years 1900..=9999 and semesters 1 and 2.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an out-of-range year or semester.
    pub fn new(year: i32, semester: u8) -> Result<Self, AppError> {
        if !(1900..=9999).contains(&year) {
            return Err(AppError::bad_request(
                "Year must be between 1900 and 9999",
                json!({ "year": year }),
            ));
        }
        if !(1..=2).contains(&semester) {
            return Err(AppError::bad_request(
                "Semester must be 1 or 2",
                json!({ "semester": semester }),
            ));
        }
        Ok(Self { year, semester })
    }

    /// The chronologically preceding period.
    ///
    /// Semester 1 of year Y follows semester 2 of year Y-1.
    pub fn previous(self) -> Self {
        match self.semester {
            1 => Self {
                year: self.year.saturating_sub(1),
                semester: 2,
            },
            _ => Self {
                year: self.year,
                semester: 1,
            },
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.semester)
    }
}

/// A persisted fee period.
///
/// `log_ids` lists the logs linked to this period in chronological order.
#[derive(Debug, Clone)]
pub struct FeePeriod {
    pub id: i64,
    pub year: i32,
    pub semester: u8,
    /// Due amount per member, in the smallest currency unit.
    pub amount: i64,
    /// Opening balance carried over from the previous period.
    pub carry_over: i64,
    pub log_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl FeePeriod {
    pub fn key(&self) -> PeriodKey {
        PeriodKey {
            year: self.year,
            semester: self.semester,
        }
    }
}

/// Input data for opening a new fee period.
#[derive(Debug, Clone)]
pub struct NewFeePeriod {
    pub key: PeriodKey,
    pub amount: i64,
    pub carry_over: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_wraps_year_boundary() {
        let first = PeriodKey::new(2024, 1).unwrap();
        assert_eq!(first.previous(), PeriodKey::new(2023, 2).unwrap());

        let second = PeriodKey::new(2024, 2).unwrap();
        assert_eq!(second.previous(), first);
    }

    #[test]
    fn test_invalid_semester_rejected() {
        assert!(matches!(
            PeriodKey::new(2024, 3),
            Err(AppError::Validation { .. })
        ));
        assert!(PeriodKey::new(2024, 0).is_err());
    }

    #[test]
    fn test_out_of_range_year_rejected() {
        assert!(matches!(
            PeriodKey::new(i32::MIN, 1),
            Err(AppError::Validation { .. })
        ));
        assert!(PeriodKey::new(1899, 2).is_err());
        assert!(PeriodKey::new(10_000, 1).is_err());

        let earliest = PeriodKey::new(1900, 1).unwrap();
        assert_eq!(earliest.previous().year, 1899);
    }

    #[test]
    fn test_keys_order_chronologically() {
        let a = PeriodKey::new(2023, 2).unwrap();
        let b = PeriodKey::new(2024, 1).unwrap();
        let c = PeriodKey::new(2024, 2).unwrap();
        assert!(a < b && b < c);
        assert_eq!(b.to_string(), "2024-1");
    }
}
