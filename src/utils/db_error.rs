//! Helpers for classifying database errors.

/// Whether `e` is a unique violation raised by the named constraint or index.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_never_match() {
        assert!(!is_unique_violation_on(
            &sqlx::Error::RowNotFound,
            "fee_periods_year_semester_key"
        ));
    }
}
