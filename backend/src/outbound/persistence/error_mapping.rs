//! Shared Diesel error classification for the repositories.
//!
//! Each repository turns a [`DieselFailure`] into its own port error; this
//! module only decides which bucket a driver error belongs to.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse outcome of a failed Diesel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection(&'static str),
    Query(&'static str),
    UniqueViolation { constraint: Option<String> },
}

/// Bucket a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        DieselError::DeserializationError(_) => {
            DieselFailure::Query("stored row could not be decoded")
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Collect converted rows, mapping the first conversion error through
/// `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Page bounds as SQL `OFFSET`/`LIMIT` values.
pub(crate) fn page_bounds(page: pagination::PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
    (offset, limit)
}

/// Row counts come back as `BIGINT`; negatives cannot happen.
pub(crate) fn total_from_db(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
