//! Repository utilities.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use diesel_async::RunQueryDsl;

use super::pool::{AsyncSqliteConnection, DieselError};

/// Simple error info wrapper for database errors.
#[derive(Debug)]
pub struct DbErrorInfo(pub String);

impl DatabaseErrorInformation for DbErrorInfo {
    fn message(&self) -> &str {
        &self.0
    }
    fn details(&self) -> Option<&str> {
        None
    }
    fn hint(&self) -> Option<&str> {
        None
    }
    fn table_name(&self) -> Option<&str> {
        None
    }
    fn column_name(&self) -> Option<&str> {
        None
    }
    fn constraint_name(&self) -> Option<&str> {
        None
    }
    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Convert any displayable error to a diesel error with proper message.
pub fn to_diesel_error(e: impl std::fmt::Display) -> DieselError {
    DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(DbErrorInfo(e.to_string())))
}

/// Whether an error is a UNIQUE constraint violation.
pub fn is_unique_violation(e: &DieselError) -> bool {
    matches!(
        e,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

#[derive(diesel::QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt, column_name = "last_insert_rowid()")]
    id: i64,
}

/// Row id of the last insert made on this connection.
pub async fn last_insert_id(conn: &mut AsyncSqliteConnection) -> Result<i32, DieselError> {
    diesel::sql_query("SELECT last_insert_rowid()")
        .get_result::<LastInsertRowId>(conn)
        .await
        .map(|r| r.id as i32)
}

/// Fixed-width UTC timestamp so stored values sort lexically.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_datetime_round_trip_and_ordering() {
        let a = Utc.with_ymd_and_hms(2024, 5, 17, 10, 0, 0).unwrap();
        let b = a + Duration::milliseconds(1500);

        let (sa, sb) = (format_datetime(a), format_datetime(b));
        assert_eq!(sa, "2024-05-17T10:00:00.000000Z");
        assert!(sa < sb);
        assert_eq!(parse_datetime(&sb), b);
        assert_eq!(parse_datetime("garbage"), DateTime::UNIX_EPOCH);
    }
}
