// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod messages;
pub mod reviews;
pub mod sessions;
pub mod users;

use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 with millisecond precision, the canonical TEXT form.
pub(crate) fn ts_to_sql(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn opt_ts_to_sql(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(ts_to_sql)
}

pub(crate) fn ts_from_sql(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

pub(crate) fn opt_ts_from_sql(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| ts_from_sql(idx, v)).transpose()
}

/// Parse a closed enum stored as its lowercase string form.
pub(crate) fn enum_from_sql<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
