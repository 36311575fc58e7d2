//! Borrow model and related types

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One lending event: who took which book and when it is due back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: i32,
    /// Borrowing account id, taken from the caller's token
    #[serde(rename = "user")]
    pub user_id: i32,
    #[serde(rename = "book")]
    pub book_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Create borrow request as sent by clients.
///
/// There is no `user` field: any value sent by the client is dropped during
/// deserialization and the borrower is bound from the caller's token.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateBorrow {
    /// Book ID
    #[serde(default)]
    pub book: Option<i32>,
    /// Due date (ISO 8601)
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Update borrow request (administrators only)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBorrow {
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Validated borrow ready for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBorrow {
    pub user_id: i32,
    pub book_id: i32,
    pub due_date: DateTime<Utc>,
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO 8601 timestamp into UTC.
///
/// Accepts `T` or a space between date and time, `Z` or a numeric offset,
/// optional seconds and fractional seconds. A timestamp without an offset is
/// taken to be UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let mut normalized = value.trim().replacen(' ', "T", 1);
    if let Some(local) = normalized.strip_suffix('Z') {
        normalized = format!("{}+00:00", local);
    }

    match DateTime::parse_from_rfc3339(&normalized) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => parse_lenient(&normalized).ok_or(e),
    }
}

fn parse_lenient(value: &str) -> Option<DateTime<Utc>> {
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            LOCAL_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_timestamp(&s)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", s, e)))
    })
    .transpose()
}
