//! Time-bucket key formatting.
//!
//! All buckets are derived from the UTC date. The week number deliberately
//! uses the simple `ceil((days_since_jan1 + weekday_of_jan1 + 1) / 7)`
//! arithmetic (weekday counted from Sunday = 0) rather than the ISO-8601
//! Thursday rule: existing stored `weekly:` keys were produced by this
//! formula, so it is a storage compatibility contract.

use chrono::{DateTime, Datelike, Utc};

/// Day bucket, `YYYY-MM-DD`.
pub fn day_str(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Month bucket, `YYYY-MM`.
pub fn month_str(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Year bucket, `YYYY`.
pub fn year_str(at: DateTime<Utc>) -> String {
    format!("{:04}", at.year())
}

/// Week bucket, `YYYY-W##`, zero-padded to two digits.
pub fn week_str(at: DateTime<Utc>) -> String {
    let date = at.date_naive();
    let jan1 = date.with_ordinal(1).unwrap_or(date);
    let weekday_of_jan1 = jan1.weekday().num_days_from_sunday();
    let days_since_jan1 = date.ordinal0();
    let week = (days_since_jan1 + weekday_of_jan1 + 1).div_ceil(7);
    format!("{:04}-W{:02}", date.year(), week)
}
