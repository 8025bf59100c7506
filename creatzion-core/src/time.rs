//! Time utilities: the wall-clock reference time a query is resolved against.

use anyhow::Result;
use chrono::{NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Current local time in an IANA timezone like "Asia/Kolkata"
pub fn local_now(tz: &str) -> Result<NaiveDateTime> {
    let tz = parse_timezone(tz)?;
    Ok(Utc::now().with_timezone(&tz).naive_local())
}

/// Parse an override like "2025-06-15 18:30" (or a bare "2025-06-15", read as
/// midnight). The timezone is validated so a bad config fails the same way
/// with or without an override.
pub fn parse_reference_time(local: &str, tz: &str) -> Result<NaiveDateTime> {
    parse_timezone(tz)?;
    let local = local.trim();
    NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(local, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{local}': {e}"))
}
