//! Timestamp utilities

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Today's calendar date in the server's local timezone
///
/// Start dates are entered as local calendar dates, so the "not in the
/// future" rule compares against the local day rather than the UTC one.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
