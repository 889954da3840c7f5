//! Schedule arithmetic shared by task health, project progress and the dashboards.
//!
//! All calculations work on calendar dates; timestamps are reduced to their
//! UTC date first so partial days never produce off-by-one delays.

use chrono::{DateTime, NaiveDate, Utc};

/// Whole days `reference` falls after `due`, floored at zero.
pub fn delay_days(due: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - due).num_days().max(0)
}

/// [`delay_days`] for timestamps; the time of day is dropped.
pub fn delay_days_at(due: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    delay_days(due.date_naive(), reference.date_naive())
}

/// Percentage (0-100) of the `start..end` window elapsed by `today`.
///
/// 0 on or before `start`, 100 on or after `end`, linear in between.
pub fn expected_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    if today <= start {
        return 0.0;
    }
    if today >= end {
        return 100.0;
    }

    let total = (end - start).num_days() as f64;
    let elapsed = (today - start).num_days() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}
