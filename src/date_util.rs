use chrono::{Datelike, Duration, NaiveDate};

/// Month abbreviations used as chart labels, in calendar order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Get the quarter (1-4) for a given date.
pub fn quarter_of(d: NaiveDate) -> u8 {
    ((d.month() - 1) / 3 + 1) as u8
}

/// Sunday-to-Saturday week containing `d`, both ends inclusive.
pub fn sunday_week_bounds(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = d.weekday().num_days_from_sunday() as i64;
    let start = d - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Zero-based month index (0 = January), for indexing [`MONTH_LABELS`].
pub fn month_index(d: NaiveDate) -> usize {
    d.month0() as usize
}
