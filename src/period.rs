use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::date_util::{quarter_of, sunday_week_bounds};
use crate::error::{Error, Result};

/// Reporting window, always anchored on the calendar unit containing "now".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSelector {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodSelector {
    pub const ALL: [PeriodSelector; 5] = [
        PeriodSelector::Daily,
        PeriodSelector::Weekly,
        PeriodSelector::Monthly,
        PeriodSelector::Quarterly,
        PeriodSelector::Yearly,
    ];

    /// Parse a period name.
    ///
    /// Accepts `daily`, `weekly`, `monthly`, `quarterly`, `yearly` and the
    /// short forms `day`, `week`, `month`, `quarter`, `year`, case-insensitive.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(PeriodSelector::Daily),
            "weekly" | "week" => Ok(PeriodSelector::Weekly),
            "monthly" | "month" => Ok(PeriodSelector::Monthly),
            "quarterly" | "quarter" => Ok(PeriodSelector::Quarterly),
            "yearly" | "year" => Ok(PeriodSelector::Yearly),
            _ => Err(Error::PeriodParse(format!("unrecognized period: {s}"))),
        }
    }

    /// Canonical key, as used in config files and JSON output.
    pub fn to_key(&self) -> &'static str {
        match self {
            PeriodSelector::Daily => "daily",
            PeriodSelector::Weekly => "weekly",
            PeriodSelector::Monthly => "monthly",
            PeriodSelector::Quarterly => "quarterly",
            PeriodSelector::Yearly => "yearly",
        }
    }

    /// Human label for report headers.
    pub fn label(&self) -> &'static str {
        match self {
            PeriodSelector::Daily => "Daily",
            PeriodSelector::Weekly => "Weekly",
            PeriodSelector::Monthly => "Monthly",
            PeriodSelector::Quarterly => "Quarterly",
            PeriodSelector::Yearly => "Yearly",
        }
    }

    /// Whether calendar date `day` falls in this period's window around `today`.
    pub fn contains(&self, day: NaiveDate, today: NaiveDate) -> bool {
        match self {
            PeriodSelector::Daily => day == today,
            PeriodSelector::Weekly => {
                let (start, end) = sunday_week_bounds(today);
                day >= start && day <= end
            }
            PeriodSelector::Monthly => day.year() == today.year() && day.month() == today.month(),
            PeriodSelector::Quarterly => {
                day.year() == today.year() && quarter_of(day) == quarter_of(today)
            }
            PeriodSelector::Yearly => day.year() == today.year(),
        }
    }
}

impl FromStr for PeriodSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PeriodSelector::parse(s)
    }
}

impl std::fmt::Display for PeriodSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

/// Whether a subscription that started at `subscription_start` falls inside
/// `period` relative to `now`.
///
/// Calendar fields are read in `now`'s time zone, so callers pass
/// `Local::now()` to get local-calendar behaviour. A missing start never
/// matches.
pub fn compute_period_membership<Tz: TimeZone>(
    subscription_start: Option<&DateTime<Utc>>,
    period: PeriodSelector,
    now: &DateTime<Tz>,
) -> bool {
    let Some(start) = subscription_start else {
        return false;
    };
    let start_day = start.with_timezone(&now.timezone()).date_naive();
    period.contains(start_day, now.date_naive())
}

/// Reference instant for a report "as of" a calendar date: noon on that
/// date in `tz`.
///
/// Noon keeps the date stable across offset changes; if a transition makes
/// the wall-clock time ambiguous the earlier instant is used.
pub fn as_of_noon<Tz: TimeZone>(as_of: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let date = NaiveDate::parse_from_str(as_of.trim(), "%Y-%m-%d")
        .map_err(|e| Error::PeriodParse(format!("invalid as-of date '{as_of}': {e}")))?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| Error::PeriodParse(format!("invalid as-of date '{as_of}'")))?;
    tz.from_local_datetime(&noon)
        .earliest()
        .ok_or_else(|| {
            Error::PeriodParse(format!("as-of date '{as_of}' has no noon in this time zone"))
        })
}
