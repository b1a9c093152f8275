use std::fmt;

use chrono::{DateTime, Days, Local, NaiveDate, TimeDelta, TimeZone};

/// Which photos of the library are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterSpec {
    #[default]
    All,
    /// Closed range of calendar days, both ends inclusive.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl FilterSpec {
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            FilterSpec::DateRange { start: end, end: start }
        } else {
            FilterSpec::DateRange { start, end }
        }
    }

    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let start = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self::date_range(start, today)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FilterSpec::DateRange { .. })
    }

    /// `start-of-day(start) <= created < start-of-day(end + 1)` in local time.
    pub fn matches(&self, created: &DateTime<Local>) -> bool {
        match self {
            FilterSpec::All => true,
            FilterSpec::DateRange { start, end } => {
                let lower = start_of_day(*start);
                let upper = end.succ_opt().map(start_of_day);
                let after_start = lower.map_or(true, |lower| *created >= lower);
                let before_end = upper.flatten().map_or(true, |upper| *created < upper);
                after_start && before_end
            }
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::All => write!(f, "All Photos"),
            FilterSpec::DateRange { start, end } => write!(f, "{start} to {end}"),
        }
    }
}

const STEP_MINUTES: i64 = 15;
const DAY_STEPS: i64 = 24 * 60 / STEP_MINUTES;

fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // A DST gap can swallow midnight; the day then starts where the gap ends.
    (0..DAY_STEPS).find_map(|step| {
        let local = midnight + TimeDelta::minutes(step * STEP_MINUTES);
        Local.from_local_datetime(&local).earliest()
    })
}

/// Choices offered by the filter sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPreset {
    #[default]
    AllPhotos,
    Last30Days,
    Custom,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 3] = [
        FilterPreset::AllPhotos,
        FilterPreset::Last30Days,
        FilterPreset::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterPreset::AllPhotos => "All Photos",
            FilterPreset::Last30Days => "Last 30 Days",
            FilterPreset::Custom => "Custom Date Range",
        }
    }

    /// Resolves the preset into a filter. Missing custom dates default to `today`.
    pub fn resolve(
        &self,
        today: NaiveDate,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> FilterSpec {
        match self {
            FilterPreset::AllPhotos => FilterSpec::All,
            FilterPreset::Last30Days => FilterSpec::last_days(today, 30),
            FilterPreset::Custom => {
                FilterSpec::date_range(start.unwrap_or(today), end.unwrap_or(today))
            }
        }
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}
