use crate::error::{Result, TkError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// `d/M/yyyy` or `yyyy-MM-dd`, optionally followed by a 24-hour `HHmm` token.
static INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<day>[0-9]{1,2})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{4})|(?P<iso_year>[0-9]{4})-(?P<iso_month>[0-9]{2})-(?P<iso_day>[0-9]{2}))(?:\s+(?P<hour>[0-9]{2})(?P<minute>[0-9]{2}))?$",
    )
    .unwrap()
});

const DISPLAY_DATE: &str = "%b %d %Y";
const DISPLAY_DATE_TIME: &str = "%b %d %Y, %H:%M";

pub const INPUT_FORMATS_HELP: &str =
    "Use d/M/yyyy or yyyy-MM-dd, optionally followed by HHmm (e.g. 2025-02-20 1800)";

/// A calendar date with an optional time of day.
///
/// This is the single canonical representation for every date a task carries,
/// whichever input grammar produced it. Ordering is by date first, and a
/// date-only value sorts before the same date with a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct When {
    date: NaiveDate,
    time: Option<NaiveTime>,
}

impl When {
    pub fn new(date: NaiveDate, time: Option<NaiveTime>) -> Self {
        Self { date, time }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    /// Parse a date typed by the user in one of the accepted input grammars.
    ///
    /// The canonical display form (`Mar 05 2024`) is not an input grammar and
    /// is rejected here; use [`When::parse_canonical`] for stored dates.
    pub fn parse_input(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let caps = INPUT_RE
            .captures(raw)
            .ok_or_else(|| TkError::DateFormat(format!("'{}'. {}", raw, INPUT_FORMATS_HELP)))?;

        let (year, month, day) = match caps.name("year") {
            Some(year) => (year.as_str(), &caps["month"], &caps["day"]),
            None => (&caps["iso_year"], &caps["iso_month"], &caps["iso_day"]),
        };
        let date = calendar_date(raw, year, month, day)?;

        let time = match (caps.name("hour"), caps.name("minute")) {
            (Some(hour), Some(minute)) => Some(time_of_day(hour.as_str(), minute.as_str())?),
            _ => None,
        };

        Ok(Self { date, time })
    }

    /// Parse the canonical display form written by [`fmt::Display`].
    pub fn parse_canonical(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains(',') {
            NaiveDateTime::parse_from_str(s, DISPLAY_DATE_TIME)
                .map(|dt| Self::new(dt.date(), Some(dt.time())))
                .map_err(|e| TkError::DateFormat(format!("'{}' ({})", s, e)))
        } else {
            NaiveDate::parse_from_str(s, DISPLAY_DATE)
                .map(|date| Self::new(date, None))
                .map_err(|e| TkError::DateFormat(format!("'{}' ({})", s, e)))
        }
    }
}

/// Shorthand for [`When::parse_input`].
pub fn normalize(raw: &str) -> Result<When> {
    When::parse_input(raw)
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{}", self.date.and_time(time).format(DISPLAY_DATE_TIME)),
            None => write!(f, "{}", self.date.format(DISPLAY_DATE)),
        }
    }
}

fn calendar_date(raw: &str, year: &str, month: &str, day: &str) -> Result<NaiveDate> {
    let parsed = (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>());
    match parsed {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| TkError::DateFormat(format!("'{}' is not a calendar date", raw))),
        _ => Err(TkError::DateFormat(format!("'{}'. {}", raw, INPUT_FORMATS_HELP))),
    }
}

fn time_of_day(hour: &str, minute: &str) -> Result<NaiveTime> {
    let hour: u32 = hour
        .parse()
        .map_err(|_| TkError::DateFormat(format!("bad hour '{}'", hour)))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| TkError::DateFormat(format!("bad minute '{}'", minute)))?;
    if hour > 23 {
        return Err(TkError::DateFormat(format!("hour {} must be 00-23", hour)));
    }
    if minute > 59 {
        return Err(TkError::DateFormat(format!("minute {} must be 00-59", minute)));
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| TkError::DateFormat(format!("{:02}{:02} is not a time", hour, minute)))
}
