//! Lookback periods and bar intervals in the market-data provider's vocabulary.
//!
//! Periods look like `5d`, `6mo`, `2y`, `ytd`, `max`; intervals like `1d`,
//! `1wk`, `1mo`, `15m`, `1h`.

use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u32),
    Weeks(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Lookback {
    /// First date kept when the newest bar is dated `end`. `None` keeps everything.
    ///
    /// The window counts `end` itself, so `5d` spans five calendar dates and
    /// `1mo` ending 2024-03-31 starts on 2024-03-01.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        let boundary = match *self {
            Lookback::Days(n) => end.checked_sub_days(Days::new(n as u64)),
            Lookback::Weeks(n) => end.checked_sub_days(Days::new(n as u64 * 7)),
            Lookback::Months(n) => end.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::YearToDate => return NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Lookback::Max => return None,
        };
        // Out of the calendar range: nothing to cut.
        boundary.and_then(|d| d.checked_add_days(Days::new(1)))
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "ytd" => return Ok(Lookback::YearToDate),
            "max" => return Ok(Lookback::Max),
            _ => {}
        }
        let (count, unit) = split_count(&s)?;
        match unit {
            "d" => Ok(Lookback::Days(count)),
            "wk" => Ok(Lookback::Weeks(count)),
            "mo" => Ok(Lookback::Months(count)),
            "y" => Ok(Lookback::Years(count)),
            _ => Err(format!("unknown period unit '{}' in '{}'", unit, s)),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Weeks(n) => write!(f, "{}wk", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::YearToDate => write!(f, "ytd"),
            Lookback::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl Interval {
    pub fn is_daily(&self) -> bool {
        *self == Interval::Days(1)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (count, unit) = split_count(&s)?;
        match unit {
            "m" => Ok(Interval::Minutes(count)),
            "h" => Ok(Interval::Hours(count)),
            "d" => Ok(Interval::Days(count)),
            "wk" => Ok(Interval::Weeks(count)),
            "mo" => Ok(Interval::Months(count)),
            _ => Err(format!("unknown interval unit '{}' in '{}'", unit, s)),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minutes(n) => write!(f, "{}m", n),
            Interval::Hours(n) => write!(f, "{}h", n),
            Interval::Days(n) => write!(f, "{}d", n),
            Interval::Weeks(n) => write!(f, "{}wk", n),
            Interval::Months(n) => write!(f, "{}mo", n),
        }
    }
}

fn split_count(s: &str) -> Result<(u32, &str), String> {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return Err(format!("expected a leading count in '{}'", s));
    }
    let count: u32 = s[..digits]
        .parse()
        .map_err(|e| format!("invalid count in '{}': {}", s, e))?;
    if count == 0 {
        return Err(format!("count must be positive in '{}'", s));
    }
    Ok((count, &s[digits..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_periods() {
        assert_eq!("2y".parse::<Lookback>().unwrap(), Lookback::Years(2));
        assert_eq!("6mo".parse::<Lookback>().unwrap(), Lookback::Months(6));
        assert_eq!("5d".parse::<Lookback>().unwrap(), Lookback::Days(5));
        assert_eq!("1wk".parse::<Lookback>().unwrap(), Lookback::Weeks(1));
        assert_eq!("YTD".parse::<Lookback>().unwrap(), Lookback::YearToDate);
        assert_eq!("max".parse::<Lookback>().unwrap(), Lookback::Max);
    }

    #[test]
    fn reject_bad_periods() {
        assert!("".parse::<Lookback>().is_err());
        assert!("y".parse::<Lookback>().is_err());
        assert!("0y".parse::<Lookback>().is_err());
        assert!("3q".parse::<Lookback>().is_err());
    }

    #[test]
    fn period_display_round_trips_text() {
        for text in ["2y", "6mo", "5d", "1wk", "ytd", "max"] {
            assert_eq!(text.parse::<Lookback>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn start_dates() {
        let end = d(2024, 3, 31);
        assert_eq!(Lookback::Years(2).start_date(end), Some(d(2022, 4, 1)));
        assert_eq!(Lookback::Months(1).start_date(end), Some(d(2024, 3, 1)));
        assert_eq!(Lookback::Days(10).start_date(end), Some(d(2024, 3, 22)));
        assert_eq!(Lookback::Weeks(2).start_date(end), Some(d(2024, 3, 18)));
        assert_eq!(Lookback::YearToDate.start_date(end), Some(d(2024, 1, 1)));
        assert_eq!(Lookback::Max.start_date(end), None);
    }

    #[test]
    fn day_window_counts_the_end_date() {
        let end = d(2024, 1, 20);
        assert_eq!(Lookback::Days(1).start_date(end), Some(end));
        assert_eq!(Lookback::Days(5).start_date(end), Some(d(2024, 1, 16)));
        assert_eq!(Lookback::Weeks(1).start_date(end), Some(d(2024, 1, 14)));
    }

    #[test]
    fn month_window_ending_mid_month() {
        let end = d(2024, 5, 15);
        assert_eq!(Lookback::Months(3).start_date(end), Some(d(2024, 2, 16)));
        assert_eq!(Lookback::Years(1).start_date(end), Some(d(2023, 5, 16)));
    }

    #[test]
    fn parse_intervals() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Days(1));
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weeks(1));
        assert_eq!("15m".parse::<Interval>().unwrap(), Interval::Minutes(15));
        assert_eq!("1h".parse::<Interval>().unwrap(), Interval::Hours(1));
        assert_eq!("3mo".parse::<Interval>().unwrap(), Interval::Months(3));
        assert!("daily".parse::<Interval>().is_err());
    }

    #[test]
    fn only_one_day_is_daily() {
        assert!(Interval::Days(1).is_daily());
        assert!(!Interval::Days(5).is_daily());
        assert!(!Interval::Weeks(1).is_daily());
    }
}
