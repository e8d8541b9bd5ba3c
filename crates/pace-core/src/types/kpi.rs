use crate::error::KpiError;
use crate::types::ids::UserId;
use crate::types::task::Task;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Years a range may span; stored timestamps are four-digit-year RFC 3339.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, KpiError> {
        for day in [start, end] {
            if !YEARS.contains(&day.year()) {
                return Err(KpiError::InvalidDate {
                    value: day.to_string(),
                });
            }
        }
        if start > end {
            return Err(KpiError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, KpiError> {
        Self::new(parse_day(start)?, parse_day(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last representable millisecond of the end day.
    pub fn end_at(&self) -> DateTime<Utc> {
        self.end
            .and_hms_milli_opt(23, 59, 59, 999)
            .map_or_else(|| self.start_at(), |last| last.and_utc())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_at() && at <= self.end_at()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_to_{}", self.start, self.end)
    }
}

fn parse_day(value: &str) -> Result<NaiveDate, KpiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| KpiError::InvalidDate {
        value: value.to_string(),
    })
}

/// A KPI percentage in `[0, 100]`, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);

    pub fn from_ratio(numerator: f64, denominator: f64) -> Self {
        if denominator <= 0.0 {
            return Self::ZERO;
        }
        let percent = (100.0 * numerator / denominator).clamp(0.0, 100.0);
        Self((percent * 100.0).round() / 100.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:.2}", self.0))
    }
}

/// How a task set was scored, alongside the score itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: Score,
    pub numerator: f64,
    pub denominator: f64,
    pub on_time: u32,
    pub late: u32,
    pub overdue: u32,
    pub pending: u32,
}

impl ScoreBreakdown {
    pub fn task_count(&self) -> u32 {
        self.on_time + self.late + self.overdue + self.pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserScore {
    pub user_id: UserId,
    pub username: String,
    pub score: Score,
}

/// One user's tasks over a period together with their score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedKpi {
    pub range: DateRange,
    pub tasks: Vec<Task>,
    pub breakdown: ScoreBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_covers_whole_end_day() {
        let range = DateRange::parse("2024-03-01", "2024-03-31").unwrap();
        let late_on_last_day = "2024-03-31T23:59:00Z".parse::<DateTime<Utc>>().unwrap();
        let next_day = "2024-04-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(range.contains(range.start_at()));
        assert!(range.contains(late_on_last_day));
        assert!(!range.contains(next_day));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = DateRange::parse("2024-04-02", "2024-04-01").unwrap_err();
        assert!(matches!(err, KpiError::InvalidRange { .. }));
    }

    #[test]
    fn malformed_day_is_rejected() {
        let err = DateRange::parse("2024-13-01", "2024-12-31").unwrap_err();
        assert!(matches!(err, KpiError::InvalidDate { .. }));
    }

    #[test]
    fn far_future_day_is_rejected() {
        let err = DateRange::parse("2024-01-01", "+262142-12-31").unwrap_err();
        assert!(matches!(err, KpiError::InvalidDate { .. }));
        let err = DateRange::parse("0000-01-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, KpiError::InvalidDate { .. }));
    }

    #[test]
    fn last_supported_day_ends_at_its_final_millisecond() {
        let range = DateRange::parse("9999-12-01", "9999-12-31").unwrap();
        assert_eq!(
            range.end_at(),
            "9999-12-31T23:59:59.999Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn range_formats_as_filename_fragment() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.to_string(), "2024-01-01_to_2024-01-31");
    }

    #[test]
    fn score_rounds_to_two_decimals() {
        assert_eq!(Score::from_ratio(1.0, 3.0).value(), 33.33);
        assert_eq!(Score::from_ratio(2.0, 3.0).to_string(), "66.67");
        assert_eq!(Score::from_ratio(0.0, 0.0), Score::ZERO);
    }
}
