//! `YYYY-MM` month keys used for bucketing documents and reports

use crate::error::{Result, SkillTrendsError};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SkillTrendsError::InvalidMonth(format!("{}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn from_datetime(timestamp: &DateTime<Utc>) -> Self {
        Self::from_date(timestamp.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Short label such as "Jan 2025"
    pub fn label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// The `count` months ending at (and including) `self`, oldest first
    pub fn window(&self, count: usize) -> Vec<MonthKey> {
        let mut months = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            months.push(current);
            current = current.previous();
        }
        months.reverse();
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = SkillTrendsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SkillTrendsError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = SkillTrendsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let key: MonthKey = "2025-03".parse().unwrap();
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("2025-1".parse::<MonthKey>().is_err());
        assert!("25-01".parse::<MonthKey>().is_err());
        assert!("2025/01".parse::<MonthKey>().is_err());
        assert!("".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_previous_wraps_year() {
        let key: MonthKey = "2025-01".parse().unwrap();
        assert_eq!(key.previous().to_string(), "2024-12");
        assert_eq!(key.previous().next(), key);
    }

    #[test]
    fn test_month_boundaries() {
        let feb: MonthKey = "2024-02".parse().unwrap();
        assert_eq!(feb.first_day().to_string(), "2024-02-01");
        assert_eq!(feb.last_day().to_string(), "2024-02-29");

        let dec: MonthKey = "2025-12".parse().unwrap();
        assert_eq!(dec.last_day().to_string(), "2025-12-31");
        assert_eq!(dec.label(), "Dec 2025");
    }

    #[test]
    fn test_window_is_oldest_first() {
        let key: MonthKey = "2025-02".parse().unwrap();
        let window: Vec<String> = key.window(3).iter().map(|m| m.to_string()).collect();
        assert_eq!(window, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_serde_as_string() {
        let key: MonthKey = "2025-07".parse().unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-07\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
