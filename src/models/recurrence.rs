//! Recurrence rule model
//!
//! Describes how often a template expense repeats. Date arithmetic lives in
//! `ledger::recurrence`; this module only holds the rule itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a recurring expense repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn unit_name(&self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::Yearly => "year",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Self::Daily),
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(Self::Yearly),
            other => Err(format!(
                "Unknown frequency '{}'. Use daily, weekly, monthly or yearly",
                other
            )),
        }
    }
}

/// A template describing how an expense repeats
///
/// `interval` is kept signed so that malformed stored data stays
/// representable; every consumer goes through [`RecurrenceRule::effective_interval`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,

    /// Repeat every N periods
    #[serde(default = "default_interval")]
    pub interval: i32,

    /// Last date on which an occurrence may fall (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

fn default_interval() -> i32 {
    1
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: i32) -> Self {
        Self {
            frequency,
            interval,
            end_date: None,
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily, 1)
    }

    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly, 1)
    }

    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly, 1)
    }

    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly, 1)
    }

    /// Set the inclusive end date
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// The interval actually used for date arithmetic; never below 1
    pub fn effective_interval(&self) -> u32 {
        if self.interval < 1 {
            1
        } else {
            self.interval as u32
        }
    }

    /// Human-readable description, e.g. "Monthly" or "Every 2 weeks until 2025-06-30"
    pub fn describe(&self) -> String {
        let interval = self.effective_interval();
        let base = if interval == 1 {
            self.frequency.to_string()
        } else {
            format!("Every {} {}s", interval, self.frequency.unit_name())
        };
        match self.end_date {
            Some(end) => format!("{} until {}", base, end.format("%Y-%m-%d")),
            None => base,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_interval_clamps_non_positive() {
        assert_eq!(RecurrenceRule::new(Frequency::Daily, 0).effective_interval(), 1);
        assert_eq!(RecurrenceRule::new(Frequency::Daily, -4).effective_interval(), 1);
        assert_eq!(RecurrenceRule::new(Frequency::Daily, 3).effective_interval(), 3);
    }

    #[test]
    fn test_describe() {
        assert_eq!(RecurrenceRule::monthly().describe(), "Monthly");
        assert_eq!(
            RecurrenceRule::new(Frequency::Weekly, 2).describe(),
            "Every 2 weeks"
        );
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(
            RecurrenceRule::yearly().until(end).describe(),
            "Yearly until 2025-06-30"
        );
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("w".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_missing_interval_defaults_to_one() {
        let rule: RecurrenceRule = serde_json::from_str(r#"{"frequency":"daily"}"#).unwrap();
        assert_eq!(rule.interval, 1);
        assert!(rule.end_date.is_none());
    }
}
