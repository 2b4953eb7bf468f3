//! Temporal literal parsing.
//!
//! Turns the date phrases users type (`today`, `3 days ago`, `monday`,
//! `2024-01-15 10:30`) into a [`NaiveDateTime`]. Relative phrases are
//! resolved against a fixed reference instant so that compiling the same
//! query twice yields the same output.

use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday,
};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s+(minute|hour|day|week|month|year)s?\s+(ago|from\s+now)$")
        .expect("relative phrase pattern is valid")
});

static MINUTES_AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\d+\s+minutes?\s+ago\s*$").expect("minutes-ago pattern is valid")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Parses temporal literals relative to a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalParser {
    reference: NaiveDateTime,
}

impl TemporalParser {
    /// Creates a parser that resolves relative phrases against `reference`.
    pub fn new(reference: NaiveDateTime) -> Self {
        Self { reference }
    }

    /// Creates a parser anchored at the local clock.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// The reference instant.
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// Returns true when `value` is an `N minutes ago` phrase.
    pub fn is_minutes_ago(value: &str) -> bool {
        MINUTES_AGO.is_match(value)
    }

    /// Parses `value`, returning `None` when it is not a temporal literal.
    pub fn parse(&self, value: &str) -> Option<NaiveDateTime> {
        let value = value.trim();
        if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let today = self.reference.date();
        match value.to_lowercase().as_str() {
            "today" => return Some(midnight(today)),
            "yesterday" => return today.pred_opt().map(midnight),
            "tomorrow" => return today.succ_opt().map(midnight),
            _ => {}
        }

        if let Ok(weekday) = value.parse::<Weekday>() {
            return Some(midnight(self.most_recent(weekday)));
        }

        if let Some(caps) = RELATIVE.captures(value) {
            let amount: i64 = caps[1].parse().ok()?;
            let unit = caps[2].to_lowercase();
            let past = caps[3].eq_ignore_ascii_case("ago");
            return self.shift(amount, &unit, past);
        }

        parse_literal(value)
    }

    /// The latest `weekday` on or before the reference date.
    fn most_recent(&self, weekday: Weekday) -> NaiveDate {
        let today = self.reference.date();
        let back = (today.weekday().num_days_from_monday() + 7 - weekday.num_days_from_monday()) % 7;
        today - TimeDelta::days(i64::from(back))
    }

    fn shift(&self, amount: i64, unit: &str, past: bool) -> Option<NaiveDateTime> {
        let sign = if past { -1 } else { 1 };
        match unit {
            "minute" => self
                .reference
                .checked_add_signed(TimeDelta::try_minutes(sign * amount)?),
            "hour" => self
                .reference
                .checked_add_signed(TimeDelta::try_hours(sign * amount)?),
            "day" | "week" => {
                let days = if unit == "week" { amount.checked_mul(7)? } else { amount };
                let date = self
                    .reference
                    .date()
                    .checked_add_signed(TimeDelta::try_days(sign * days)?)?;
                Some(midnight(date))
            }
            "month" | "year" => {
                let months = if unit == "year" {
                    amount.checked_mul(12)?
                } else {
                    amount
                };
                let months = Months::new(u32::try_from(months).ok()?);
                let date = if past {
                    self.reference.date().checked_sub_months(months)?
                } else {
                    self.reference.date().checked_add_months(months)?
                };
                Some(midnight(date))
            }
            _ => None,
        }
    }
}

impl Default for TemporalParser {
    fn default() -> Self {
        Self::now()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn parse_literal(value: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return Some(midnight(parsed));
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.naive_local())
}
