// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed recurrence rules and their textual form.
//!
//! The grammar is a strict subset of iCalendar RRULE:
//!
//! ```text
//! rule := pair (";" pair)*
//! pair := KEY "=" VALUE
//! ```
//!
//! with keys `FREQ` (required), `INTERVAL`, `BYDAY`, `BYMONTHDAY`, `COUNT`
//! and `UNTIL`. Unknown keys are rejected rather than ignored.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use hearth_core::RuleParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Keys accepted by [`RecurrenceRule::parse`].
const KNOWN_KEYS: [&str; 6] = ["FREQ", "INTERVAL", "BYDAY", "BYMONTHDAY", "COUNT", "UNTIL"];

/// Two-letter weekday codes, in iCalendar order.
const WEEKDAY_CODES: [(Weekday, &str); 7] = [
    (Weekday::Sun, "SU"),
    (Weekday::Mon, "MO"),
    (Weekday::Tue, "TU"),
    (Weekday::Wed, "WE"),
    (Weekday::Thu, "TH"),
    (Weekday::Fri, "FR"),
    (Weekday::Sat, "SA"),
];

const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const UNTIL_DATE_FORMAT: &str = "%Y%m%d";

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn unit(self) -> &'static str {
        match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::Yearly => "year",
        }
    }

    fn adverb(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// Returns the two-letter code (`MO`, `TU`, …) for a weekday.
pub fn weekday_code(day: Weekday) -> &'static str {
    WEEKDAY_CODES
        .iter()
        .find(|(d, _)| *d == day)
        .map(|(_, code)| *code)
        .unwrap_or("MO")
}

/// Parses a two-letter weekday code. Codes are case-sensitive.
pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    WEEKDAY_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(d, _)| *d)
}

/// An immutable recurrence rule.
///
/// Invariants (checked by [`RecurrenceRule::validate`] and enforced by
/// [`RecurrenceRule::parse`]):
/// - `interval >= 1`
/// - at most one of `count > 0` and `until` is set
/// - `by_day` is empty unless `freq` is weekly
/// - `by_month_day` is zero unless `freq` is monthly, and never above 31
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    /// Weekdays in the order they were given. Only meaningful for weekly rules.
    pub by_day: Vec<Weekday>,
    /// Day of month in 1..=31, or 0 for "same day as the event start".
    pub by_month_day: u8,
    /// Total number of occurrences, or 0 for unbounded.
    pub count: u32,
    /// Inclusive upper bound on occurrence starts.
    pub until: Option<DateTime<Utc>>,
}

impl RecurrenceRule {
    /// A rule repeating every period of `freq` with no bounds.
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            by_day: Vec::new(),
            by_month_day: 0,
            count: 0,
            until: None,
        }
    }

    /// Parses rule text such as `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE`.
    pub fn parse(text: &str) -> Result<Self, RuleParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RuleParseError::Empty);
        }

        let mut freq = None;
        let mut rule = Self::new(Frequency::Daily);
        let mut seen = HashSet::new();

        for part in text.split(';') {
            let (key, value) = part
                .split_once('=')
                .filter(|(k, v)| !k.is_empty() && !v.is_empty())
                .ok_or_else(|| RuleParseError::MalformedPart {
                    part: part.to_string(),
                })?;

            if !KNOWN_KEYS.contains(&key) {
                return Err(RuleParseError::UnknownKey {
                    key: key.to_string(),
                });
            }
            if !seen.insert(key) {
                return Err(RuleParseError::DuplicateKey {
                    key: key.to_string(),
                });
            }

            match key {
                "FREQ" => {
                    freq = Some(Frequency::from_str(value).map_err(|_| {
                        RuleParseError::UnknownFreq {
                            value: value.to_string(),
                        }
                    })?);
                }
                "INTERVAL" => {
                    rule.interval =
                        parse_positive(value).ok_or_else(|| RuleParseError::InvalidInterval {
                            value: value.to_string(),
                        })?;
                }
                "BYDAY" => rule.by_day = parse_by_day(value)?,
                "BYMONTHDAY" => {
                    rule.by_month_day = parse_positive(value)
                        .filter(|day| *day <= 31)
                        .and_then(|day| u8::try_from(day).ok())
                        .ok_or_else(|| RuleParseError::InvalidMonthDay {
                            value: value.to_string(),
                        })?;
                }
                "COUNT" => {
                    rule.count =
                        parse_positive(value).ok_or_else(|| RuleParseError::InvalidCount {
                            value: value.to_string(),
                        })?;
                }
                "UNTIL" => rule.until = Some(parse_until(value)?),
                _ => {
                    return Err(RuleParseError::UnknownKey {
                        key: key.to_string(),
                    });
                }
            }
        }

        rule.freq = freq.ok_or(RuleParseError::MissingFreq)?;
        rule.validate()?;
        Ok(rule)
    }

    /// Checks the model invariants.
    pub fn validate(&self) -> Result<(), RuleParseError> {
        if self.interval == 0 {
            return Err(RuleParseError::InvalidInterval {
                value: "0".to_string(),
            });
        }
        if self.by_month_day > 31 {
            return Err(RuleParseError::InvalidMonthDay {
                value: self.by_month_day.to_string(),
            });
        }
        if self.count > 0 && self.until.is_some() {
            return Err(RuleParseError::ConflictingLimits);
        }
        if !self.by_day.is_empty() && self.freq != Frequency::Weekly {
            return Err(RuleParseError::ByDayRequiresWeekly);
        }
        if self.by_month_day != 0 && self.freq != Frequency::Monthly {
            return Err(RuleParseError::ByMonthDayRequiresMonthly);
        }
        Ok(())
    }

    /// A short English description, e.g. `Repeats weekly on Mon, Wed, Fri`.
    pub fn describe(&self) -> String {
        let mut text = if self.interval == 1 {
            format!("Repeats {}", self.freq.adverb())
        } else {
            format!("Repeats every {} {}s", self.interval, self.freq.unit())
        };

        if !self.by_day.is_empty() {
            let names: Vec<String> = self.by_day.iter().map(|d| d.to_string()).collect();
            text.push_str(" on ");
            text.push_str(&names.join(", "));
        }
        if self.by_month_day > 0 {
            text.push_str(&format!(" on day {}", self.by_month_day));
        }
        match self.count {
            0 => {}
            1 => text.push_str(", once"),
            n => text.push_str(&format!(", {n} times")),
        }
        if let Some(until) = self.until {
            text.push_str(&format!(", until {}", until.format("%b %-d, %Y")));
        }
        text
    }
}

impl fmt::Display for RecurrenceRule {
    /// Canonical text: FREQ, INTERVAL (only if > 1), BYDAY, BYMONTHDAY, COUNT, UNTIL.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq)?;
        if self.interval > 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if !self.by_day.is_empty() {
            let codes: Vec<&str> = self.by_day.iter().map(|d| weekday_code(*d)).collect();
            write!(f, ";BYDAY={}", codes.join(","))?;
        }
        if self.by_month_day > 0 {
            write!(f, ";BYMONTHDAY={}", self.by_month_day)?;
        }
        if self.count > 0 {
            write!(f, ";COUNT={}", self.count)?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format(UNTIL_FORMAT))?;
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RecurrenceRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecurrenceRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parses a strictly-decimal integer `>= 1` (no sign, no whitespace).
fn parse_positive(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Parses `MO,WE,FR`, keeping first-seen order and dropping repeats.
fn parse_by_day(value: &str) -> Result<Vec<Weekday>, RuleParseError> {
    let mut days = Vec::new();
    for code in value.split(',') {
        let day = parse_weekday_code(code).ok_or_else(|| RuleParseError::UnknownWeekday {
            code: code.to_string(),
        })?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Parses `YYYYMMDDTHHMMSSZ` or `YYYYMMDD` (midnight UTC).
fn parse_until(value: &str) -> Result<DateTime<Utc>, RuleParseError> {
    let invalid = || RuleParseError::InvalidUntil {
        value: value.to_string(),
    };
    match value.len() {
        16 => NaiveDateTime::parse_from_str(value, UNTIL_FORMAT)
            .map(|dt| dt.and_utc())
            .map_err(|_| invalid()),
        8 => NaiveDate::parse_from_str(value, UNTIL_DATE_FORMAT)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
