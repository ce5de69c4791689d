// SPDX-FileCopyrightText: 2026 Hearth Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded expansion of a recurrence rule into concrete occurrences.
//!
//! Expansion happens in two layers. [`RuleCursor`] walks the raw rule sequence
//! on the wall clock of the base event, knowing nothing about windows or time
//! zones. [`Occurrences`] localises each candidate, applies `COUNT` and `UNTIL`
//! and keeps only the occurrences that overlap the query window.

use std::collections::VecDeque;

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc,
};

use crate::rule::{Frequency, RecurrenceRule};

/// Upper bound on the number of rule periods a single cursor will examine.
pub const MAX_ITERATIONS: usize = 10_000;

/// One concrete interval produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Raw, unfiltered candidate starts of a rule, in ascending wall-clock order.
///
/// No candidate precedes the base datetime. The base is the first candidate
/// only when it matches the rule: a weekly `BYDAY` list that omits the base
/// weekday, or a `BYMONTHDAY` other than the base day, starts later. Periods
/// whose target date does not exist (the 31st in a 30-day month, Feb 29 in a
/// common year) are skipped, not clamped. The cursor ends after
/// [`MAX_ITERATIONS`] periods or when the calendar range of `chrono` is
/// exceeded.
#[derive(Debug, Clone)]
pub struct RuleCursor {
    freq: Frequency,
    interval: u64,
    base: NaiveDateTime,
    /// Day offsets from Monday for weekly `BYDAY` rules, sorted ascending.
    weekday_offsets: Vec<u64>,
    month_day: u32,
    period: u64,
    pending: VecDeque<NaiveDateTime>,
    exhausted: bool,
}

/// What one rule period produced.
enum Period {
    Candidates(Vec<NaiveDateTime>),
    Skipped,
    OutOfRange,
}

impl RuleCursor {
    pub fn new(rule: &RecurrenceRule, base: NaiveDateTime) -> Self {
        let mut weekday_offsets: Vec<u64> = rule
            .by_day
            .iter()
            .map(|d| u64::from(d.num_days_from_monday()))
            .collect();
        weekday_offsets.sort_unstable();
        weekday_offsets.dedup();

        let month_day = if rule.by_month_day > 0 {
            u32::from(rule.by_month_day)
        } else {
            base.day()
        };

        Self {
            freq: rule.freq,
            interval: u64::from(rule.interval.max(1)),
            base,
            weekday_offsets,
            month_day,
            period: 0,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    fn at_base_time(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.base.time())
    }

    fn period_candidates(&self, k: u64) -> Period {
        let step = k * self.interval;
        let base_date = self.base.date();

        match self.freq {
            Frequency::Daily => match base_date.checked_add_days(Days::new(step)) {
                Some(date) => Period::Candidates(vec![self.at_base_time(date)]),
                None => Period::OutOfRange,
            },
            Frequency::Weekly if self.weekday_offsets.is_empty() => {
                match base_date.checked_add_days(Days::new(step * 7)) {
                    Some(date) => Period::Candidates(vec![self.at_base_time(date)]),
                    None => Period::OutOfRange,
                }
            }
            Frequency::Weekly => {
                let back = Days::new(u64::from(base_date.weekday().num_days_from_monday()));
                let Some(week_start) = base_date
                    .checked_sub_days(back)
                    .and_then(|monday| monday.checked_add_days(Days::new(step * 7)))
                else {
                    return Period::OutOfRange;
                };

                let mut candidates = Vec::with_capacity(self.weekday_offsets.len());
                for offset in &self.weekday_offsets {
                    let Some(date) = week_start.checked_add_days(Days::new(*offset)) else {
                        break;
                    };
                    let candidate = self.at_base_time(date);
                    if candidate >= self.base {
                        candidates.push(candidate);
                    }
                }
                if candidates.is_empty() {
                    Period::Skipped
                } else {
                    Period::Candidates(candidates)
                }
            }
            Frequency::Monthly => {
                let Some(months) = i64::try_from(step).ok().and_then(|s| {
                    (i64::from(base_date.year()) * 12 + i64::from(base_date.month0())).checked_add(s)
                }) else {
                    return Period::OutOfRange;
                };
                let Ok(year) = i32::try_from(months.div_euclid(12)) else {
                    return Period::OutOfRange;
                };
                // Always in 1..=12.
                let month = months.rem_euclid(12) as u32 + 1;
                self.dated(year, month, self.month_day)
            }
            Frequency::Yearly => {
                let Some(year) = i32::try_from(step)
                    .ok()
                    .and_then(|s| base_date.year().checked_add(s))
                else {
                    return Period::OutOfRange;
                };
                self.dated(year, base_date.month(), base_date.day())
            }
        }
    }

    /// Candidate on a calendar date, skipping dates the month does not have.
    fn dated(&self, year: i32, month: u32, day: u32) -> Period {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Period::OutOfRange;
        }
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => {
                let candidate = self.at_base_time(date);
                if candidate >= self.base {
                    Period::Candidates(vec![candidate])
                } else {
                    Period::Skipped
                }
            }
            None => Period::Skipped,
        }
    }
}

impl Iterator for RuleCursor {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(candidate) = self.pending.pop_front() {
                return Some(candidate);
            }
            if self.exhausted || self.period >= MAX_ITERATIONS as u64 {
                return None;
            }

            let k = self.period;
            self.period += 1;
            match self.period_candidates(k) {
                Period::Candidates(candidates) => self.pending.extend(candidates),
                Period::Skipped => {}
                Period::OutOfRange => self.exhausted = true,
            }
        }
    }
}

/// Pull iterator over the occurrences of a rule that overlap a window.
///
/// Yields in strictly ascending start order. `COUNT` is applied to the raw
/// rule sequence before window filtering, so occurrences before the window
/// still consume the count.
pub struct Occurrences<Tz: TimeZone> {
    cursor: RuleCursor,
    tz: Tz,
    duration: TimeDelta,
    count: u32,
    until: Option<DateTime<Utc>>,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    produced: u32,
    done: bool,
}

impl<Tz: TimeZone> Occurrences<Tz> {
    pub fn new<R: TimeZone>(
        rule: &RecurrenceRule,
        event_start: &DateTime<Tz>,
        event_end: &DateTime<Tz>,
        range_start: &DateTime<R>,
        range_end: &DateTime<R>,
    ) -> Self {
        let duration = event_end
            .clone()
            .signed_duration_since(event_start.clone())
            .max(TimeDelta::zero());

        Self {
            cursor: RuleCursor::new(rule, event_start.naive_local()),
            tz: event_start.timezone(),
            duration,
            count: rule.count,
            until: rule.until,
            range_start: range_start.with_timezone(&Utc),
            range_end: range_end.with_timezone(&Utc),
            produced: 0,
            done: false,
        }
    }
}

impl<Tz: TimeZone> Iterator for Occurrences<Tz> {
    type Item = Occurrence<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(naive) = self.cursor.next() else {
                self.done = true;
                break;
            };

            self.produced += 1;
            if self.count > 0 && self.produced > self.count {
                self.done = true;
                break;
            }

            let Some(start) = localize(&self.tz, naive) else {
                continue;
            };
            let start_utc = start.with_timezone(&Utc);
            if self.until.is_some_and(|until| start_utc > until) || start_utc >= self.range_end {
                self.done = true;
                break;
            }

            let Some(end) = start.clone().checked_add_signed(self.duration) else {
                self.done = true;
                break;
            };
            if end.with_timezone(&Utc) > self.range_start || start_utc >= self.range_start {
                return Some(Occurrence { start, end });
            }
        }
        None
    }
}

/// Lazily expands `rule` for the base event `[event_start, event_end)` over
/// the half-open window `[range_start, range_end)`.
pub fn occurrences<Tz: TimeZone, R: TimeZone>(
    rule: &RecurrenceRule,
    event_start: &DateTime<Tz>,
    event_end: &DateTime<Tz>,
    range_start: &DateTime<R>,
    range_end: &DateTime<R>,
) -> Occurrences<Tz> {
    Occurrences::new(rule, event_start, event_end, range_start, range_end)
}

/// Collects [`occurrences`] into a vector.
pub fn expand<Tz: TimeZone, R: TimeZone>(
    rule: &RecurrenceRule,
    event_start: &DateTime<Tz>,
    event_end: &DateTime<Tz>,
    range_start: &DateTime<R>,
    range_end: &DateTime<R>,
) -> Vec<Occurrence<Tz>> {
    occurrences(rule, event_start, event_end, range_start, range_end).collect()
}

/// Maps a wall-clock time into `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are moved forward one hour.
pub(crate) fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}
