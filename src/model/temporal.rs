// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Precision-aware temporal types
//!
//! Dates, times and datetimes remember how much of their value was actually
//! written. Two values that agree up to the shorter precision but differ in
//! precision cannot be ordered, which is why [`compare`](PrecisionDate::compare)
//! returns an `Option`.

use std::cmp::Ordering;
use std::fmt;

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike,
};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while_m_n, take_while1},
    character::complete::{char, one_of},
    combinator::{all_consuming, map, map_res, opt},
    sequence::preceded,
};
use serde::{Deserialize, Serialize};

use super::error::{ModelError, ModelResult};

/// Precision levels for temporal values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum TemporalPrecision {
    /// Year precision (YYYY)
    Year,
    /// Month precision (YYYY-MM)
    Month,
    /// Day precision (YYYY-MM-DD)
    Day,
    /// Hour precision (THH)
    Hour,
    /// Minute precision (THH:MM)
    Minute,
    /// Second precision (THH:MM:SS)
    Second,
    /// Millisecond precision (THH:MM:SS.sss)
    Millisecond,
}

impl TemporalPrecision {
    fn index(self) -> usize {
        self as usize
    }
}

/// Calendar duration units usable in temporal arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    /// Years
    Year,
    /// Months
    Month,
    /// Weeks
    Week,
    /// Days
    Day,
    /// Hours
    Hour,
    /// Minutes
    Minute,
    /// Seconds
    Second,
    /// Milliseconds
    Millisecond,
}

impl CalendarUnit {
    /// Resolve a calendar keyword or its UCUM code
    pub fn from_unit(unit: &str) -> Option<Self> {
        match unit {
            "year" | "years" | "a" => Some(Self::Year),
            "month" | "months" | "mo" => Some(Self::Month),
            "week" | "weeks" | "wk" => Some(Self::Week),
            "day" | "days" | "d" => Some(Self::Day),
            "hour" | "hours" | "h" => Some(Self::Hour),
            "minute" | "minutes" | "min" => Some(Self::Minute),
            "second" | "seconds" | "s" => Some(Self::Second),
            "millisecond" | "milliseconds" | "ms" => Some(Self::Millisecond),
            _ => None,
        }
    }

    fn fixed_duration(self, amount: i64) -> Option<Duration> {
        match self {
            Self::Week => Duration::try_weeks(amount),
            Self::Day => Duration::try_days(amount),
            Self::Hour => Duration::try_hours(amount),
            Self::Minute => Duration::try_minutes(amount),
            Self::Second => Duration::try_seconds(amount),
            Self::Millisecond => Duration::try_milliseconds(amount),
            Self::Year | Self::Month => None,
        }
    }

    fn months(self, amount: i64) -> Option<i64> {
        match self {
            Self::Year => amount.checked_mul(12),
            Self::Month => Some(amount),
            _ => None,
        }
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    }
}

/// Compare component arrays up to the shorter precision
fn compare_components(
    left: &[i64; 7],
    left_precision: TemporalPrecision,
    right: &[i64; 7],
    right_precision: TemporalPrecision,
) -> Option<Ordering> {
    let common = left_precision.min(right_precision).index();
    for i in 0..=common {
        match left[i].cmp(&right[i]) {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    if left_precision == right_precision {
        Some(Ordering::Equal)
    } else {
        None
    }
}

/// Precision-aware date type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionDate {
    /// The actual date value, unspecified components set to their minimum
    pub date: NaiveDate,
    /// The precision of the original input
    pub precision: TemporalPrecision,
}

impl PrecisionDate {
    pub fn new(date: NaiveDate, precision: TemporalPrecision) -> Self {
        Self { date, precision }
    }

    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    pub fn parse(text: &str) -> ModelResult<Self> {
        let (_, parts) = all_consuming(date_parts)
            .parse(text)
            .map_err(|_| invalid(text))?;
        parts.build().ok_or_else(|| invalid(text))
    }

    /// Today's date in the local timezone
    pub fn today() -> Self {
        Self::new(Local::now().date_naive(), TemporalPrecision::Day)
    }

    fn components(&self) -> [i64; 7] {
        [
            i64::from(self.date.year()),
            i64::from(self.date.month()),
            i64::from(self.date.day()),
            0,
            0,
            0,
            0,
        ]
    }

    /// Read a single component, failing when the value is not that precise
    pub fn component(&self, precision: TemporalPrecision) -> ModelResult<i64> {
        if precision > self.precision || precision > TemporalPrecision::Day {
            return Err(ModelError::InvalidPrecision {
                requested: precision,
                available: self.precision,
            });
        }
        Ok(self.components()[precision.index()])
    }

    /// Order two dates; `None` when precision makes the answer uncertain
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        compare_components(
            &self.components(),
            self.precision,
            &other.components(),
            other.precision,
        )
    }

    /// Shift by a calendar amount; sub-day units are not applicable to dates
    pub fn add_calendar(&self, amount: i64, unit: CalendarUnit) -> Option<Self> {
        let date = match unit.months(amount) {
            Some(months) => shift_months(self.date, months)?,
            None => match unit {
                CalendarUnit::Week | CalendarUnit::Day => {
                    self.date.checked_add_signed(unit.fixed_duration(amount)?)?
                }
                _ => return None,
            },
        };
        Some(Self::new(date, self.precision))
    }
}

impl fmt::Display for PrecisionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            TemporalPrecision::Year => write!(f, "{}", self.date.format("%Y")),
            TemporalPrecision::Month => write!(f, "{}", self.date.format("%Y-%m")),
            _ => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

/// Precision-aware datetime type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionDateTime {
    /// The actual datetime value
    pub datetime: DateTime<FixedOffset>,
    /// The precision of the original input
    pub precision: TemporalPrecision,
}

impl PrecisionDateTime {
    pub fn new(datetime: DateTime<FixedOffset>, precision: TemporalPrecision) -> Self {
        Self {
            datetime,
            precision,
        }
    }

    /// Parse `YYYY[-MM[-DD]]T[HH[:MM[:SS[.fff]]]][Z|(+|-)HH:MM]`
    ///
    /// A missing offset is read as UTC.
    pub fn parse(text: &str) -> ModelResult<Self> {
        let (_, (date, time, offset)) = all_consuming(datetime_parts)
            .parse(text)
            .map_err(|_| invalid(text))?;
        let date_value = date.build().ok_or_else(|| invalid(text))?;
        let (naive_time, precision) = match time {
            Some(time) => {
                if date_value.precision != TemporalPrecision::Day {
                    return Err(invalid(text));
                }
                let t = time.build().ok_or_else(|| invalid(text))?;
                (t.time, t.precision)
            }
            None => (NaiveTime::MIN, date_value.precision),
        };
        let offset = FixedOffset::east_opt(offset.unwrap_or(0)).ok_or_else(|| invalid(text))?;
        let naive = NaiveDateTime::new(date_value.date, naive_time);
        let datetime = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| invalid(text))?;
        Ok(Self::new(datetime, precision))
    }

    /// The current instant in the local timezone
    pub fn now() -> Self {
        Self::new(Local::now().fixed_offset(), TemporalPrecision::Millisecond)
    }

    fn components(&self) -> [i64; 7] {
        // Values carrying a time are compared on the UTC timeline
        if self.precision >= TemporalPrecision::Hour {
            naive_fields(&self.datetime.naive_utc())
        } else {
            naive_fields(&self.datetime.naive_local())
        }
    }

    /// Read a single component as written, in the value's own offset
    ///
    /// Fails when the value is not that precise.
    pub fn component(&self, precision: TemporalPrecision) -> ModelResult<i64> {
        if precision > self.precision {
            return Err(ModelError::InvalidPrecision {
                requested: precision,
                available: self.precision,
            });
        }
        Ok(naive_fields(&self.datetime.naive_local())[precision.index()])
    }

    /// Order two datetimes; `None` when precision makes the answer uncertain
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        compare_components(
            &self.components(),
            self.precision,
            &other.components(),
            other.precision,
        )
    }

    /// Shift by a calendar amount
    pub fn add_calendar(&self, amount: i64, unit: CalendarUnit) -> Option<Self> {
        let datetime = match unit.months(amount) {
            Some(months) => {
                let date = shift_months(self.datetime.date_naive(), months)?;
                let naive = NaiveDateTime::new(date, self.datetime.time());
                self.datetime
                    .offset()
                    .from_local_datetime(&naive)
                    .single()?
            }
            None => self
                .datetime
                .checked_add_signed(unit.fixed_duration(amount)?)?,
        };
        Some(Self::new(datetime, self.precision))
    }
}

fn naive_fields(naive: &NaiveDateTime) -> [i64; 7] {
    [
        i64::from(naive.year()),
        i64::from(naive.month()),
        i64::from(naive.day()),
        i64::from(naive.hour()),
        i64::from(naive.minute()),
        i64::from(naive.second()),
        i64::from(naive.nanosecond() / 1_000_000),
    ]
}

impl fmt::Display for PrecisionDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match self.precision {
            TemporalPrecision::Year => "%YT",
            TemporalPrecision::Month => "%Y-%mT",
            TemporalPrecision::Day => "%Y-%m-%dT",
            TemporalPrecision::Hour => "%Y-%m-%dT%H%:z",
            TemporalPrecision::Minute => "%Y-%m-%dT%H:%M%:z",
            TemporalPrecision::Second => "%Y-%m-%dT%H:%M:%S%:z",
            TemporalPrecision::Millisecond => "%Y-%m-%dT%H:%M:%S%.3f%:z",
        };
        write!(f, "{}", self.datetime.format(pattern))
    }
}

/// Precision-aware time type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrecisionTime {
    /// The actual time value
    pub time: NaiveTime,
    /// The precision of the original input
    pub precision: TemporalPrecision,
}

impl PrecisionTime {
    pub fn new(time: NaiveTime, precision: TemporalPrecision) -> Self {
        Self { time, precision }
    }

    /// Parse `HH[:MM[:SS[.fff]]]`
    pub fn parse(text: &str) -> ModelResult<Self> {
        let (_, parts) = all_consuming(time_parts)
            .parse(text)
            .map_err(|_| invalid(text))?;
        parts.build().ok_or_else(|| invalid(text))
    }

    /// Current local time of day
    pub fn now() -> Self {
        Self::new(Local::now().time(), TemporalPrecision::Millisecond)
    }

    fn components(&self) -> [i64; 7] {
        [
            0,
            0,
            0,
            i64::from(self.time.hour()),
            i64::from(self.time.minute()),
            i64::from(self.time.second()),
            i64::from(self.time.nanosecond() / 1_000_000),
        ]
    }

    /// Read a single component, failing when the value is not that precise
    pub fn component(&self, precision: TemporalPrecision) -> ModelResult<i64> {
        if precision > self.precision || precision < TemporalPrecision::Hour {
            return Err(ModelError::InvalidPrecision {
                requested: precision,
                available: self.precision,
            });
        }
        Ok(self.components()[precision.index()])
    }

    /// Order two times; `None` when precision makes the answer uncertain
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        compare_components(
            &self.components(),
            self.precision,
            &other.components(),
            other.precision,
        )
    }

    /// Shift by a sub-day calendar amount, wrapping around midnight
    pub fn add_calendar(&self, amount: i64, unit: CalendarUnit) -> Option<Self> {
        match unit {
            CalendarUnit::Hour
            | CalendarUnit::Minute
            | CalendarUnit::Second
            | CalendarUnit::Millisecond => {
                let (time, _) = self
                    .time
                    .overflowing_add_signed(unit.fixed_duration(amount)?);
                Some(Self::new(time, self.precision))
            }
            _ => None,
        }
    }
}

impl fmt::Display for PrecisionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            TemporalPrecision::Hour => write!(f, "{}", self.time.format("%H")),
            TemporalPrecision::Minute => write!(f, "{}", self.time.format("%H:%M")),
            TemporalPrecision::Second => write!(f, "{}", self.time.format("%H:%M:%S")),
            _ => write!(f, "{}", self.time.format("%H:%M:%S%.3f")),
        }
    }
}

fn invalid(text: &str) -> ModelError {
    ModelError::InvalidTemporal {
        value: text.to_string(),
    }
}

struct DateParts {
    year: u32,
    month: Option<u32>,
    day: Option<u32>,
}

impl DateParts {
    fn build(&self) -> Option<PrecisionDate> {
        let (precision, month, day) = match (self.month, self.day) {
            (None, _) => (TemporalPrecision::Year, 1, 1),
            (Some(month), None) => (TemporalPrecision::Month, month, 1),
            (Some(month), Some(day)) => (TemporalPrecision::Day, month, day),
        };
        let date = NaiveDate::from_ymd_opt(i32::try_from(self.year).ok()?, month, day)?;
        Some(PrecisionDate::new(date, precision))
    }
}

struct TimeParts {
    hour: u32,
    minute: Option<u32>,
    second: Option<u32>,
    fraction: Option<String>,
}

impl TimeParts {
    fn build(&self) -> Option<PrecisionTime> {
        let millis = match &self.fraction {
            Some(digits) => {
                let mut padded: String = digits.chars().take(3).collect();
                while padded.len() < 3 {
                    padded.push('0');
                }
                padded.parse::<u32>().ok()
            }
            None => None,
        };
        let precision = match (self.minute, self.second, millis) {
            (None, _, _) => TemporalPrecision::Hour,
            (Some(_), None, _) => TemporalPrecision::Minute,
            (Some(_), Some(_), None) => TemporalPrecision::Second,
            (Some(_), Some(_), Some(_)) => TemporalPrecision::Millisecond,
        };
        let time = NaiveTime::from_hms_milli_opt(
            self.hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            millis.unwrap_or(0),
        )?;
        Some(PrecisionTime::new(time, precision))
    }
}

fn fixed_digits(input: &str, count: usize) -> IResult<&str, u32> {
    map_res(
        take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u32>(),
    )
    .parse(input)
}

fn two_digits(input: &str) -> IResult<&str, u32> {
    fixed_digits(input, 2)
}

fn four_digits(input: &str) -> IResult<&str, u32> {
    fixed_digits(input, 4)
}

fn date_parts(input: &str) -> IResult<&str, DateParts> {
    map(
        (
            four_digits,
            opt((
                preceded(char('-'), two_digits),
                opt(preceded(char('-'), two_digits)),
            )),
        ),
        |(year, rest)| DateParts {
            year,
            month: rest.map(|(month, _)| month),
            day: rest.and_then(|(_, day)| day),
        },
    )
    .parse(input)
}

fn time_parts(input: &str) -> IResult<&str, TimeParts> {
    map(
        (
            two_digits,
            opt((
                preceded(char(':'), two_digits),
                opt((
                    preceded(char(':'), two_digits),
                    opt(preceded(char('.'), take_while1(|c: char| c.is_ascii_digit()))),
                )),
            )),
        ),
        |(hour, rest)| {
            let minute = rest.as_ref().map(|(minute, _)| *minute);
            let seconds = rest.and_then(|(_, seconds)| seconds);
            TimeParts {
                hour,
                minute,
                second: seconds.map(|(second, _)| second),
                fraction: seconds.and_then(|(_, fraction)| fraction.map(str::to_string)),
            }
        },
    )
    .parse(input)
}

/// Offset in seconds east of UTC
fn offset_seconds(input: &str) -> IResult<&str, i32> {
    alt((
        map(char('Z'), |_| 0),
        map(
            (one_of("+-"), two_digits, char(':'), two_digits),
            |(sign, hours, _, minutes)| {
                let seconds = (hours * 3600 + minutes * 60) as i32;
                if sign == '-' { -seconds } else { seconds }
            },
        ),
    ))
    .parse(input)
}

fn datetime_parts(input: &str) -> IResult<&str, (DateParts, Option<TimeParts>, Option<i32>)> {
    (
        date_parts,
        preceded(char('T'), opt(time_parts)),
        opt(offset_seconds),
    )
        .parse(input)
}
