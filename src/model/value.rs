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

//! Primitive values flowing through evaluation
//!
//! [`PrimitiveValue`] is the closed set of scalar kinds. Comparison helpers
//! return `Option` so callers can tell "false" apart from "cannot tell", which
//! the evaluator turns into an empty result.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;
use super::temporal::{CalendarUnit, PrecisionDate, PrecisionDateTime, PrecisionTime};

/// Scalar value kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    /// Boolean value
    Boolean(bool),

    /// Integer value (64-bit signed)
    Integer(i64),

    /// Decimal value with arbitrary precision
    Decimal(Decimal),

    /// String value
    String(Arc<str>),

    /// Date value with precision information
    Date(PrecisionDate),

    /// DateTime value with timezone and precision information
    DateTime(PrecisionDateTime),

    /// Time value with precision information
    Time(PrecisionTime),

    /// Quantity value with unit
    Quantity(Arc<Quantity>),
}

impl PrimitiveValue {
    /// Create a string value
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::String(value.into())
    }

    /// Create a quantity value
    pub fn quantity(value: Quantity) -> Self {
        Self::Quantity(Arc::new(value))
    }

    /// Unqualified System type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
            Self::Time(_) => "Time",
            Self::Quantity(_) => "Quantity",
        }
    }

    /// Qualified System type name, e.g. `System.Integer`
    pub fn qualified_type_name(&self) -> String {
        format!("System.{}", self.type_name())
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of Integer and Decimal values
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_))
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date(_) | Self::DateTime(_) | Self::Time(_))
    }

    fn decimal_pair(&self, other: &Self) -> Option<(Decimal, Decimal)> {
        Some((self.as_decimal()?, other.as_decimal()?))
    }

    /// Read a string as the temporal kind its shape suggests
    fn coerce_temporal(text: &str) -> Option<Self> {
        if text.contains('T') {
            PrecisionDateTime::parse(text).ok().map(Self::DateTime)
        } else if text.contains(':') {
            PrecisionTime::parse(text).ok().map(Self::Time)
        } else {
            PrecisionDate::parse(text).ok().map(Self::Date)
        }
    }

    /// Ordering between temporal values
    ///
    /// The outer `None` means the pair is not temporally comparable at all;
    /// the inner `None` means precision leaves the answer open.
    fn temporal_order(&self, other: &Self) -> Option<Option<Ordering>> {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => Some(a.compare(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.compare(b)),
            (Self::Time(a), Self::Time(b)) => Some(a.compare(b)),
            (Self::Date(a), Self::DateTime(b)) => Some(date_as_datetime(a)?.compare(b)),
            (Self::DateTime(a), Self::Date(b)) => Some(a.compare(&date_as_datetime(b)?)),
            (Self::String(text), other) if other.is_temporal() => {
                Self::coerce_temporal(text)?.temporal_order(other)
            }
            (this, Self::String(text)) if this.is_temporal() => {
                this.temporal_order(&Self::coerce_temporal(text)?)
            }
            _ => None,
        }
    }

    /// Strict equality; `None` when temporal precision makes it undecidable
    pub fn fhir_equals(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => Some(a == b),
            (Self::String(a), Self::String(b)) => Some(a == b),
            (Self::Integer(a), Self::Integer(b)) => Some(a == b),
            (Self::Quantity(a), Self::Quantity(b)) => {
                Some(a.has_same_unit(b) && a.value == b.value)
            }
            _ => {
                if let Some(order) = self.temporal_order(other) {
                    return order.map(|o| o == Ordering::Equal);
                }
                match self.decimal_pair(other) {
                    Some((a, b)) => Some(a == b),
                    None => Some(false),
                }
            }
        }
    }

    /// Looser equivalence: case and whitespace insensitive strings,
    /// decimals compared at the lesser of the two precisions
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => normalize_string(a) == normalize_string(b),
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Quantity(a), Self::Quantity(b)) => a.equivalent(b),
            _ => {
                if let Some(order) = self.temporal_order(other) {
                    return order == Some(Ordering::Equal);
                }
                match self.decimal_pair(other) {
                    Some((a, b)) => {
                        let scale = a.scale().min(b.scale());
                        a.round_dp(scale) == b.round_dp(scale)
                    }
                    None => false,
                }
            }
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`; `None` when not comparable
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Quantity(a), Self::Quantity(b)) => a.compare(b),
            _ => match self.temporal_order(other) {
                Some(order) => order,
                None => {
                    let (a, b) = self.decimal_pair(other)?;
                    Some(a.cmp(&b))
                }
            },
        }
    }

    /// `+`: numeric addition, string concatenation, quantity and
    /// temporal-plus-duration arithmetic
    pub fn add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.checked_add(*b).map(Self::Integer),
            (Self::String(a), Self::String(b)) => Some(Self::string(format!("{a}{b}"))),
            (Self::Quantity(a), Self::Quantity(b)) => a.add(b).map(Self::quantity),
            (temporal, Self::Quantity(q)) if temporal.is_temporal() => temporal.shift(q, false),
            _ => {
                let (a, b) = self.decimal_pair(other)?;
                a.checked_add(b).map(Self::Decimal)
            }
        }
    }

    /// `-`: numeric, quantity and temporal-minus-duration arithmetic
    pub fn subtract(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.checked_sub(*b).map(Self::Integer),
            (Self::Quantity(a), Self::Quantity(b)) => a.subtract(b).map(Self::quantity),
            (temporal, Self::Quantity(q)) if temporal.is_temporal() => temporal.shift(q, true),
            _ => {
                let (a, b) = self.decimal_pair(other)?;
                a.checked_sub(b).map(Self::Decimal)
            }
        }
    }

    pub fn multiply(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.checked_mul(*b).map(Self::Integer),
            (Self::Quantity(q), n) | (n, Self::Quantity(q)) if n.is_numeric() => {
                q.scale(n.as_decimal()?).map(Self::quantity)
            }
            _ => {
                let (a, b) = self.decimal_pair(other)?;
                a.checked_mul(b).map(Self::Decimal)
            }
        }
    }

    /// `/`: always produces a Decimal; division by zero yields `None`
    pub fn divide(&self, other: &Self) -> Option<Self> {
        if let (Self::Quantity(q), n) = (self, other) {
            let divisor = n.as_decimal()?;
            let value = q.value.checked_div(divisor)?;
            return Some(Self::quantity(Quantity::new(value, q.unit.clone())));
        }
        let (a, b) = self.decimal_pair(other)?;
        a.checked_div(b).map(|d| Self::Decimal(d.normalize()))
    }

    /// `div`: truncated division
    pub fn integer_divide(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.checked_div(*b).map(Self::Integer),
            _ => {
                let (a, b) = self.decimal_pair(other)?;
                a.checked_div(b)?.trunc().to_i64().map(Self::Integer)
            }
        }
    }

    /// `mod`: remainder of truncated division
    pub fn modulo(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.checked_rem(*b).map(Self::Integer),
            _ => {
                let (a, b) = self.decimal_pair(other)?;
                a.checked_rem(b).map(Self::Decimal)
            }
        }
    }

    /// Unary minus
    pub fn negate(&self) -> Option<Self> {
        match self {
            Self::Integer(i) => i.checked_neg().map(Self::Integer),
            Self::Decimal(d) => Some(Self::Decimal(-*d)),
            Self::Quantity(q) => Some(Self::quantity(q.negate())),
            _ => None,
        }
    }

    fn shift(&self, quantity: &Quantity, negate: bool) -> Option<Self> {
        let (mut amount, unit) = calendar_amount(quantity)?;
        if negate {
            amount = amount.checked_neg()?;
        }
        match self {
            Self::Date(d) => d.add_calendar(amount, unit).map(Self::Date),
            Self::DateTime(dt) => dt.add_calendar(amount, unit).map(Self::DateTime),
            Self::Time(t) => t.add_calendar(amount, unit).map(Self::Time),
            _ => None,
        }
    }
}

/// Calendar amount of a duration quantity; fractional seconds become milliseconds
fn calendar_amount(quantity: &Quantity) -> Option<(i64, CalendarUnit)> {
    let unit = quantity.calendar_unit()?;
    if unit == CalendarUnit::Second && quantity.value.fract() != Decimal::ZERO {
        let millis = quantity.value.checked_mul(Decimal::from(1000))?;
        return Some((millis.trunc().to_i64()?, CalendarUnit::Millisecond));
    }
    Some((quantity.value.trunc().to_i64()?, unit))
}

fn date_as_datetime(date: &PrecisionDate) -> Option<PrecisionDateTime> {
    let naive = NaiveDateTime::new(date.date, NaiveTime::MIN);
    let datetime = FixedOffset::east_opt(0)?
        .from_local_datetime(&naive)
        .single()?;
    Some(PrecisionDateTime::new(datetime, date.precision))
}

fn normalize_string(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Quantity(q) => write!(f, "{q}"),
        }
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for PrimitiveValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(text: &str) -> PrimitiveValue {
        PrimitiveValue::Decimal(Decimal::from_str(text).unwrap())
    }

    #[test]
    fn test_integer_and_decimal_addition() {
        let three = PrimitiveValue::Integer(1).add(&PrimitiveValue::Integer(2));
        assert_eq!(three, Some(PrimitiveValue::Integer(3)));

        let mixed = dec("2.0").add(&PrimitiveValue::Integer(1)).unwrap();
        assert_eq!(mixed.to_string(), "3.0");
        assert_eq!(mixed.type_name(), "Decimal");
    }

    #[test]
    fn test_arithmetic_type_gating() {
        assert_eq!(PrimitiveValue::Integer(1).add(&"x".into()), None);
        assert_eq!(
            PrimitiveValue::Boolean(true).multiply(&PrimitiveValue::Integer(2)),
            None
        );
        assert_eq!(PrimitiveValue::Integer(i64::MAX).add(&1i64.into()), None);
    }

    #[test]
    fn test_division_rules() {
        assert_eq!(
            PrimitiveValue::Integer(10).divide(&PrimitiveValue::Integer(4)),
            Some(dec("2.5"))
        );
        assert_eq!(
            PrimitiveValue::Integer(1).divide(&PrimitiveValue::Integer(0)),
            None
        );
        assert_eq!(
            PrimitiveValue::Integer(7).integer_divide(&PrimitiveValue::Integer(2)),
            Some(PrimitiveValue::Integer(3))
        );
        assert_eq!(
            dec("5.5").integer_divide(&dec("0.7")),
            Some(PrimitiveValue::Integer(7))
        );
        assert_eq!(
            PrimitiveValue::Integer(7).modulo(&PrimitiveValue::Integer(0)),
            None
        );
    }

    #[test]
    fn test_equality_and_equivalence() {
        assert_eq!(dec("1.10").fhir_equals(&dec("1.1")), Some(true));
        assert!(dec("1.10").equivalent(&dec("1.1")));
        assert!(dec("1.12").equivalent(&dec("1.1")));

        let lower: PrimitiveValue = "hello  world".into();
        let upper: PrimitiveValue = "Hello World".into();
        assert_eq!(lower.fhir_equals(&upper), Some(false));
        assert!(lower.equivalent(&upper));

        assert_eq!(
            PrimitiveValue::Integer(1).fhir_equals(&dec("1.0")),
            Some(true)
        );
        assert_eq!(
            PrimitiveValue::Integer(1).fhir_equals(&"1".into()),
            Some(false)
        );
    }

    #[test]
    fn test_temporal_equality_with_precision_mismatch() {
        let year = PrimitiveValue::Date(PrecisionDate::parse("2020").unwrap());
        let day = PrimitiveValue::Date(PrecisionDate::parse("2020-01-01").unwrap());
        assert_eq!(year.fhir_equals(&day), None);
        assert!(!year.equivalent(&day));
    }

    #[test]
    fn test_string_coerced_for_temporal_comparison() {
        let date = PrimitiveValue::Date(PrecisionDate::parse("2020-01-15").unwrap());
        let text: PrimitiveValue = "2019-12-31".into();
        assert_eq!(text.compare(&date), Some(Ordering::Less));
        let garbage: PrimitiveValue = "soon".into();
        assert_eq!(garbage.compare(&date), None);
    }

    #[test]
    fn test_compare_incomparable_kinds() {
        assert_eq!(PrimitiveValue::Integer(1).compare(&"a".into()), None);
        assert_eq!(
            PrimitiveValue::Boolean(true).compare(&PrimitiveValue::Boolean(false)),
            None
        );
        assert_eq!(
            PrimitiveValue::Integer(2).compare(&dec("1.5")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_date_plus_calendar_quantity() {
        let date = PrimitiveValue::Date(PrecisionDate::parse("2020-01-15").unwrap());
        let week = PrimitiveValue::quantity(Quantity::new(Decimal::ONE, "week"));
        let shifted = date.add(&week).unwrap();
        assert_eq!(shifted.to_string(), "2020-01-22");
        let back = shifted.subtract(&week).unwrap();
        assert_eq!(back, date);
    }
}
