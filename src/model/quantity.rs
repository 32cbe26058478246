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

//! Quantity type with same-unit arithmetic

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::temporal::CalendarUnit;

/// Quantity value with a unit
///
/// Units are compared textually. Calendar keywords (`day`, `weeks`, ...) are
/// kept as written so that `4 days` renders back unchanged; they are only
/// mapped to their UCUM code when testing equivalence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    /// Numeric value
    pub value: Decimal,
    /// Unit string, `1` when dimensionless
    pub unit: String,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(value: Decimal, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            value,
            unit: if unit.is_empty() { "1".to_string() } else { unit },
        }
    }

    /// Calendar unit this quantity is expressed in, if any
    pub fn calendar_unit(&self) -> Option<CalendarUnit> {
        CalendarUnit::from_unit(&self.unit)
    }

    /// Whether the unit was written as a calendar keyword rather than UCUM code
    pub fn is_calendar_keyword(&self) -> bool {
        self.calendar_unit().is_some() && self.ucum_unit() != self.unit
    }

    fn ucum_unit(&self) -> &str {
        match self.calendar_unit() {
            Some(CalendarUnit::Year) => "a",
            Some(CalendarUnit::Month) => "mo",
            Some(CalendarUnit::Week) => "wk",
            Some(CalendarUnit::Day) => "d",
            Some(CalendarUnit::Hour) => "h",
            Some(CalendarUnit::Minute) => "min",
            Some(CalendarUnit::Second) => "s",
            Some(CalendarUnit::Millisecond) => "ms",
            None => &self.unit,
        }
    }

    /// Whether two quantities can be compared or combined
    pub fn has_same_unit(&self, other: &Self) -> bool {
        self.unit == other.unit
    }

    /// Order two quantities with identical units
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        self.has_same_unit(other)
            .then(|| self.value.cmp(&other.value))
    }

    /// Equivalence ignores calendar keyword vs UCUM spelling
    pub fn equivalent(&self, other: &Self) -> bool {
        self.ucum_unit() == other.ucum_unit() && self.value == other.value
    }

    /// Add two quantities with identical units
    pub fn add(&self, other: &Self) -> Option<Self> {
        if !self.has_same_unit(other) {
            return None;
        }
        Some(Self::new(self.value.checked_add(other.value)?, self.unit.clone()))
    }

    /// Subtract two quantities with identical units
    pub fn subtract(&self, other: &Self) -> Option<Self> {
        if !self.has_same_unit(other) {
            return None;
        }
        Some(Self::new(self.value.checked_sub(other.value)?, self.unit.clone()))
    }

    /// Scale by a dimensionless factor
    pub fn scale(&self, factor: Decimal) -> Option<Self> {
        Some(Self::new(self.value.checked_mul(factor)?, self.unit.clone()))
    }

    /// Negated copy
    pub fn negate(&self) -> Self {
        Self::new(-self.value, self.unit.clone())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_calendar_keyword() {
            write!(f, "{} {}", self.value, self.unit)
        } else {
            write!(f, "{} '{}'", self.value, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::prelude::FromPrimitive;

    fn qty(value: i64, unit: &str) -> Quantity {
        Quantity::new(Decimal::from_i64(value).unwrap(), unit)
    }

    #[test]
    fn test_same_unit_arithmetic() {
        let sum = qty(5, "mg").add(&qty(3, "mg")).unwrap();
        assert_eq!(sum, qty(8, "mg"));
        assert!(qty(5, "mg").add(&qty(3, "kg")).is_none());
        assert_eq!(qty(5, "mg").subtract(&qty(7, "mg")).unwrap(), qty(-2, "mg"));
    }

    #[test]
    fn test_calendar_equivalence() {
        assert!(qty(1, "year").equivalent(&qty(1, "a")));
        assert_ne!(qty(1, "year"), qty(1, "a"));
        assert_eq!(qty(2, "days").calendar_unit(), Some(CalendarUnit::Day));
    }

    #[test]
    fn test_display() {
        assert_eq!(qty(4, "days").to_string(), "4 days");
        assert_eq!(qty(10, "mg").to_string(), "10 'mg'");
        assert_eq!(Quantity::new(Decimal::ONE, "").unit, "1");
    }
}
