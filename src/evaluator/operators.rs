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

//! Operator semantics over collections
//!
//! Operand evaluation and short-circuiting live in the interpreter; these
//! functions only combine already evaluated collections.

use std::cmp::Ordering;

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::model::{Collection, PathNode, PrimitiveValue};

/// `+ - * / div mod` over singleton primitive operands
pub fn arithmetic(op: BinaryOperator, left: &Collection, right: &Collection) -> Collection {
    let (Some(a), Some(b)) = (left.singleton_primitive(), right.singleton_primitive()) else {
        return Collection::empty();
    };
    let result = match op {
        BinaryOperator::Add => a.add(b),
        BinaryOperator::Subtract => a.subtract(b),
        BinaryOperator::Multiply => a.multiply(b),
        BinaryOperator::Divide => a.divide(b),
        BinaryOperator::IntegerDivide => a.integer_divide(b),
        BinaryOperator::Modulo => a.modulo(b),
        _ => None,
    };
    Collection::from_iter(result.map(PathNode::Value))
}

/// `&`: string concatenation where an empty operand reads as `''`
pub fn concatenate(left: &Collection, right: &Collection) -> Collection {
    fn text(operand: &Collection) -> Option<&str> {
        if operand.is_empty() {
            return Some("");
        }
        operand.singleton_primitive()?.as_str()
    }
    match (text(left), text(right)) {
        (Some(a), Some(b)) => Collection::single(PrimitiveValue::string(format!("{a}{b}"))),
        _ => Collection::empty(),
    }
}

/// `< <= > >=`; empty when either side is not a comparable singleton
pub fn compare(op: BinaryOperator, left: &Collection, right: &Collection) -> Collection {
    let (Some(a), Some(b)) = (left.singleton_primitive(), right.singleton_primitive()) else {
        return Collection::empty();
    };
    let Some(order) = a.compare(b) else {
        return Collection::empty();
    };
    let result = match op {
        BinaryOperator::LessThan => order == Ordering::Less,
        BinaryOperator::LessThanOrEqual => order != Ordering::Greater,
        BinaryOperator::GreaterThan => order == Ordering::Greater,
        BinaryOperator::GreaterThanOrEqual => order != Ordering::Less,
        _ => return Collection::empty(),
    };
    Collection::boolean(result)
}

/// `=`: element-wise strict equality in order
///
/// `None` when either side is empty or a pair is undecidable at the
/// available temporal precision.
pub fn equals(left: &Collection, right: &Collection) -> Option<bool> {
    if left.is_empty() || right.is_empty() {
        return None;
    }
    if left.len() != right.len() {
        return Some(false);
    }
    let mut result = Some(true);
    for (a, b) in left.iter().zip(right.iter()) {
        match a.fhir_equals(b) {
            Some(true) => {}
            Some(false) => return Some(false),
            None => result = None,
        }
    }
    result
}

/// `~`: order-free equivalence; two empty collections are equivalent
pub fn equivalent(left: &Collection, right: &Collection) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|a| {
        let found = right
            .iter()
            .enumerate()
            .find(|(i, b)| !used[*i] && a.equivalent(b))
            .map(|(i, _)| i);
        match found {
            Some(i) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// `in`: every element of `items` is contained in `container`
pub fn is_member(items: &Collection, container: &Collection) -> Option<bool> {
    if items.is_empty() {
        return None;
    }
    Some(items.iter().all(|item| container.contains_item(item)))
}

/// Unary `-` and `+`
pub fn unary(op: UnaryOperator, operand: &Collection) -> Collection {
    let Some(value) = operand.singleton_primitive() else {
        return Collection::empty();
    };
    let result = match op {
        UnaryOperator::Negate => value.negate(),
        UnaryOperator::Positive => matches!(
            value,
            PrimitiveValue::Integer(_) | PrimitiveValue::Decimal(_) | PrimitiveValue::Quantity(_)
        )
        .then(|| value.clone()),
    };
    Collection::from_iter(result.map(PathNode::Value))
}

/// Three-valued `and`
pub fn and(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

/// Three-valued `or`
pub fn or(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

/// Three-valued `xor`
pub fn xor(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    Some(left? ^ right?)
}

/// Three-valued `implies`
pub fn implies(left: Option<bool>, right: Option<bool>) -> Option<bool> {
    match (left, right) {
        (Some(false), _) => Some(true),
        (Some(true), right) => right,
        (None, Some(true)) => Some(true),
        (None, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn ints(values: &[i64]) -> Collection {
        values
            .iter()
            .map(|v| PathNode::Value(PrimitiveValue::Integer(*v)))
            .collect()
    }

    fn strings(values: &[&str]) -> Collection {
        values.iter().map(|v| PathNode::Value((*v).into())).collect()
    }

    #[rstest]
    #[case(Some(true), Some(true), Some(true))]
    #[case(Some(true), Some(false), Some(false))]
    #[case(Some(true), None, None)]
    #[case(Some(false), None, Some(false))]
    #[case(None, Some(false), Some(false))]
    #[case(None, None, None)]
    fn test_and_truth_table(
        #[case] left: Option<bool>,
        #[case] right: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(and(left, right), expected);
    }

    #[rstest]
    #[case(Some(false), Some(false), Some(false))]
    #[case(Some(true), None, Some(true))]
    #[case(None, Some(true), Some(true))]
    #[case(Some(false), None, None)]
    fn test_or_truth_table(
        #[case] left: Option<bool>,
        #[case] right: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(or(left, right), expected);
    }

    #[rstest]
    #[case(Some(false), None, Some(true))]
    #[case(Some(true), Some(false), Some(false))]
    #[case(Some(true), None, None)]
    #[case(None, Some(true), Some(true))]
    #[case(None, Some(false), None)]
    fn test_implies_truth_table(
        #[case] left: Option<bool>,
        #[case] right: Option<bool>,
        #[case] expected: Option<bool>,
    ) {
        assert_eq!(implies(left, right), expected);
    }

    #[test]
    fn test_xor_unknown_propagates() {
        assert_eq!(xor(Some(true), Some(false)), Some(true));
        assert_eq!(xor(Some(true), Some(true)), Some(false));
        assert_eq!(xor(None, Some(true)), None);
    }

    #[test]
    fn test_arithmetic_gating() {
        assert_eq!(
            arithmetic(BinaryOperator::Add, &ints(&[1]), &ints(&[2])).to_string(),
            "[3]"
        );
        assert!(arithmetic(BinaryOperator::Add, &ints(&[1]), &strings(&["x"])).is_empty());
        assert!(arithmetic(BinaryOperator::Add, &ints(&[1, 2]), &ints(&[2])).is_empty());
        assert!(arithmetic(BinaryOperator::Divide, &ints(&[1]), &ints(&[0])).is_empty());
        assert!(arithmetic(BinaryOperator::Add, &ints(&[i64::MAX]), &ints(&[1])).is_empty());

        let two = Collection::single(PrimitiveValue::Decimal(Decimal::from_str("2.0").unwrap()));
        let sum = arithmetic(BinaryOperator::Add, &two, &ints(&[1]));
        assert_eq!(sum.to_string(), "[3.0]");
    }

    #[test]
    fn test_concatenate_reads_empty_as_blank() {
        assert_eq!(concatenate(&Collection::empty(), &strings(&["x"])).to_string(), "[x]");
        assert_eq!(
            concatenate(&Collection::empty(), &Collection::empty()).singleton_primitive(),
            Some(&PrimitiveValue::string(""))
        );
        assert!(concatenate(&ints(&[1]), &strings(&["x"])).is_empty());
    }

    #[test]
    fn test_equality_rules() {
        assert_eq!(equals(&ints(&[1, 2]), &ints(&[1, 2])), Some(true));
        assert_eq!(equals(&ints(&[1, 2]), &ints(&[2, 1])), Some(false));
        assert_eq!(equals(&ints(&[1]), &ints(&[1, 1])), Some(false));
        assert_eq!(equals(&Collection::empty(), &ints(&[1])), None);
        assert_eq!(equals(&strings(&["abc"]), &strings(&["ABC"])), Some(false));
    }

    #[test]
    fn test_equivalence_rules() {
        assert!(equivalent(&Collection::empty(), &Collection::empty()));
        assert!(!equivalent(&Collection::empty(), &ints(&[1])));
        assert!(equivalent(&ints(&[1, 2]), &ints(&[2, 1])));
        assert!(!equivalent(&ints(&[1, 1]), &ints(&[1, 2])));
        assert!(equivalent(&strings(&["  Hello   World "]), &strings(&["hello world"])));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            compare(BinaryOperator::LessThan, &ints(&[1]), &ints(&[2])).to_string(),
            "[true]"
        );
        assert_eq!(
            compare(BinaryOperator::GreaterThanOrEqual, &strings(&["b"]), &strings(&["a"]))
                .to_string(),
            "[true]"
        );
        assert!(compare(BinaryOperator::LessThan, &ints(&[1]), &strings(&["a"])).is_empty());
    }

    #[test]
    fn test_membership() {
        assert_eq!(is_member(&ints(&[2]), &ints(&[1, 2, 3])), Some(true));
        assert_eq!(is_member(&ints(&[4]), &ints(&[1, 2, 3])), Some(false));
        assert_eq!(is_member(&Collection::empty(), &ints(&[1])), None);
        assert_eq!(is_member(&ints(&[1]), &Collection::empty()), Some(false));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOperator::Negate, &ints(&[5])).to_string(), "[-5]");
        assert_eq!(unary(UnaryOperator::Positive, &ints(&[5])).to_string(), "[5]");
        assert!(unary(UnaryOperator::Negate, &strings(&["a"])).is_empty());
        assert!(unary(UnaryOperator::Positive, &strings(&["a"])).is_empty());
    }
}
