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

//! Built-in function library, grouped the way the registry groups it

use octofhir_fhirpath_interp::evaluator::EvaluationError;
use octofhir_fhirpath_interp::{Collection, FhirPathEngine, FhirPathError};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod utils;
use utils::{eval, eval_on, patient, questionnaire};

#[rstest]
#[case("(1 | 2 | 3).where($this > 1)", "[2, 3]")]
#[case("(10 | 20 | 30).where($index = 1)", "[20]")]
#[case("(1 | 2).where($this)", "[]")]
#[case("(1 | 2 | 3).select($this * 10)", "[10, 20, 30]")]
#[case("(10 | 20 | 30).select($index)", "[0, 1, 2]")]
#[case("(1 | 2).select({})", "[]")]
#[case("(1 | 'a' | 2).ofType(Integer)", "[1, 2]")]
#[case("(1 | 'a' | 2).ofType(System.String)", "[a]")]
#[case("(1 | 2 | 3).repeat({})", "[]")]
fn test_filtering(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[test]
fn test_repeat_walks_nested_items() {
    let q = questionnaire();
    assert_eq!(
        eval_on("Questionnaire.repeat(item).linkId", &q),
        "[1, 2, 1.1, 1.2, 1.2.1]"
    );
    assert_eq!(
        eval_on("Questionnaire.repeat(item).where(type = 'group').count()", &q),
        "[2]"
    );
}

#[rstest]
#[case("(1 | 2).exists()", "[true]")]
#[case("(1 | 2).where($this > 5).exists()", "[false]")]
#[case("(1 | 2 | 3).exists($this > 2)", "[true]")]
#[case("(1 | 2).where($this > 5).empty()", "[true]")]
#[case("(1 | 2).empty()", "[false]")]
#[case("(1 | 2).all($this > 0)", "[true]")]
#[case("(1 | 2).all($this > 1)", "[false]")]
#[case("(1 | 2).where(false).all($this > 1)", "[true]")]
#[case("(true | false).allTrue()", "[false]")]
#[case("(true | false).anyTrue()", "[true]")]
#[case("(true | false).allFalse()", "[false]")]
#[case("(true | false).anyFalse()", "[true]")]
#[case("(1 | 2).where(false).allTrue()", "[true]")]
#[case("(1 | 2).where(false).anyTrue()", "[false]")]
#[case("(1 | 2 | 3).count()", "[3]")]
#[case("(1 | 2).where(false).count()", "[0]")]
#[case("(1 | 2).combine(1 | 2).distinct()", "[1, 2]")]
#[case("(1 | 2).isDistinct()", "[true]")]
#[case("(1 | 2).combine(1).isDistinct()", "[false]")]
fn test_existence(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(5).single()", "[5]")]
#[case("(1 | 2).single()", "[]")]
#[case("(1 | 2 | 3).first()", "[1]")]
#[case("(1 | 2 | 3).last()", "[3]")]
#[case("(1 | 2 | 3).tail()", "[2, 3]")]
#[case("(1 | 2 | 3).skip(1)", "[2, 3]")]
#[case("(1 | 2 | 3).skip(-1)", "[1, 2, 3]")]
#[case("(1 | 2 | 3).skip(10)", "[]")]
#[case("(1 | 2 | 3).skip({})", "[]")]
#[case("(1 | 2 | 3).take(2)", "[1, 2]")]
#[case("(1 | 2 | 3).take(0)", "[]")]
#[case("(1 | 2 | 3).take(-1)", "[]")]
#[case("(1 | 2).where(false).first()", "[]")]
fn test_subsetting(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(1 | 2).union(2 | 3)", "[1, 2, 3]")]
#[case("(1 | 2).combine(2 | 3)", "[1, 2, 2, 3]")]
#[case("(1 | 2).union({})", "[1, 2]")]
fn test_combining(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(1 | 2 | 3).aggregate($this + $total, 0)", "[6]")]
#[case("(1 | 2 | 3).aggregate($total + $index, 0)", "[3]")]
#[case(
    "(3 | 1 | 2).aggregate(iif($total.empty(), $this, iif($this > $total, $this, $total)))",
    "[3]"
)]
#[case("(1 | 2).where(false).aggregate($this + $total, 0)", "[0]")]
fn test_aggregate(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("iif(true, 'a', 'b')", "[a]")]
#[case("iif(false, 'a', 'b')", "[b]")]
#[case("iif(false, 'a')", "[]")]
#[case("iif({}, 'a', 'b')", "[b]")]
#[case("(1 | 2).iif(true, 'a')", "[]")]
#[case("iif(true, 'ok', undefinedFunction())", "[ok]")]
#[case("true.not()", "[false]")]
#[case("false.not()", "[true]")]
#[case("(1 | 2).trace('numbers').count()", "[2]")]
#[case("(1 | 2).trace('doubled', $this * 2)", "[1, 2]")]
#[case("now() > @2000-01-01T00:00:00Z", "[true]")]
#[case("today() is Date", "[true]")]
#[case("true.hasValue()", "[false]")]
#[case("true.getValue()", "[]")]
fn test_utility(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(5).is(Integer)", "[true]")]
#[case("(5).is(String)", "[false]")]
#[case("(5).as(Integer)", "[5]")]
#[case("(5).as(String)", "[]")]
#[case("(1 | 2).as(Integer)", "[]")]
fn test_type_functions(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("'42'.toInteger()", "[42]")]
#[case("'-7'.toInteger()", "[-7]")]
#[case("'4.2'.toInteger()", "[]")]
#[case("'forty'.toInteger()", "[]")]
#[case("(3.0).toInteger()", "[3]")]
#[case("(3.5).toInteger()", "[]")]
#[case("true.toInteger()", "[1]")]
#[case("(1 | 2).toInteger()", "[]")]
#[case("'1.50'.toDecimal()", "[1.50]")]
#[case("(5).toDecimal()", "[5]")]
#[case("'abc'.toDecimal()", "[]")]
#[case("(5).toString()", "[5]")]
#[case("true.toString()", "[true]")]
#[case("(1 | 2).toString()", "[]")]
fn test_conversion(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("'hello'.length()", "[5]")]
#[case("'Hello'.upper()", "[HELLO]")]
#[case("'Hello'.lower()", "[hello]")]
#[case("'hello'.startsWith('he')", "[true]")]
#[case("'hello'.startsWith('lo')", "[false]")]
#[case("'hello'.endsWith('lo')", "[true]")]
#[case("'abc123'.matches('[0-9]+')", "[true]")]
#[case("'abc'.matches('^[0-9]+$')", "[false]")]
#[case("'abc'.matches('[')", "[]")]
#[case("(5).length()", "[]")]
#[case("(1 | 2).where(false).upper()", "[]")]
fn test_string(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(@2021-03-04T05:06:07.089+01:00).yearOf()", "[2021]")]
#[case("(@2021-03-04T05:06:07.089+01:00).monthOf()", "[3]")]
#[case("(@2021-03-04T05:06:07.089+01:00).dayOf()", "[4]")]
#[case("(@2021-03-04T05:06:07.089+01:00).hourOf()", "[5]")]
#[case("(@2021-03-04T05:06:07.089+01:00).secondOf()", "[7]")]
#[case("(@2021-03-04T05:06:07.089+01:00).millisecondOf()", "[89]")]
#[case("(@T14:30).minuteOf()", "[30]")]
#[case("(@2020).yearOf()", "[2020]")]
#[case("(@2020).monthOf()", "[]")]
#[case("(@2020-02-29).hourOf()", "[]")]
#[case("(@T14:30).yearOf()", "[]")]
#[case("(@T14:30).secondOf()", "[]")]
#[case("(2020).yearOf()", "[]")]
#[case("(@2020 | @2021).yearOf()", "[]")]
fn test_temporal_components(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("Patient.active.hasValue()", "[true]")]
#[case("Patient.active.getValue()", "[true]")]
#[case("Patient.name.first().hasValue()", "[false]")]
#[case("Patient.name.first().children().count()", "[4]")]
#[case("Patient.name.first().descendants().count()", "[4]")]
#[case("Patient.name[2].descendants().count()", "[6]")]
#[case("Patient.children().ofType(HumanName).count()", "[3]")]
#[case("Patient.gender.is(FHIR.string)", "[true]")]
#[case("Patient.gender.as(code)", "[male]")]
#[case("Patient.birthDate.yearOf()", "[1974]")]
#[case("Patient.birthDate.monthOf()", "[12]")]
fn test_functions_on_document_nodes(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval_on(expression, &patient()), expected);
}

#[test]
fn test_functions_do_not_modify_their_input() {
    let engine = FhirPathEngine::new();
    let input: Collection = engine
        .evaluate("(3 | 1 | 2)", Collection::empty())
        .unwrap();
    for expression in ["skip(1)", "tail()", "where($this > 1)", "select($this * 2)"] {
        engine.evaluate(expression, input.clone()).unwrap();
    }
    assert_eq!(input.to_string(), "[3, 1, 2]");
}

#[rstest]
#[case("(1 | 2).skip('x')")]
#[case("(1 | 2).take(true)")]
#[case("'abc'.endsWith(3)")]
#[case("'abc'.startsWith('a' | 'b')")]
#[case("(1 | 'a').ofType('Integer')")]
fn test_mistyped_arguments_yield_empty(#[case] expression: &str) {
    assert_eq!(eval(expression), "[]");
}

#[test]
fn test_of_type_with_unknown_type_is_an_error() {
    let err = FhirPathEngine::new()
        .evaluate("(1 | 2).ofType(Starship)", Collection::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Evaluation {
            source: EvaluationError::UnknownType { .. },
            ..
        }
    ));
}
