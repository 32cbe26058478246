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

//! Operator semantics, literals and evaluation errors

use octofhir_fhirpath_interp::evaluator::EvaluationError;
use octofhir_fhirpath_interp::registry::FunctionError;
use octofhir_fhirpath_interp::{
    Collection, EngineConfig, EvaluationContext, FhirPathEngine, FhirPathError, Node,
    ParseError, PrimitiveValue, parse,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod utils;
use utils::eval;

#[rstest]
#[case("1 + 2", "[3]")]
#[case("2.0 + 1", "[3.0]")]
#[case("1 + 'x'", "[]")]
#[case("'a' + 'b'", "[ab]")]
#[case("5 - 7", "[-2]")]
#[case("3 * 4", "[12]")]
#[case("10 / 4", "[2.5]")]
#[case("1 / 0", "[]")]
#[case("7 div 2", "[3]")]
#[case("7 mod 2", "[1]")]
#[case("7 div 0", "[]")]
#[case("-3 + 1", "[-2]")]
#[case("2 + 3 * 4", "[14]")]
#[case("(2 + 3) * 4", "[20]")]
#[case("(1 | 2) + 1", "[]")]
#[case("{} + 1", "[]")]
#[case("5 'mg' + 3 'mg'", "[8 'mg']")]
#[case("5 'mg' + 3 'kg'", "[]")]
fn test_arithmetic(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("'a' & 'b'", "[ab]")]
#[case("{} & 'x'", "[x]")]
#[case("'x' & {}", "[x]")]
#[case("({} & {}).count()", "[1]")]
#[case("({} & {}).length()", "[0]")]
fn test_string_concatenation(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(1 | 2 | 3)[0]", "[1]")]
#[case("(1 | 2 | 3)[1]", "[2]")]
#[case("(1 | 2 | 3)[2]", "[3]")]
#[case("(1 | 2 | 3)[5]", "[]")]
#[case("(1 | 2 | 3)[{}]", "[]")]
fn test_indexer_bounds(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("1 = 1", "[true]")]
#[case("1 = 1.0", "[true]")]
#[case("'abc' = 'ABC'", "[false]")]
#[case("'abc' ~ 'ABC'", "[true]")]
#[case("'  hello   world ' ~ 'Hello World'", "[true]")]
#[case("1.10 ~ 1.1", "[true]")]
#[case("1.10 = 1.1", "[true]")]
#[case("1.2 ~ 1.3", "[false]")]
#[case("{} = 1", "[]")]
#[case("1 != {}", "[]")]
#[case("{} ~ {}", "[true]")]
#[case("{} ~ 1", "[false]")]
#[case("(1 | 2) = (1 | 2)", "[true]")]
#[case("(1 | 2) = (2 | 1)", "[false]")]
#[case("(1 | 2) ~ (2 | 1)", "[true]")]
#[case("(1 | 2) = 1", "[false]")]
#[case("1 != 2", "[true]")]
#[case("'a' !~ 'A'", "[false]")]
fn test_equality_and_equivalence(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("1 < 2", "[true]")]
#[case("2.5 >= 2", "[true]")]
#[case("'abc' < 'abd'", "[true]")]
#[case("1 < 'a'", "[]")]
#[case("(1 | 2) < 3", "[]")]
#[case("5 'mg' > 3 'mg'", "[true]")]
#[case("5 'mg' > 3 'kg'", "[]")]
fn test_inequality(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("@2012-04-15 = @2012-04-15", "[true]")]
#[case("@2012 = @2012-01-01", "[]")]
#[case("@2012 < @2013-05-01", "[true]")]
#[case("@2012-01 < @2012-01-15", "[]")]
#[case("@2012-01-01T10:30:00Z > @2012-01-01T09:00:00Z", "[true]")]
#[case("@T10:30 < @T11:00", "[true]")]
#[case("@T10:30 = @T10:30:00", "[]")]
#[case("@2012-04-15 ~ @2012-04-15", "[true]")]
#[case("@2012 ~ @2012-01-01", "[false]")]
#[case("@2024-01-15 + 1 month", "[2024-02-15]")]
#[case("@2024-01-15 - 1 year", "[2023-01-15]")]
fn test_temporal_comparisons(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("(1 | 2 | 1).count()", "[2]")]
#[case("(1 | 2 | 3) | (3 | 4)", "[1, 2, 3, 4]")]
#[case("(1 | 2).combine(1 | 2).select($this).count()", "[4]")]
#[case("(1 | 2).combine(1 | 2).where(true).count()", "[4]")]
fn test_union_and_duplicates(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("2 in (1 | 2 | 3)", "[true]")]
#[case("4 in (1 | 2 | 3)", "[false]")]
#[case("(1 | 2 | 3) contains 2", "[true]")]
#[case("(1 | 2 | 3) contains 4", "[false]")]
#[case("{} in (1 | 2)", "[]")]
#[case("(1 | 2) contains {}", "[]")]
#[case("1 in {}", "[false]")]
fn test_membership(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[rstest]
#[case("true and true", "[true]")]
#[case("true and false", "[false]")]
#[case("true and {}", "[]")]
#[case("false and {}", "[false]")]
#[case("{} and false", "[false]")]
#[case("{} and {}", "[]")]
#[case("true or {}", "[true]")]
#[case("{} or false", "[]")]
#[case("false or false", "[false]")]
#[case("{} or {}", "[]")]
#[case("true xor false", "[true]")]
#[case("true xor true", "[false]")]
#[case("true xor {}", "[]")]
#[case("false implies {}", "[true]")]
#[case("true implies false", "[false]")]
#[case("true implies {}", "[]")]
#[case("{} implies true", "[true]")]
#[case("{} implies false", "[]")]
#[case("1 and true", "[false]")]
#[case("(true | false) or false", "[false]")]
fn test_three_valued_logic(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[test]
fn test_short_circuit_skips_failing_operand() {
    assert_eq!(eval("false and undefinedFunction()"), "[false]");
    assert_eq!(eval("true or undefinedFunction()"), "[true]");
    assert_eq!(eval("false implies undefinedFunction()"), "[true]");
}

#[rstest]
#[case("1 is Integer", "[true]")]
#[case("1 is System.Integer", "[true]")]
#[case("1 is String", "[false]")]
#[case("(1 | 2) is Integer", "[false]")]
#[case("{} is Integer", "[false]")]
#[case("1 as Integer", "[1]")]
#[case("1 as String", "[]")]
#[case("'a' is System.Any", "[true]")]
#[case("5 'mg' is Quantity", "[true]")]
fn test_type_expressions(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[test]
fn test_subtype_checks_on_nodes() {
    let engine = FhirPathEngine::new();
    let patient = Node::builder("Patient", "FHIR.Patient")
        .leaf("active", "FHIR.boolean", true)
        .build();

    let check = |expression: &str| {
        engine
            .evaluate(expression, patient.clone())
            .unwrap()
            .to_string()
    };
    assert_eq!(check("$this is DomainResource"), "[true]");
    assert_eq!(check("$this is FHIR.Resource"), "[true]");
    assert_eq!(check("$this is Observation"), "[false]");
    assert_eq!(check("($this as Resource).active"), "[true]");
    assert_eq!(check("($this as Observation).active"), "[]");
    assert_eq!(check("active is boolean"), "[true]");
    assert_eq!(check("active is Boolean"), "[true]");
}

#[test]
fn test_unknown_type_is_an_error() {
    let err = FhirPathEngine::new()
        .evaluate("1 is Starship", Collection::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Evaluation {
            source: EvaluationError::UnknownType { .. },
            ..
        }
    ));
}

#[rstest]
#[case("%ucum", "[http://unitsofmeasure.org]")]
#[case("%loinc", "[http://loinc.org]")]
#[case("%sct", "[http://snomed.info/sct]")]
#[case("%'vs-administrative-gender'", "[http://hl7.org/fhir/ValueSet/administrative-gender]")]
#[case(
    "%`ext-patient-birthTime`",
    "[http://hl7.org/fhir/StructureDefinition/patient-birthTime]"
)]
#[case("%unknownConstant", "[]")]
#[case("%today is Date", "[true]")]
#[case("%now is DateTime", "[true]")]
#[case("%timeOfDay is Time", "[true]")]
fn test_builtin_constants(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval(expression), expected);
}

#[test]
fn test_context_constants_resolve_to_root() {
    let engine = FhirPathEngine::new();
    let root = Node::builder("Patient", "FHIR.Patient")
        .leaf("id", "FHIR.id", "p1")
        .build();
    for expression in ["%context.id", "%resource.id", "%rootResource.id"] {
        let result = engine.evaluate(expression, root.clone()).unwrap();
        assert_eq!(result.to_string(), "[p1]", "{expression}");
    }
}

#[test]
fn test_caller_variables() {
    let engine = FhirPathEngine::new();
    let context = EvaluationContext::new(Collection::empty())
        .with_variable("threshold", PrimitiveValue::Integer(10))
        .with_variable("ucum", PrimitiveValue::string("overridden"));

    let result = engine
        .evaluate_with_context("(5 | 15 | 25).where($this > %threshold)", &context)
        .unwrap();
    assert_eq!(result.to_string(), "[15, 25]");

    let result = engine.evaluate_with_context("%ucum", &context).unwrap();
    assert_eq!(result.to_string(), "[overridden]");
}

#[test]
fn test_special_variables_outside_iteration() {
    assert_eq!(eval("$index"), "[]");
    assert_eq!(eval("$total"), "[]");
    assert_eq!(eval("$this"), "[]");
}

#[test]
fn test_member_navigation_preserves_order() {
    let root = Node::builder("R", "FHIR.R")
        .leaf("a", "FHIR.integer", 1i64)
        .leaf("b", "FHIR.integer", 2i64)
        .leaf("a", "FHIR.integer", 3i64)
        .build();
    let engine = FhirPathEngine::new();
    assert_eq!(engine.evaluate("a", root.clone()).unwrap().to_string(), "[1, 3]");
    assert_eq!(engine.evaluate("R.a", root.clone()).unwrap().to_string(), "[1, 3]");
    assert!(engine.evaluate("c", root.clone()).unwrap().is_empty());
    assert!(engine.evaluate("a.a", root).unwrap().is_empty());
}

#[rstest]
#[case("Patient.name.where(use = 'official').given.first()")]
#[case("(1 + 2) * 3 - -4")]
#[case("a.b[0].c(1, 'two', @2020-01-01)")]
#[case("%`ext-x` | %'vs-y' | %ucum")]
#[case("iif($this is FHIR.Patient, 'p', {})")]
#[case("x implies y or z and not(w)")]
#[case("'it\\'s'.length() > 3 'mg'")]
#[case("`div`.`where` mod 2")]
fn test_display_round_trip(#[case] expression: &str) {
    let first = parse(expression).unwrap();
    let rendered = first.to_string();
    let second = parse(&rendered).unwrap();
    assert_eq!(first, second, "{expression} rendered as {rendered}");
}

#[test]
fn test_parse_is_deterministic() {
    let a = parse("Patient.name.given.where($this.startsWith('P'))").unwrap();
    let b = parse("Patient.name.given.where($this.startsWith('P'))").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_parse_error_is_reported() {
    let err = FhirPathEngine::new()
        .evaluate("1 +", Collection::empty())
        .unwrap_err();
    assert!(matches!(err, FhirPathError::Parse { .. }));
    assert_eq!(err.expression(), "1 +");
}

#[test]
fn test_unknown_function_is_an_error() {
    let err = FhirPathEngine::new()
        .evaluate("(1 | 2).frobnicate()", Collection::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Evaluation {
            source: EvaluationError::Function(FunctionError::UnknownFunction { .. }),
            ..
        }
    ));
}

#[rstest]
#[case("(1 | 2).first(1)")]
#[case("(1 | 2 | 3).where()")]
#[case("(1 | 2).skip()")]
#[case("(1 | 2).skip('x')")]
#[case("(1 | 2).take(1.5)")]
#[case("'abc'.startsWith(1)")]
#[case("'abc'.matches()")]
#[case("(1 | 2).ofType(1)")]
#[case("(1).is('Integer')")]
#[case("iif(true)")]
fn test_misused_functions_yield_empty(#[case] expression: &str) {
    let result = FhirPathEngine::new()
        .evaluate(expression, Collection::empty())
        .unwrap();
    assert!(result.is_empty(), "{expression} gave {result}");
}

fn chain(terms: usize) -> String {
    vec!["1"; terms].join(" + ")
}

/// Runs on a thread with a generous stack so deep evaluation is limited by
/// the configured depth rather than the test harness stack
fn on_large_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_recursion_limit_is_reported() {
    let engine = FhirPathEngine::with_config(EngineConfig::new().with_max_depth(64));
    let err = engine
        .evaluate(&chain(200), Collection::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Evaluation {
            source: EvaluationError::RecursionLimitExceeded { limit: 64 },
            ..
        }
    ));
}

#[test]
fn test_recursion_limit_is_configurable() {
    let result = on_large_stack(|| {
        let config = EngineConfig::new()
            .with_max_depth(1024)
            .with_max_nesting(1024);
        FhirPathEngine::with_config(config)
            .evaluate(&chain(400), Collection::empty())
            .unwrap()
    });
    assert_eq!(result.to_string(), "[400]");

    let shallow = FhirPathEngine::with_config(EngineConfig::new().with_max_depth(4));
    assert!(shallow.evaluate(&chain(3), Collection::empty()).is_ok());
    assert!(shallow.evaluate(&chain(10), Collection::empty()).is_err());
}

#[rstest]
#[case::operator_chain(chain(30_000))]
#[case::parentheses(format!("{}1{}", "(".repeat(3000), ")".repeat(3000)))]
#[case::member_chain(format!("Patient{}", ".name".repeat(3000)))]
fn test_pathological_nesting_fails_to_parse(#[case] expression: String) {
    let err = FhirPathEngine::new()
        .evaluate(&expression, Collection::empty())
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Parse {
            source: ParseError::NestingTooDeep { limit: 256, .. },
            ..
        }
    ));
}

#[test]
fn test_nesting_limit_is_configurable() {
    let engine = FhirPathEngine::with_config(EngineConfig::new().with_max_nesting(8));
    assert!(engine.evaluate(&chain(8), Collection::empty()).is_ok());
    assert!(matches!(
        engine.evaluate(&chain(9), Collection::empty()),
        Err(FhirPathError::Parse {
            source: ParseError::NestingTooDeep { limit: 8, .. },
            ..
        })
    ));
}
