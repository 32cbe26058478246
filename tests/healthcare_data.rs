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

//! Evaluation against FHIR JSON resources

use octofhir_fhirpath_interp::evaluator::EvaluationError;
use octofhir_fhirpath_interp::{FhirPathEngine, FhirPathError, JsonAdapter, TreeAdapter};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

mod utils;
use utils::{bundle, eval_on, observation, patient};

#[rstest]
#[case("Patient.name.where(use = 'official').count()", "[1]")]
#[case("name.where(use = 'official').count()", "[1]")]
#[case("Patient.name.given", "[Peter, James, Jim, Peter, James]")]
#[case("Patient.name.given.distinct()", "[Peter, James, Jim]")]
#[case("Patient.name.select(given.first())", "[Peter, Jim, Peter]")]
#[case("Patient.name.family", "[Chalmers, Windsor]")]
#[case("Patient.name.where(use = 'official').given.first().upper()", "[PETER]")]
#[case("Patient.name.exists(use = 'maiden')", "[true]")]
#[case("Patient.name.all(given.exists())", "[true]")]
#[case("Patient.name.all(family.exists())", "[false]")]
#[case("Patient.telecom.where(use = 'mobile').value", "[(03) 3410 5613]")]
#[case("Patient.telecom.rank.aggregate($this + $total, 0)", "[3]")]
#[case("Patient.telecom.where(system.empty()).use", "[home]")]
#[case("Patient.contact.name.family", "[du Marché]")]
#[case("Patient.resourceType", "[]")]
#[case("Patient.id", "[example]")]
#[case("Patient.active = true", "[true]")]
#[case("Patient.gender = 'male'", "[true]")]
#[case("Patient.gender ~ 'MALE'", "[true]")]
#[case("Patient.birthDate < @2000-01-01", "[true]")]
#[case("Patient.birthDate = @1974-12-25", "[true]")]
#[case("Patient.birthDate.extension.url", "[http://hl7.org/fhir/StructureDefinition/patient-birthTime]")]
#[case("Patient.birthDate.extension.valueDateTime > @1974-12-25T12:00:00-05:00", "[true]")]
#[case("Patient.name[0].given[1]", "[James]")]
#[case("Patient.name.period.end", "[2002]")]
fn test_patient_navigation(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval_on(expression, &patient()), expected);
}

#[rstest]
#[case("Patient is DomainResource", "[true]")]
#[case("Patient is Observation", "[false]")]
#[case("Patient.active is Boolean", "[true]")]
#[case("Patient.active is boolean", "[true]")]
#[case("Patient.gender is code", "[true]")]
#[case("Patient.gender is string", "[true]")]
#[case("Patient.gender is String", "[true]")]
#[case("Patient.name.first() is HumanName", "[true]")]
#[case("Patient.name is HumanName", "[false]")]
#[case("Patient.telecom.first() is ContactPoint", "[true]")]
#[case("%resource.id", "[example]")]
fn test_patient_types(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval_on(expression, &patient()), expected);
}

#[rstest]
#[case("Observation.status = 'final'", "[true]")]
#[case("Observation.valueQuantity.value > 70", "[true]")]
#[case("Observation.valueQuantity.unit", "[beats/minute]")]
#[case("Observation.valueQuantity is Quantity", "[true]")]
#[case("Observation.code.coding.where(system = %loinc).code", "[8867-4]")]
#[case("Observation.category.coding.code contains 'vital-signs'", "[true]")]
#[case("Observation.subject.reference.startsWith('Patient/')", "[true]")]
#[case("Observation.effectiveDateTime > @1999-01-01", "[true]")]
#[case("Observation.code is CodeableConcept", "[true]")]
fn test_observation(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval_on(expression, &observation()), expected);
}

#[rstest]
#[case("Bundle.entry.count()", "[3]")]
#[case("Bundle.entry.resource.ofType(Patient).count()", "[2]")]
#[case("Bundle.entry.resource.ofType(Observation).valueQuantity.value", "[72]")]
#[case("Bundle.entry.resource.where(active = false).id", "[second]")]
#[case(
    "Bundle.entry.resource.ofType(Patient).name.where(use = 'official').family",
    "[Chalmers, Nguyen]"
)]
#[case("Bundle.entry.select(resource as Patient).id", "[example, second]")]
#[case("(Bundle.entry.resource as Patient).id", "[]")]
#[case("Bundle.entry.resource.ofType(DomainResource).count()", "[3]")]
#[case("Bundle.entry.resource.ofType(Resource).id.last()", "[second]")]
fn test_bundle(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(eval_on(expression, &bundle()), expected);
}

#[test]
fn test_scalar_document_root() {
    let engine = FhirPathEngine::new();
    let result = engine.evaluate_document("$this + 1", &json!(41)).unwrap();
    assert_eq!(result.to_string(), "[42]");
}

#[test]
fn test_null_document_is_rejected() {
    let err = FhirPathEngine::new()
        .evaluate_document("id", &serde_json::Value::Null)
        .unwrap_err();
    assert!(matches!(
        err,
        FhirPathError::Evaluation {
            source: EvaluationError::Model(_),
            ..
        }
    ));
}

#[test]
fn test_custom_type_hints() {
    let document = json!({
        "resourceType": "Patient",
        "extension": [{"url": "http://example.org/score", "valueDecimal": 1.5}],
        "photo": {"contentType": "image/png"}
    });
    let root = JsonAdapter::new()
        .with_type_hint("Patient.photo", "Attachment")
        .adapt(&document)
        .unwrap();

    let engine = FhirPathEngine::new();
    let photo = engine.evaluate("photo is Attachment", root.clone()).unwrap();
    assert_eq!(photo.to_string(), "[true]");

    let unhinted = document.to_node().unwrap();
    let photo = engine.evaluate("photo is Attachment", unhinted).unwrap();
    assert_eq!(photo.to_string(), "[false]");

    let score = engine
        .evaluate("extension.where(url = 'http://example.org/score').valueDecimal", root)
        .unwrap();
    assert_eq!(score.to_string(), "[1.5]");
}

#[test]
fn test_json_output() {
    let engine = FhirPathEngine::new();
    let result = engine
        .evaluate_document("Patient.name.where(use = 'usual') | Patient.active", &patient())
        .unwrap();
    assert_eq!(
        result.to_json(),
        json!([{"use": "usual", "given": "Jim"}, true])
    );
}
