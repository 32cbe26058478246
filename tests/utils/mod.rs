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

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use octofhir_fhirpath_interp::{Collection, FhirPathEngine};
use serde_json::{Value, json};

/// Evaluate against an empty input and render the result
pub fn eval(expression: &str) -> String {
    FhirPathEngine::new()
        .evaluate(expression, Collection::empty())
        .unwrap_or_else(|err| panic!("{expression}: {err}"))
        .to_string()
}

/// Evaluate against a JSON document and render the result
pub fn eval_on(expression: &str, document: &Value) -> String {
    FhirPathEngine::new()
        .evaluate_document(expression, document)
        .unwrap_or_else(|err| panic!("{expression}: {err}"))
        .to_string()
}

pub fn patient() -> Value {
    json!({
        "resourceType": "Patient",
        "id": "example",
        "active": true,
        "gender": "male",
        "birthDate": "1974-12-25",
        "name": [
            {
                "use": "official",
                "family": "Chalmers",
                "given": ["Peter", "James"]
            },
            {
                "use": "usual",
                "given": ["Jim"]
            },
            {
                "use": "maiden",
                "family": "Windsor",
                "given": ["Peter", "James"],
                "period": {"end": "2002"}
            }
        ],
        "telecom": [
            {"system": "phone", "value": "(03) 5555 6473", "use": "work", "rank": 1},
            {"system": "phone", "value": "(03) 3410 5613", "use": "mobile", "rank": 2},
            {"use": "home"}
        ],
        "_birthDate": {
            "extension": [{
                "url": "http://hl7.org/fhir/StructureDefinition/patient-birthTime",
                "valueDateTime": "1974-12-25T14:35:45-05:00"
            }]
        },
        "contact": [{
            "relationship": [{"coding": [{"code": "N"}]}],
            "name": {"family": "du Marché", "given": ["Bénédicte"]},
            "gender": "female"
        }]
    })
}

pub fn observation() -> Value {
    json!({
        "resourceType": "Observation",
        "id": "heart-rate",
        "status": "final",
        "category": [{
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/observation-category",
                "code": "vital-signs"
            }]
        }],
        "code": {
            "coding": [{"system": "http://loinc.org", "code": "8867-4", "display": "Heart rate"}]
        },
        "subject": {"reference": "Patient/example"},
        "effectiveDateTime": "1999-07-02",
        "valueQuantity": {
            "value": 72,
            "unit": "beats/minute",
            "system": "http://unitsofmeasure.org",
            "code": "/min"
        }
    })
}

pub fn bundle() -> Value {
    json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [
            {"resource": patient()},
            {"resource": observation()},
            {"resource": {
                "resourceType": "Patient",
                "id": "second",
                "active": false,
                "name": [{"use": "official", "family": "Nguyen", "given": ["An"]}]
            }}
        ]
    })
}

pub fn questionnaire() -> Value {
    json!({
        "resourceType": "Questionnaire",
        "status": "active",
        "item": [
            {
                "linkId": "1",
                "type": "group",
                "item": [
                    {"linkId": "1.1", "type": "string"},
                    {
                        "linkId": "1.2",
                        "type": "group",
                        "item": [{"linkId": "1.2.1", "type": "boolean"}]
                    }
                ]
            },
            {"linkId": "2", "type": "date"}
        ]
    })
}
