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

//! FHIRPath tree-walking interpreter
//!
//! Parses FHIRPath expressions into an AST, caches the parsed trees, and
//! evaluates them against document trees adapted from JSON (or built by
//! hand) with full collection and three-valued logic semantics.
//!
//! ```
//! use octofhir_fhirpath_interp::FhirPathEngine;
//! use serde_json::json;
//!
//! let engine = FhirPathEngine::new();
//! let patient = json!({
//!     "resourceType": "Patient",
//!     "name": [{"use": "official", "given": ["Peter", "James"]}]
//! });
//! let given = engine
//!     .evaluate_document("Patient.name.where(use = 'official').given.first()", &patient)
//!     .unwrap();
//! assert_eq!(given.to_string(), "[Peter]");
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;

pub use config::EngineConfig;
pub use engine::FhirPathEngine;
pub use error::{FhirPathError, Result};
pub use evaluator::{EvaluationContext, EvaluationError, EvaluationResult};
pub use model::{Collection, JsonAdapter, Node, PathNode, PrimitiveValue, TreeAdapter, TypeRegistry};
pub use parser::{AstCacheConfig, ParseError, parse, parse_with_max_nesting};
pub use registry::{FhirPathFunction, FunctionRegistry};
