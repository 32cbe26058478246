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

//! matches() function - regular expression test

use regex::Regex;

use super::input_string;
use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// matches() function - regular expression test
pub struct MatchesFunction;

impl FhirPathFunction for MatchesFunction {
    fn name(&self) -> &str {
        "matches"
    }
    fn human_friendly_name(&self) -> &str {
        "Matches"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "matches",
                vec![ParameterInfo::required("regex", ParameterKind::Value)],
                "Boolean",
            )
        });
        &SIG
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn documentation(&self) -> &str {
        "Returns `true` when the value matches the given regular expression anywhere in the string. An invalid expression or empty input yields empty."
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let Some(text) = input_string(context.input) else {
            return Ok(Collection::empty());
        };
        let Some(pattern) = context.string_argument(args, 0)? else {
            return Ok(Collection::empty());
        };
        match Regex::new(&pattern) {
            Ok(regex) => Ok(Collection::boolean(regex.is_match(text))),
            Err(err) => {
                log::debug!("matches(): invalid pattern {pattern:?}: {err}");
                Ok(Collection::empty())
            }
        }
    }
}
