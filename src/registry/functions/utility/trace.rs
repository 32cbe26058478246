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

//! trace() function - debugging function that logs and returns input

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::Collection;
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// trace() function - debugging function that logs and returns input
pub struct TraceFunction;

impl FhirPathFunction for TraceFunction {
    fn name(&self) -> &str {
        "trace"
    }
    fn human_friendly_name(&self) -> &str {
        "Trace"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "trace",
                vec![
                    ParameterInfo::required("name", ParameterKind::Value),
                    ParameterInfo::optional("projection", ParameterKind::Expression),
                ],
                "Any",
            )
        });
        &SIG
    }

    fn evaluate(
        &self,
        args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let name = context
            .string_argument(args, 0)?
            .unwrap_or_else(|| "trace".to_string());
        match args.get(1) {
            Some(projection) => {
                let traced =
                    context.evaluate_with(projection, context.input.clone(), None, None)?;
                log::debug!("{name}: {traced}");
            }
            None => log::debug!("{name}: {}", context.input),
        }
        Ok(context.input.clone())
    }
}
