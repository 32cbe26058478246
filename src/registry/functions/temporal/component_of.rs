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

//! yearOf() through millisecondOf() - read one component of a temporal value

use crate::ast::ExpressionNode;
use crate::evaluator::EvaluationResult;
use crate::model::{Collection, ModelError, PrimitiveValue, TemporalPrecision};
use crate::registry::function::{FhirPathFunction, FunctionContext};
use crate::registry::signature::FunctionSignature;

/// Extracts the component at one precision from a Date, DateTime or Time
///
/// The input must be a single temporal value. A value that was not written
/// down to the requested precision, such as `@2020.monthOf()`, gives empty.
pub struct ComponentOfFunction {
    precision: TemporalPrecision,
    human_name: &'static str,
    signature: FunctionSignature,
}

impl ComponentOfFunction {
    /// Function named `name` reading the `precision` component
    pub fn new(name: &'static str, human_name: &'static str, precision: TemporalPrecision) -> Self {
        Self {
            precision,
            human_name,
            signature: FunctionSignature::new(name, vec![], "Integer"),
        }
    }
}

impl FhirPathFunction for ComponentOfFunction {
    fn name(&self) -> &str {
        &self.signature.name
    }

    fn human_friendly_name(&self) -> &str {
        self.human_name
    }

    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(
        &self,
        _args: &[ExpressionNode],
        context: &FunctionContext<'_>,
    ) -> EvaluationResult<Collection> {
        let component = match context.input.singleton_primitive() {
            Some(PrimitiveValue::Date(date)) => date.component(self.precision),
            Some(PrimitiveValue::DateTime(datetime)) => datetime.component(self.precision),
            Some(PrimitiveValue::Time(time)) => time.component(self.precision),
            _ => return Ok(Collection::empty()),
        };
        match component {
            Ok(value) => Ok(Collection::single(PrimitiveValue::Integer(value))),
            Err(ModelError::InvalidPrecision { requested, available }) => {
                log::debug!(
                    "{}(): value has {available:?} precision, {requested:?} is not available",
                    self.name()
                );
                Ok(Collection::empty())
            }
            Err(err) => Err(err.into()),
        }
    }
}
