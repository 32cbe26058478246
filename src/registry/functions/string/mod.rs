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

//! String manipulation functions

mod case;
mod ends_with;
mod length;
mod matches;
mod starts_with;

pub use case::{LowerFunction, UpperFunction};
pub use ends_with::EndsWithFunction;
pub use length::LengthFunction;
pub use matches::MatchesFunction;
pub use starts_with::StartsWithFunction;

use crate::model::{Collection, PrimitiveValue};
use crate::registry::function::FunctionRegistry;

/// The input as a single string; anything else is not a string input
fn input_string(input: &Collection) -> Option<&str> {
    input.singleton_primitive().and_then(PrimitiveValue::as_str)
}

/// Register all string functions
pub fn register_string_functions(registry: &mut FunctionRegistry) {
    registry.register(LengthFunction);
    registry.register(StartsWithFunction);
    registry.register(EndsWithFunction);
    registry.register(UpperFunction);
    registry.register(LowerFunction);
    registry.register(MatchesFunction);
}
