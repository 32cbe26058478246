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

//! Existence and counting functions

mod all;
mod boolean_aggregates;
mod count;
mod distinct;
mod empty;
mod exists;
mod is_distinct;

pub use all::AllFunction;
pub use boolean_aggregates::{AllFalseFunction, AllTrueFunction, AnyFalseFunction, AnyTrueFunction};
pub use count::CountFunction;
pub use distinct::DistinctFunction;
pub use empty::EmptyFunction;
pub use exists::ExistsFunction;
pub use is_distinct::IsDistinctFunction;

use crate::registry::function::FunctionRegistry;

/// Register all existence functions
pub fn register_existence_functions(registry: &mut FunctionRegistry) {
    registry.register(ExistsFunction);
    registry.register(EmptyFunction);
    registry.register(AllFunction);
    registry.register(AllTrueFunction);
    registry.register(AnyTrueFunction);
    registry.register(AllFalseFunction);
    registry.register(AnyFalseFunction);
    registry.register(CountFunction);
    registry.register(DistinctFunction);
    registry.register(IsDistinctFunction);
}
