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

//! Filtering and projection functions

mod of_type;
mod repeat;
mod select;
mod where_function;

pub use of_type::OfTypeFunction;
pub use repeat::RepeatFunction;
pub use select::SelectFunction;
pub use where_function::WhereFunction;

use crate::registry::function::FunctionRegistry;

/// Register all filtering functions
pub fn register_filtering_functions(registry: &mut FunctionRegistry) {
    registry.register(WhereFunction);
    registry.register(SelectFunction);
    registry.register(RepeatFunction);
    registry.register(OfTypeFunction);
}
