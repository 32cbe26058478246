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

//! Functions merging the input with another collection

mod combine;
mod union;

pub use combine::CombineFunction;
pub use union::UnionFunction;

use crate::registry::function::FunctionRegistry;

/// Register all combining functions
pub fn register_combining_functions(registry: &mut FunctionRegistry) {
    registry.register(UnionFunction);
    registry.register(CombineFunction);
}
