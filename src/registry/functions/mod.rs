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

//! Function implementations for FHIRPath expressions

pub mod aggregate;
pub mod combining;
pub mod conversion;
pub mod existence;
pub mod filtering;
pub mod navigation;
pub mod string;
pub mod subsetting;
pub mod temporal;
pub mod types;
pub mod utility;

pub use aggregate::*;
pub use combining::*;
pub use conversion::*;
pub use existence::*;
pub use filtering::*;
pub use navigation::*;
pub use string::*;
pub use subsetting::*;
pub use temporal::*;
pub use types::*;
pub use utility::*;

use crate::registry::function::FunctionRegistry;

/// Register every built-in function
pub fn register_builtin_functions(registry: &mut FunctionRegistry) {
    register_filtering_functions(registry);
    register_existence_functions(registry);
    register_subsetting_functions(registry);
    register_combining_functions(registry);
    register_aggregate_functions(registry);
    register_navigation_functions(registry);
    register_utility_functions(registry);
    register_type_functions(registry);
    register_conversion_functions(registry);
    register_string_functions(registry);
    register_temporal_functions(registry);
}
