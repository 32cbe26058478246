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

//! Utility functions

mod has_value;
mod iif;
mod not;
mod now;
mod trace;

pub use has_value::{GetValueFunction, HasValueFunction};
pub use iif::IifFunction;
pub use not::NotFunction;
pub use now::{NowFunction, TodayFunction};
pub use trace::TraceFunction;

use crate::registry::function::FunctionRegistry;

/// Register all utility functions
pub fn register_utility_functions(registry: &mut FunctionRegistry) {
    registry.register(HasValueFunction);
    registry.register(GetValueFunction);
    registry.register(IifFunction);
    registry.register(NotFunction);
    registry.register(TraceFunction);
    registry.register(NowFunction);
    registry.register(TodayFunction);
}
