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

//! Subsetting functions

mod first;
mod last;
mod single;
mod skip;
mod tail;
mod take;

pub use first::FirstFunction;
pub use last::LastFunction;
pub use single::SingleFunction;
pub use skip::SkipFunction;
pub use tail::TailFunction;
pub use take::TakeFunction;

use crate::registry::function::FunctionRegistry;

/// Register all subsetting functions
pub fn register_subsetting_functions(registry: &mut FunctionRegistry) {
    registry.register(SingleFunction);
    registry.register(FirstFunction);
    registry.register(LastFunction);
    registry.register(TailFunction);
    registry.register(SkipFunction);
    registry.register(TakeFunction);
}
