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

//! Date and time component functions

mod component_of;

pub use component_of::ComponentOfFunction;

use crate::model::TemporalPrecision;
use crate::registry::function::FunctionRegistry;

/// Register all temporal component functions
pub fn register_temporal_functions(registry: &mut FunctionRegistry) {
    for (name, human_name, precision) in [
        ("yearOf", "Year Of", TemporalPrecision::Year),
        ("monthOf", "Month Of", TemporalPrecision::Month),
        ("dayOf", "Day Of", TemporalPrecision::Day),
        ("hourOf", "Hour Of", TemporalPrecision::Hour),
        ("minuteOf", "Minute Of", TemporalPrecision::Minute),
        ("secondOf", "Second Of", TemporalPrecision::Second),
        ("millisecondOf", "Millisecond Of", TemporalPrecision::Millisecond),
    ] {
        registry.register(ComponentOfFunction::new(name, human_name, precision));
    }
}
