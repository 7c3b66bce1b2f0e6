// Copyright 2024 The Matrix.org Foundation C.I.C.
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

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{util::error_on_field, ConfigurationSection};

/// How log lines are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line with its span context
    #[default]
    Full,

    /// Like `full`, but shorter
    Compact,

    /// One JSON object per line
    Json,
}

fn default_filter() -> String {
    "info".to_owned()
}

fn filter_example() -> &'static str {
    "info,jwkv_jose=debug"
}

/// Configuration related to logging
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TelemetryConfig {
    /// Which events are logged, using the `RUST_LOG` syntax. `RUST_LOG` takes
    /// precedence if it is set.
    #[schemars(example = "filter_example")]
    #[serde(default = "default_filter")]
    pub filter: String,

    /// How log lines are written
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

impl ConfigurationSection for TelemetryConfig {
    const PATH: Option<&'static str> = Some("telemetry");

    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        if self.filter.trim().is_empty() {
            return Err(error_on_field(
                figment,
                "telemetry",
                "filter",
                figment::Error::from("the log filter must not be empty".to_owned()),
            ));
        }

        Ok(())
    }
}
