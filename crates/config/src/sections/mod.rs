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

mod keys;
mod telemetry;

pub use self::{
    keys::{InvalidKeyPolicyConfig, KeysConfig},
    telemetry::{LogFormat, TelemetryConfig},
};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// How published keys are validated
    #[serde(default)]
    pub keys: KeysConfig,

    /// Configuration of the logs
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        self.keys.validate(figment)?;
        self.telemetry.validate(figment)?;

        Ok(())
    }
}
