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

use crate::ConfigurationSection;

/// What to do with a published key which fails validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvalidKeyPolicyConfig {
    /// Log the key and carry on with the other keys of the set
    #[default]
    Skip,

    /// Reject the whole key set
    Abort,
}

const fn default_min_valid_keys() -> usize {
    1
}

/// Configuration related to the validation of published keys
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeysConfig {
    /// What to do with a key which fails validation
    #[serde(default)]
    pub on_invalid: InvalidKeyPolicyConfig,

    /// Reject keys from which no RSA public key can be derived, such as EC
    /// keys
    #[serde(default)]
    pub require_public_key: bool,

    /// Minimum number of usable keys a key set must have
    #[serde(default = "default_min_valid_keys")]
    pub min_valid_keys: usize,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            on_invalid: InvalidKeyPolicyConfig::default(),
            require_public_key: false,
            min_valid_keys: default_min_valid_keys(),
        }
    }
}

impl ConfigurationSection for KeysConfig {
    const PATH: Option<&'static str> = Some("keys");
}
