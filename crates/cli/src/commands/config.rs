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

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use jwkv_config::{ConfigurationSection, RootConfig};
use schemars::gen::SchemaSettings;
use tracing::{info, info_span};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Dump the current config as YAML
    Dump,

    /// Check a config file
    Check,

    /// Print the JSON schema of the config file
    Schema,
}

fn schema() -> schemars::schema::RootSchema {
    SchemaSettings::draft07()
        .with(|settings| settings.option_add_null_type = false)
        .into_generator()
        .into_root_schema_for::<RootConfig>()
}

impl Options {
    pub fn run(self, figment: &Figment, paths: &[Utf8PathBuf]) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Dump => {
                let _span = info_span!("cli.config.dump").entered();

                let config = RootConfig::extract(figment)?;

                serde_yaml::to_writer(std::io::stdout(), &config)?;
            }

            SC::Check => {
                let _span = info_span!("cli.config.check").entered();

                let _config = RootConfig::extract(figment)?;
                info!(path = ?paths, "Configuration file looks good");
            }

            SC::Schema => {
                let _span = info_span!("cli.config.schema").entered();

                serde_json::to_writer_pretty(std::io::stdout(), &schema())?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_describes_sections() {
        let schema = serde_json::to_value(schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("keys").is_some());
        assert!(properties.get("telemetry").is_some());

        let policy = &schema["definitions"]["InvalidKeyPolicyConfig"];
        assert!(policy.is_object());
    }
}
