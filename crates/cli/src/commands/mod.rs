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

mod check;
mod config;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Validate the keys of a JWK Set document
    Check(self::check::Options),

    /// Configuration-related commands
    Config(self::config::Options),
}

#[derive(Parser, Debug)]
#[command(name = "jwkv", version, about)]
pub struct Options {
    /// Path to the configuration file. Can be repeated, later files override
    /// earlier ones.
    #[arg(short, long, global = true, default_value = "config.yaml", action = clap::ArgAction::Append)]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Subcommand,
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            S::Check(c) => c.run(figment),
            S::Config(c) => c.run(figment, &self.config),
        }
    }

    /// Get a [`Figment`] instance with the configuration loaded
    pub fn figment(&self) -> Figment {
        jwkv_config::load_figment(&self.config)
    }
}
