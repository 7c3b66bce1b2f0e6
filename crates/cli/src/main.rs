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

#![allow(clippy::module_name_repetitions)]

use std::process::ExitCode;

use clap::Parser;
use jwkv_config::{ConfigurationSectionExt, TelemetryConfig};

mod commands;
mod telemetry;

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env files
    // We keep the result to log it once logging is set up
    let dotenv_path = dotenvy::dotenv()
        .map(Some)
        // Display the error if it is something other than the .env file not existing
        .or_else(|e| if e.not_found() { Ok(None) } else { Err(e) });

    // Parse the CLI arguments
    let opts = self::commands::Options::parse();
    let figment = opts.figment();

    // The telemetry section could fail to load. The command loads the whole
    // configuration afterwards and reports the error, so fall back to the
    // defaults for now.
    let telemetry_config = TelemetryConfig::extract_or_default(&figment).unwrap_or_default();
    self::telemetry::setup(&telemetry_config)?;

    match dotenv_path {
        Ok(Some(path)) => tracing::info!(?path, "Loaded environment variables from file"),
        Ok(None) => {}
        Err(err) => tracing::warn!(%err, "Failed to load .env file"),
    }

    tracing::trace!(?opts, "Running command");
    opts.run(&figment)
}
