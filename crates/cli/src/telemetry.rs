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

use std::io::IsTerminal;

use anyhow::Context;
use jwkv_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Build the log filter: `RUST_LOG` if it is set, the configured filter
/// otherwise
fn filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .with_context(|| format!("invalid log filter {:?}", config.filter))
}

/// Install the global subscriber, which writes logs to stderr
pub fn setup(config: &TelemetryConfig) -> anyhow::Result<()> {
    let ansi = std::io::stderr().is_terminal();

    let fmt_layer = match config.format {
        LogFormat::Full => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    Registry::default()
        .with(filter(config)?)
        .with(fmt_layer)
        .try_init()
        .context("could not initialize logging")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter() {
        // Only relevant when `RUST_LOG` does not take precedence
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }

        let config = TelemetryConfig {
            filter: "jwkv=notalevel".to_owned(),
            ..TelemetryConfig::default()
        };
        let error = filter(&config).unwrap_err();
        assert_eq!(
            error.to_string(),
            r#"invalid log filter "jwkv=notalevel""#
        );

        filter(&TelemetryConfig::default()).unwrap();
    }
}
