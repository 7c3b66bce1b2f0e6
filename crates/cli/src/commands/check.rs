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

use std::{
    io::{Read, Write},
    process::ExitCode,
};

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use jwkv_config::{ConfigurationSectionExt, InvalidKeyPolicyConfig, KeysConfig};
use jwkv_jose::{
    jwk::KeyRecord,
    keystore::{InvalidKeyPolicy, RejectedKey, StaticKeySet},
    JsonWebKeySet, Validator,
};
use serde::Serialize;
use tracing::{info, info_span, warn};

fn map_policy(config: InvalidKeyPolicyConfig) -> InvalidKeyPolicy {
    match config {
        InvalidKeyPolicyConfig::Skip => InvalidKeyPolicy::Skip,
        InvalidKeyPolicyConfig::Abort => InvalidKeyPolicy::Abort,
    }
}

fn validator_from_config(config: &KeysConfig) -> Validator {
    Validator::new().require_public_key(config.require_public_key)
}

#[derive(Parser, Debug)]
pub(super) struct Options {
    /// Path to the JWK Set document, `-` to read it from the standard input
    #[arg(default_value = "-")]
    input: Utf8PathBuf,

    /// Print a JSON report instead of one line per key
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Valid,
    Rejected,
}

/// The outcome for a single key of the set
#[derive(Debug, Serialize)]
struct KeyReport<'a> {
    index: usize,
    kid: Option<&'a str>,
    kty: Option<&'a str>,
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    bits: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exponent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> KeyReport<'a> {
    fn valid(index: usize, record: &'a KeyRecord) -> Self {
        let public_key = record.public_key();
        Self {
            index,
            kid: record.kid(),
            kty: record.key().kty(),
            status: Status::Valid,
            bits: public_key.map(jwkv_jose::DerivedPublicKey::bits),
            exponent: public_key.map(jwkv_jose::DerivedPublicKey::e),
            error: None,
        }
    }

    fn rejected(rejected: &'a RejectedKey) -> Self {
        Self {
            index: rejected.index,
            kid: rejected.kid(),
            kty: rejected.key.kty(),
            status: Status::Rejected,
            bits: None,
            exponent: None,
            error: Some(rejected.reason.to_string()),
        }
    }

    fn line(&self) -> String {
        let kid = self.kid.unwrap_or("-");
        let kty = self.kty.unwrap_or("-");
        let details = match (self.status, self.bits, self.exponent, &self.error) {
            (Status::Valid, Some(bits), Some(exponent), _) => {
                format!("valid: {bits} bits, e={exponent}")
            }
            (Status::Valid, ..) => "valid: no public key".to_owned(),
            (Status::Rejected, _, _, error) => {
                format!("rejected: {}", error.as_deref().unwrap_or_default())
            }
        };
        format!("{kid} [{kty}] {details}")
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    valid: usize,
    rejected: usize,
    keys: Vec<KeyReport<'a>>,
}

impl<'a> Report<'a> {
    fn new(set: &'a StaticKeySet) -> Self {
        let mut keys: Vec<KeyReport<'a>> = set
            .iter_indexed()
            .map(|(index, record)| KeyReport::valid(index, record))
            .chain(set.rejected().iter().map(KeyReport::rejected))
            .collect();
        keys.sort_by_key(|key| key.index);

        Self {
            valid: set.len(),
            rejected: set.rejected().len(),
            keys,
        }
    }
}

impl Options {
    fn read_input(&self) -> anyhow::Result<String> {
        if self.input.as_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("could not read the key set from the standard input")?;
            Ok(buf)
        } else {
            std::fs::read_to_string(&self.input)
                .with_context(|| format!("could not read the key set from {}", self.input))
        }
    }

    pub fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let _span = info_span!("cli.check", input = %self.input).entered();

        let config = KeysConfig::extract_or_default(figment)?;
        let validator = validator_from_config(&config);
        let policy = map_policy(config.on_invalid);

        let document = self.read_input()?;
        let jwks: JsonWebKeySet =
            serde_json::from_str(&document).context("could not parse the key set")?;

        let set = StaticKeySet::new(jwks, &validator, policy)
            .context("the key set was rejected")?;

        let report = Report::new(&set);
        let mut stdout = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        } else {
            for key in &report.keys {
                writeln!(stdout, "{}", key.line())?;
            }
        }

        if set.len() < config.min_valid_keys {
            warn!(
                valid = set.len(),
                min_valid_keys = config.min_valid_keys,
                "Not enough usable keys in the key set"
            );
            return Ok(ExitCode::FAILURE);
        }

        info!(
            valid = set.len(),
            rejected = set.rejected().len(),
            "Key set looks good"
        );
        Ok(ExitCode::SUCCESS)
    }
}
