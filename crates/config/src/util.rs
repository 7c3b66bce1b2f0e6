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

use camino::Utf8Path;
use figment::{
    providers::{Env, Format, Yaml},
    Figment, Profile,
};
use serde::de::DeserializeOwned;

/// Prefix of the environment variables overriding the configuration files
pub const ENV_PREFIX: &str = "JWKV_";

/// Build a [`Figment`] from a list of YAML files and the environment.
///
/// Files are merged in order, each one overriding the previous ones. Missing
/// files are ignored. Environment variables come last: `JWKV_KEYS__ON_INVALID`
/// overrides `keys.on_invalid`.
#[must_use]
pub fn load_figment<P: AsRef<Utf8Path>>(paths: &[P]) -> Figment {
    paths
        .iter()
        .fold(Figment::new(), |figment, path| {
            figment.merge(Yaml::file(path.as_ref().as_std_path()))
        })
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Point an error at a field of a configuration section
pub(crate) fn error_on_field(
    figment: &Figment,
    section: &'static str,
    field: &'static str,
    mut error: figment::Error,
) -> figment::Error {
    error.metadata = figment.find_metadata(section).cloned();
    error.profile = Some(Profile::Default);
    error.path = vec![section.to_owned(), field.to_owned()];
    error
}

/// A part of the configuration, which can be loaded on its own.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives relative to the root, if not the root itself
    const PATH: Option<&'static str> = None;

    /// Check the values which deserialization alone can't check
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), figment::Error> {
        Ok(())
    }

    /// Extract and validate the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing or invalid
    fn extract(figment: &Figment) -> Result<Self, figment::Error> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Extract a [`ConfigurationSection`] which has a sensible default.
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Extract and validate the section, falling back to its default value if
    /// it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is present but invalid
    fn extract_or_default(figment: &Figment) -> Result<Self, figment::Error> {
        match Self::PATH {
            Some(path) if !figment.contains(path) => Ok(Self::default()),
            _ => Self::extract(figment),
        }
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}
