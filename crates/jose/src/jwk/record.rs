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

use super::{JsonWebKey, ValidationError, Validator};
use crate::public_key::DerivedPublicKey;

/// The outcome of validating a [`KeyRecord`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyState {
    /// The key was not validated yet
    #[default]
    Unvalidated,

    /// The key passed validation. Only RSA keys carry a public key.
    Valid { public_key: Option<DerivedPublicKey> },

    /// The key failed validation
    Invalid { error: ValidationError },
}

/// A published JSON Web Key along with the result of its validation.
///
/// A record is validated at most once: once it reached the
/// [`KeyState::Valid`] or [`KeyState::Invalid`] state, validating it again
/// returns the stored outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    key: JsonWebKey,
    state: KeyState,
}

impl From<JsonWebKey> for KeyRecord {
    fn from(key: JsonWebKey) -> Self {
        Self::new(key)
    }
}

impl KeyRecord {
    #[must_use]
    pub fn new(key: JsonWebKey) -> Self {
        Self {
            key,
            state: KeyState::Unvalidated,
        }
    }

    /// The key as it was published
    #[must_use]
    pub fn key(&self) -> &JsonWebKey {
        &self.key
    }

    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.key.kid()
    }

    #[must_use]
    pub fn state(&self) -> &KeyState {
        &self.state
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.state, KeyState::Valid { .. })
    }

    /// The public key derived during validation, if any.
    ///
    /// This is `None` until the record was successfully validated, and
    /// always `None` for EC keys.
    #[must_use]
    pub fn public_key(&self) -> Option<&DerivedPublicKey> {
        match &self.state {
            KeyState::Valid { public_key } => public_key.as_ref(),
            KeyState::Unvalidated | KeyState::Invalid { .. } => None,
        }
    }

    /// Validate the record with the default [`Validator`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        self.validate_with(&Validator::new())
    }

    /// Validate the record with the given [`Validator`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid.
    pub fn validate_with(&mut self, validator: &Validator) -> Result<(), ValidationError> {
        match &self.state {
            KeyState::Valid { .. } => return Ok(()),
            KeyState::Invalid { error } => return Err(error.clone()),
            KeyState::Unvalidated => {}
        }

        match validator.validate(&self.key) {
            Ok(public_key) => {
                self.state = KeyState::Valid { public_key };
                Ok(())
            }
            Err(error) => {
                self.state = KeyState::Invalid {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (JsonWebKey, KeyState) {
        (self.key, self.state)
    }
}
