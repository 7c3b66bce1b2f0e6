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

//! A set of validated keys, indexed by key ID

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    jwk::{JsonWebKey, JsonWebKeySet, KeyRecord, ValidationError, Validator},
    public_key::DerivedPublicKey,
};

/// What to do with a key which fails validation when loading a key set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidKeyPolicy {
    /// Log the key and leave it out of the set
    #[default]
    Skip,

    /// Fail loading the whole set
    Abort,
}

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("Key #{index} of the key set is invalid")]
    InvalidKey {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Key #{index} of the key set reuses the key ID {kid:?}")]
    DuplicateKeyId { index: usize, kid: String },
}

/// Why a key was left out of a [`StaticKeySet`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Key ID {kid:?} is already used by key #{first}")]
    DuplicateKeyId { kid: String, first: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedKey {
    /// Position of the key in the original set
    pub index: usize,
    pub key: JsonWebKey,
    pub reason: Rejection,
}

impl RejectedKey {
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.key.kid()
    }
}

/// The usable keys of a [`JsonWebKeySet`]
#[derive(Debug, Clone, Default)]
pub struct StaticKeySet {
    /// Valid records, along with their position in the original set
    records: Vec<(usize, KeyRecord)>,
    index: HashMap<String, usize>,
    rejected: Vec<RejectedKey>,
}

impl StaticKeySet {
    /// Validate every key of the set and index the valid ones by key ID.
    ///
    /// When two valid keys share a key ID, the first one is kept.
    ///
    /// # Errors
    ///
    /// With [`InvalidKeyPolicy::Abort`], returns an error on the first key
    /// which is invalid or reuses a key ID.
    #[tracing::instrument(
        name = "keystore.load",
        skip_all,
        fields(keys = set.len(), ?policy),
    )]
    pub fn new(
        set: JsonWebKeySet,
        validator: &Validator,
        policy: InvalidKeyPolicy,
    ) -> Result<Self, KeySetError> {
        let mut this = Self::default();

        for (index, key) in set.into_iter().enumerate() {
            let mut record = KeyRecord::new(key);

            if let Err(source) = record.validate_with(validator) {
                if policy == InvalidKeyPolicy::Abort {
                    return Err(KeySetError::InvalidKey { index, source });
                }

                tracing::warn!(
                    index,
                    kid = record.kid(),
                    error = &source as &dyn std::error::Error,
                    "Skipping invalid key"
                );
                let (key, _state) = record.into_parts();
                this.rejected.push(RejectedKey {
                    index,
                    key,
                    reason: source.into(),
                });
                continue;
            }

            // A valid record always has a key ID
            let Some(kid) = record.kid().map(ToOwned::to_owned) else {
                continue;
            };

            if let Some(&position) = this.index.get(&kid) {
                if policy == InvalidKeyPolicy::Abort {
                    return Err(KeySetError::DuplicateKeyId { index, kid });
                }

                let first = this.records[position].0;
                tracing::warn!(
                    index,
                    kid = kid.as_str(),
                    first,
                    "Skipping key with a duplicate key ID"
                );
                let (key, _state) = record.into_parts();
                this.rejected.push(RejectedKey {
                    index,
                    key,
                    reason: Rejection::DuplicateKeyId { kid, first },
                });
                continue;
            }

            this.index.insert(kid, this.records.len());
            this.records.push((index, record));
        }

        tracing::debug!(
            valid = this.records.len(),
            rejected = this.rejected.len(),
            "Loaded key set"
        );

        Ok(this)
    }

    /// Find a valid key by its key ID
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&KeyRecord> {
        let position = *self.index.get(kid)?;
        self.records.get(position).map(|(_index, record)| record)
    }

    /// The public key derived from the valid key with this key ID.
    ///
    /// Returns `None` if there is no such key, or if it is an EC key.
    #[must_use]
    pub fn public_key(&self, kid: &str) -> Option<&DerivedPublicKey> {
        self.find(kid)?.public_key()
    }

    /// Number of valid keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the valid keys, in the order they were published
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &KeyRecord> + '_ {
        self.records.iter().map(|(_index, record)| record)
    }

    /// Iterate over the valid keys along with their position in the original
    /// set
    pub fn iter_indexed(&self) -> impl ExactSizeIterator<Item = (usize, &KeyRecord)> + '_ {
        self.records.iter().map(|(index, record)| (*index, record))
    }

    /// Keys left out of the set, in the order they were published
    #[must_use]
    pub fn rejected(&self) -> &[RejectedKey] {
        &self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::JsonWebKey;

    fn key_set() -> JsonWebKeySet {
        [
            JsonWebKey::rsa("AQABAA", "AQAB").with_kid("a"),
            JsonWebKey::rsa("AQABAA", "AQAB"),
            JsonWebKey::ec("P-256", "x", "y").with_kid("b"),
            JsonWebKey::rsa("AQAB", "Aw==").with_kid("a"),
            JsonWebKey::rsa("AQAB", "AQAB").with_kid("c").with_use("enc"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn skip_invalid_keys() {
        let set = StaticKeySet::new(key_set(), &Validator::new(), InvalidKeyPolicy::Skip).unwrap();

        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(
            set.iter().map(KeyRecord::kid).collect::<Vec<_>>(),
            [Some("a"), Some("b")]
        );

        // The first key with a given ID wins
        assert_eq!(set.public_key("a").map(DerivedPublicKey::e), Some(65537));
        assert!(set.find("b").is_some());
        assert!(set.public_key("b").is_none());
        assert!(set.find("c").is_none());
        assert!(set.find("missing").is_none());

        assert_eq!(
            set.rejected()
                .iter()
                .map(|rejected| (rejected.index, rejected.kid(), &rejected.reason))
                .collect::<Vec<_>>(),
            [
                (
                    1,
                    None,
                    &Rejection::Invalid(ValidationError::KeyIdMissing)
                ),
                (
                    3,
                    Some("a"),
                    &Rejection::DuplicateKeyId {
                        kid: "a".to_owned(),
                        first: 0
                    }
                ),
                (
                    4,
                    Some("c"),
                    &Rejection::Invalid(ValidationError::UnsupportedUsage {
                        key_use: "enc".to_owned(),
                        kid: "c".to_owned()
                    })
                ),
            ]
        );

        // Rejected keys are kept as published
        assert_eq!(set.rejected()[1].key.e(), Some("Aw=="));
        assert_eq!(
            set.iter_indexed()
                .map(|(index, _record)| index)
                .collect::<Vec<_>>(),
            [0, 2]
        );
    }

    #[test]
    fn duplicate_refers_to_original_position() {
        let keys: JsonWebKeySet = [
            JsonWebKey::new().with_kid("x"),
            JsonWebKey::new().with_kid("y"),
            JsonWebKey::rsa("AQABAA", "AQAB").with_kid("a"),
            JsonWebKey::rsa("AQABAA", "AQAB").with_kid("a"),
        ]
        .into_iter()
        .collect();
        let set = StaticKeySet::new(keys, &Validator::new(), InvalidKeyPolicy::Skip).unwrap();

        assert_eq!(
            set.rejected()[2].reason,
            Rejection::DuplicateKeyId {
                kid: "a".to_owned(),
                first: 2
            }
        );
    }

    #[test]
    fn abort_on_invalid_key() {
        let error =
            StaticKeySet::new(key_set(), &Validator::new(), InvalidKeyPolicy::Abort).unwrap_err();
        assert!(matches!(
            error,
            KeySetError::InvalidKey {
                index: 1,
                source: ValidationError::KeyIdMissing
            }
        ));
        insta::assert_snapshot!(error, @"Key #1 of the key set is invalid");
    }

    #[test]
    fn abort_on_duplicate_key_id() {
        let keys: JsonWebKeySet = [
            JsonWebKey::rsa("AQABAA", "AQAB").with_kid("a"),
            JsonWebKey::rsa("AQAB", "AQAB").with_kid("a"),
        ]
        .into_iter()
        .collect();

        let error = StaticKeySet::new(keys, &Validator::new(), InvalidKeyPolicy::Abort).unwrap_err();
        assert!(matches!(
            error,
            KeySetError::DuplicateKeyId { index: 1, ref kid } if kid == "a"
        ));
    }

    #[test]
    fn require_public_key_rejects_ec_keys() {
        let set = StaticKeySet::new(
            key_set(),
            &Validator::new().require_public_key(true),
            InvalidKeyPolicy::Skip,
        )
        .unwrap();

        assert_eq!(set.len(), 1);
        assert!(set.find("b").is_none());
        assert!(matches!(
            set.rejected()[1].reason,
            Rejection::Invalid(ValidationError::TypeNotImplemented { .. })
        ));
    }

    #[test]
    fn empty_set() {
        let set = StaticKeySet::new(
            JsonWebKeySet::default(),
            &Validator::new(),
            InvalidKeyPolicy::Abort,
        )
        .unwrap();
        assert!(set.is_empty());
        assert!(set.rejected().is_empty());
    }
}
