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

//! Ref: <https://www.rfc-editor.org/rfc/rfc7517.html>

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

mod record;
mod validate;

pub use self::{
    record::{KeyRecord, KeyState},
    validate::{validate, ValidationError, Validator},
};

/// A JSON Web Key, exactly as it was published.
///
/// Nothing is checked at deserialization time: members are kept as text so
/// that a malformed key can be reported with its raw values. An empty member
/// is treated the same as a missing one.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    #[serde(default)]
    kty: Option<String>,

    #[serde(default)]
    kid: Option<String>,

    #[serde(default)]
    alg: Option<String>,

    #[serde(default)]
    r#use: Option<String>,

    #[serde(default)]
    nbf: Option<String>,

    #[serde(default)]
    n: Option<String>,

    #[serde(default)]
    e: Option<String>,

    #[serde(default)]
    crv: Option<String>,

    #[serde(default)]
    x: Option<String>,

    #[serde(default)]
    y: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

impl JsonWebKey {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building an RSA key with the given base64-encoded modulus and
    /// exponent
    #[must_use]
    pub fn rsa(n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kty: Some("RSA".to_owned()),
            n: Some(n.into()),
            e: Some(e.into()),
            ..Self::default()
        }
    }

    /// Start building an elliptic curve key
    #[must_use]
    pub fn ec(crv: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kty: Some("EC".to_owned()),
            crv: Some(crv.into()),
            x: Some(x.into()),
            y: Some(y.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_kty(mut self, kty: impl Into<String>) -> Self {
        self.kty = Some(kty.into());
        self
    }

    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    #[must_use]
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    #[must_use]
    pub fn with_use(mut self, value: impl Into<String>) -> Self {
        self.r#use = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_nbf(mut self, nbf: impl Into<String>) -> Self {
        self.nbf = Some(nbf.into());
        self
    }

    #[must_use]
    pub fn kty(&self) -> Option<&str> {
        non_empty(self.kty.as_deref())
    }

    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        non_empty(self.kid.as_deref())
    }

    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        non_empty(self.alg.as_deref())
    }

    /// The intended use of the key, `sig` or `enc`
    #[must_use]
    pub fn key_use(&self) -> Option<&str> {
        non_empty(self.r#use.as_deref())
    }

    /// The `nbf` member, which some providers publish; it is not interpreted
    #[must_use]
    pub fn nbf(&self) -> Option<&str> {
        non_empty(self.nbf.as_deref())
    }

    /// The RSA modulus, as published
    #[must_use]
    pub fn n(&self) -> Option<&str> {
        non_empty(self.n.as_deref())
    }

    /// The RSA public exponent, as published
    #[must_use]
    pub fn e(&self) -> Option<&str> {
        non_empty(self.e.as_deref())
    }

    #[must_use]
    pub fn crv(&self) -> Option<&str> {
        non_empty(self.crv.as_deref())
    }

    #[must_use]
    pub fn x(&self) -> Option<&str> {
        non_empty(self.x.as_deref())
    }

    #[must_use]
    pub fn y(&self) -> Option<&str> {
        non_empty(self.y.as_deref())
    }
}

/// A JSON Web Key Set, as served by a `jwks_uri`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

impl std::ops::Deref for JsonWebKeySet {
    type Target = Vec<JsonWebKey>;

    fn deref(&self) -> &Self::Target {
        &self.keys
    }
}

impl IntoIterator for JsonWebKeySet {
    type Item = JsonWebKey;
    type IntoIter = std::vec::IntoIter<JsonWebKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl FromIterator<JsonWebKey> for JsonWebKeySet {
    fn from_iter<T: IntoIterator<Item = JsonWebKey>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl JsonWebKeySet {
    #[must_use]
    pub fn new(keys: Vec<JsonWebKey>) -> Self {
        Self { keys }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_keeps_raw_values() {
        let key: JsonWebKey = serde_json::from_str(
            r#"{
                "kty": "RSA",
                "kid": "abc",
                "alg": "RS256",
                "use": "sig",
                "n": "AQAB",
                "e": "AQAB",
                "x5t": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(key.kty(), Some("RSA"));
        assert_eq!(key.kid(), Some("abc"));
        assert_eq!(key.alg(), Some("RS256"));
        assert_eq!(key.key_use(), Some("sig"));
        assert_eq!(key.n(), Some("AQAB"));
        assert_eq!(key.crv(), None);
    }

    #[test]
    fn empty_members_are_absent() {
        let key: JsonWebKey =
            serde_json::from_str(r#"{"kty": "", "kid": "", "crv": ""}"#).unwrap();
        assert_eq!(key.kty(), None);
        assert_eq!(key.kid(), None);
        assert_eq!(key.crv(), None);
    }

    #[test]
    fn serialize_skips_missing_members() {
        let key = JsonWebKey::rsa("AQAB", "AQAB").with_kid("k");
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            serde_json::json!({"kty": "RSA", "kid": "k", "n": "AQAB", "e": "AQAB"}),
        );
    }

    #[test]
    fn deserialize_key_set() {
        let jwks: JsonWebKeySet = serde_json::from_str(
            r#"{"keys": [{"kty": "RSA", "kid": "a"}, {"kty": "EC", "kid": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(jwks.len(), 2);
        assert_eq!(jwks[1].kid(), Some("b"));
    }
}
