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

use std::{convert::Infallible, str::FromStr};

use jwkv_iana::jose::{
    JsonWebKeyEcEllipticCurve, JsonWebKeyType, JsonWebKeyUse, JsonWebSignatureAlg,
};
use rsa::BigUint;
use thiserror::Error;

use super::JsonWebKey;
use crate::public_key::{exponent_from_be_bytes, DerivedPublicKey, EXPONENT_WIDTH};

/// Reasons why a JSON Web Key was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Key has no key ID")]
    KeyIdMissing,

    #[error("Key {kid:?} has no key type")]
    TypeMissing { kid: String },

    #[error("Key {kid:?} has unsupported key type {kty:?}")]
    UnsupportedType { kty: String, kid: String },

    #[error("EC key {kid:?} has no curve")]
    CurveMissing { kid: String },

    #[error("EC key {kid:?} uses unsupported curve {crv:?}")]
    UnsupportedCurve { crv: String, kid: String },

    #[error("RSA key {kid:?} uses unsupported algorithm {alg:?}")]
    UnsupportedAlgorithm { alg: String, kid: String },

    #[error("Key {kid:?} has unsupported use {key_use:?}")]
    UnsupportedUsage { key_use: String, kid: String },

    #[error("RSA key {kid:?} has no exponent")]
    ExponentMissing { kid: String },

    #[error("RSA key {kid:?} has no modulus")]
    ModulusMissing { kid: String },

    #[error("Could not decode the modulus of RSA key {kid:?}: {modulus:?}")]
    ModulusDecodeFailed {
        kid: String,
        modulus: String,
        #[source]
        inner: base64ct::Error,
    },

    #[error("Could not decode the exponent of RSA key {kid:?}")]
    ExponentDecodeFailed {
        kid: String,
        #[source]
        inner: base64ct::Error,
    },

    #[error(
        "Exponent of RSA key {kid:?} is {length} bytes long, more than the {width} bytes supported",
        width = EXPONENT_WIDTH
    )]
    ExponentReconstructionFailed { kid: String, length: usize },

    #[error("No public key can be derived from key {kid:?} of type {kty}")]
    TypeNotImplemented { kid: String, kty: String },
}

impl ValidationError {
    /// The ID of the rejected key, if it had one
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        match self {
            Self::KeyIdMissing => None,
            Self::TypeMissing { kid }
            | Self::UnsupportedType { kid, .. }
            | Self::CurveMissing { kid }
            | Self::UnsupportedCurve { kid, .. }
            | Self::UnsupportedAlgorithm { kid, .. }
            | Self::UnsupportedUsage { kid, .. }
            | Self::ExponentMissing { kid }
            | Self::ModulusMissing { kid }
            | Self::ModulusDecodeFailed { kid, .. }
            | Self::ExponentDecodeFailed { kid, .. }
            | Self::ExponentReconstructionFailed { kid, .. }
            | Self::TypeNotImplemented { kid, .. } => Some(kid),
        }
    }
}

fn parse<T: FromStr<Err = Infallible>>(value: &str) -> T {
    match value.parse() {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// Checks JSON Web Keys and derives public keys from them.
///
/// The checks, in order, each one stopping at the first failure:
///
///  1. the key must have a key ID;
///  2. the key type must be `RSA` or `EC`. RSA keys may only advertise the
///     `RS256`, `RS384` or `RS512` algorithms, EC keys must be on the `P-256`
///     or `P-521` curve;
///  3. the key use, if present, must be `sig`;
///  4. for RSA keys, the exponent and modulus must be present and decodable.
///
/// EC keys are only checked structurally, and no public key is derived from
/// them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    require_public_key: bool,
}

impl Validator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            require_public_key: false,
        }
    }

    /// Reject keys which pass all the checks but from which no public key is
    /// derived, with [`ValidationError::TypeNotImplemented`]
    #[must_use]
    pub const fn require_public_key(mut self, require_public_key: bool) -> Self {
        self.require_public_key = require_public_key;
        self
    }

    /// Validate a key, returning the derived public key if there is one.
    ///
    /// # Errors
    ///
    /// Returns the first check the key failed.
    pub fn validate(&self, key: &JsonWebKey) -> Result<Option<DerivedPublicKey>, ValidationError> {
        let kid = key.kid().ok_or(ValidationError::KeyIdMissing)?;

        let kty = check_type(key, kid)?;

        match key.key_use().map(parse::<JsonWebKeyUse>) {
            None | Some(JsonWebKeyUse::Sig) => {}
            Some(key_use) => {
                return Err(ValidationError::UnsupportedUsage {
                    key_use: key_use.to_string(),
                    kid: kid.to_owned(),
                })
            }
        }

        let public_key = match &kty {
            JsonWebKeyType::Rsa => Some(derive_rsa(key, kid)?),
            JsonWebKeyType::Ec => None,
            other => {
                return Err(ValidationError::TypeNotImplemented {
                    kid: kid.to_owned(),
                    kty: other.to_string(),
                })
            }
        };

        if public_key.is_none() && self.require_public_key {
            return Err(ValidationError::TypeNotImplemented {
                kid: kid.to_owned(),
                kty: kty.to_string(),
            });
        }

        Ok(public_key)
    }
}

/// Validate a key with the default [`Validator`]
///
/// # Errors
///
/// Returns the first check the key failed.
pub fn validate(key: &JsonWebKey) -> Result<Option<DerivedPublicKey>, ValidationError> {
    Validator::new().validate(key)
}

fn check_type(key: &JsonWebKey, kid: &str) -> Result<JsonWebKeyType, ValidationError> {
    let Some(raw_kty) = key.kty() else {
        return Err(ValidationError::TypeMissing {
            kid: kid.to_owned(),
        });
    };

    let kty: JsonWebKeyType = parse(raw_kty);
    match kty {
        JsonWebKeyType::Rsa => match key.alg().map(parse::<JsonWebSignatureAlg>) {
            None
            | Some(
                JsonWebSignatureAlg::Rs256 | JsonWebSignatureAlg::Rs384 | JsonWebSignatureAlg::Rs512,
            ) => {}
            Some(alg) => {
                return Err(ValidationError::UnsupportedAlgorithm {
                    alg: alg.to_string(),
                    kid: kid.to_owned(),
                })
            }
        },

        JsonWebKeyType::Ec => match key.crv().map(parse::<JsonWebKeyEcEllipticCurve>) {
            Some(JsonWebKeyEcEllipticCurve::P256 | JsonWebKeyEcEllipticCurve::P521) => {}
            Some(crv) => {
                return Err(ValidationError::UnsupportedCurve {
                    crv: crv.to_string(),
                    kid: kid.to_owned(),
                })
            }
            None => {
                return Err(ValidationError::CurveMissing {
                    kid: kid.to_owned(),
                })
            }
        },

        _ => {
            return Err(ValidationError::UnsupportedType {
                kty: raw_kty.to_owned(),
                kid: kid.to_owned(),
            })
        }
    }

    Ok(kty)
}

fn derive_rsa(key: &JsonWebKey, kid: &str) -> Result<DerivedPublicKey, ValidationError> {
    // The exponent is checked first
    let e = key.e().ok_or_else(|| ValidationError::ExponentMissing {
        kid: kid.to_owned(),
    })?;

    let n = key.n().ok_or_else(|| ValidationError::ModulusMissing {
        kid: kid.to_owned(),
    })?;

    let modulus =
        crate::base64::decode_lenient(n).map_err(|inner| ValidationError::ModulusDecodeFailed {
            kid: kid.to_owned(),
            modulus: n.to_owned(),
            inner,
        })?;
    let n = BigUint::from_bytes_be(&modulus);

    let exponent =
        crate::base64::decode_standard(e).map_err(|inner| ValidationError::ExponentDecodeFailed {
            kid: kid.to_owned(),
            inner,
        })?;
    let e = exponent_from_be_bytes(&exponent).ok_or_else(|| {
        ValidationError::ExponentReconstructionFailed {
            kid: kid.to_owned(),
            length: exponent.len(),
        }
    })?;

    Ok(DerivedPublicKey::new(n, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64url of 0x01 0x00 0x01 0x00
    const SMALL_N: &str = "AQABAA";

    fn rsa_key(kid: &str) -> JsonWebKey {
        JsonWebKey::rsa(SMALL_N, "AQAB").with_kid(kid)
    }

    #[test]
    fn derive_from_rsa_key() {
        let key = validate(&rsa_key("k1")).unwrap().unwrap();
        assert_eq!(key.n(), &BigUint::from(0x0100_0100_u32));
        assert_eq!(key.e(), 65537);
    }

    #[test]
    fn missing_kid() {
        let key = JsonWebKey::rsa(SMALL_N, "AQAB");
        assert_eq!(validate(&key), Err(ValidationError::KeyIdMissing));

        let key = JsonWebKey::rsa(SMALL_N, "AQAB").with_kid("");
        assert_eq!(validate(&key), Err(ValidationError::KeyIdMissing));

        // Even if everything else is wrong
        let key = JsonWebKey::new().with_kty("oct").with_use("enc");
        assert_eq!(validate(&key), Err(ValidationError::KeyIdMissing));
    }

    #[test]
    fn missing_or_unsupported_type() {
        let key = JsonWebKey::new().with_kid("k");
        assert_eq!(
            validate(&key),
            Err(ValidationError::TypeMissing {
                kid: "k".to_owned()
            })
        );

        let key = JsonWebKey::new().with_kid("k").with_kty("OKP");
        assert_eq!(
            validate(&key),
            Err(ValidationError::UnsupportedType {
                kty: "OKP".to_owned(),
                kid: "k".to_owned()
            })
        );

        let key = rsa_key("k").with_kty("rsa");
        assert_eq!(
            validate(&key),
            Err(ValidationError::UnsupportedType {
                kty: "rsa".to_owned(),
                kid: "k".to_owned()
            })
        );
    }

    #[test]
    fn rsa_algorithms() {
        for alg in ["RS256", "RS384", "RS512"] {
            assert!(validate(&rsa_key("k").with_alg(alg)).is_ok(), "{alg}");
        }

        for alg in ["PS256", "ES256", "HS256", "none"] {
            assert_eq!(
                validate(&rsa_key("k").with_alg(alg)),
                Err(ValidationError::UnsupportedAlgorithm {
                    alg: alg.to_owned(),
                    kid: "k".to_owned()
                })
            );
        }
    }

    #[test]
    fn ec_curves() {
        let key = JsonWebKey::ec("P-256", "x", "y").with_kid("k4");
        assert_eq!(validate(&key), Ok(None));

        let key = JsonWebKey::ec("P-521", "x", "y").with_kid("k4");
        assert_eq!(validate(&key), Ok(None));

        let key = JsonWebKey::ec("", "x", "y").with_kid("k3");
        assert_eq!(
            validate(&key),
            Err(ValidationError::CurveMissing {
                kid: "k3".to_owned()
            })
        );

        let key = JsonWebKey::ec("P-384", "x", "y").with_kid("k5");
        assert_eq!(
            validate(&key),
            Err(ValidationError::UnsupportedCurve {
                crv: "P-384".to_owned(),
                kid: "k5".to_owned()
            })
        );
    }

    #[test]
    fn ec_keys_ignore_alg() {
        let key = JsonWebKey::ec("P-256", "x", "y")
            .with_kid("k")
            .with_alg("ES256");
        assert_eq!(validate(&key), Ok(None));
    }

    #[test]
    fn key_use() {
        assert!(validate(&rsa_key("k").with_use("sig")).is_ok());
        assert_eq!(
            validate(&rsa_key("k").with_use("enc")),
            Err(ValidationError::UnsupportedUsage {
                key_use: "enc".to_owned(),
                kid: "k".to_owned()
            })
        );

        // The type is checked before the use
        let key = rsa_key("k").with_alg("PS256").with_use("enc");
        assert!(matches!(
            validate(&key),
            Err(ValidationError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn exponent_is_checked_before_modulus() {
        let key = JsonWebKey::new().with_kid("k2").with_kty("RSA");
        assert_eq!(
            validate(&key),
            Err(ValidationError::ExponentMissing {
                kid: "k2".to_owned()
            })
        );

        let key = JsonWebKey::rsa("", "AQAB").with_kid("k2");
        assert_eq!(
            validate(&key),
            Err(ValidationError::ModulusMissing {
                kid: "k2".to_owned()
            })
        );
    }

    #[test]
    fn bad_modulus() {
        let key = JsonWebKey::rsa("+_+_", "AQAB").with_kid("k");
        let error = validate(&key).unwrap_err();
        assert!(matches!(
            error,
            ValidationError::ModulusDecodeFailed { ref modulus, .. } if modulus == "+_+_"
        ));
        insta::assert_snapshot!(error, @r###"Could not decode the modulus of RSA key "k": "+_+_""###);

        // A single leftover character can't be padded into valid base64
        let key = JsonWebKey::rsa("AQABA", "AQAB").with_kid("k");
        assert!(matches!(
            validate(&key),
            Err(ValidationError::ModulusDecodeFailed { .. })
        ));
    }

    #[test]
    fn bad_exponent() {
        // The exponent must use the padded standard alphabet
        let key = JsonWebKey::rsa(SMALL_N, "AQABAA").with_kid("k");
        assert!(matches!(
            validate(&key),
            Err(ValidationError::ExponentDecodeFailed { .. })
        ));

        // 9 bytes
        let key = JsonWebKey::rsa(SMALL_N, "AAAAAAAAAAAB").with_kid("k");
        let error = validate(&key).unwrap_err();
        assert_eq!(
            error,
            ValidationError::ExponentReconstructionFailed {
                kid: "k".to_owned(),
                length: 9
            }
        );
        insta::assert_snapshot!(error, @r###"Exponent of RSA key "k" is 9 bytes long, more than the 8 bytes supported"###);
    }

    #[test]
    fn require_public_key() {
        let validator = Validator::new().require_public_key(true);

        let key = JsonWebKey::ec("P-256", "x", "y").with_kid("k4");
        assert_eq!(
            validator.validate(&key),
            Err(ValidationError::TypeNotImplemented {
                kid: "k4".to_owned(),
                kty: "EC".to_owned()
            })
        );

        assert!(validator.validate(&rsa_key("k1")).unwrap().is_some());
    }

    #[test]
    fn error_kid() {
        assert_eq!(ValidationError::KeyIdMissing.kid(), None);
        let error = validate(&rsa_key("k").with_use("enc")).unwrap_err();
        assert_eq!(error.kid(), Some("k"));
    }
}
