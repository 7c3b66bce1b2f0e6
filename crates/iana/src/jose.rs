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

//! Enums from the "JSON Object Signing and Encryption" IANA registry
//! See <https://www.iana.org/assignments/jose/jose.xhtml>

/// Implements `Display`, `FromStr` and (optionally) serde traits for a
/// registry enum with an `Unknown(String)` fallback variant.
macro_rules! registry_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $value),)+
                    Self::Unknown(value) => write!(f, "{value}"),
                }
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    value => Ok(Self::Unknown(value.to_owned())),
                }
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                core::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::ser::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }
    };
}

/// JSON Web Signature "alg" parameter
///
/// Source: <https://www.iana.org/assignments/jose/web-signature-encryption-algorithms.csv>
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum JsonWebSignatureAlg {
    /// HMAC using SHA-256
    Hs256,

    /// HMAC using SHA-384
    Hs384,

    /// HMAC using SHA-512
    Hs512,

    /// RSASSA-PKCS1-v1_5 using SHA-256
    Rs256,

    /// RSASSA-PKCS1-v1_5 using SHA-384
    Rs384,

    /// RSASSA-PKCS1-v1_5 using SHA-512
    Rs512,

    /// ECDSA using P-256 and SHA-256
    Es256,

    /// ECDSA using P-384 and SHA-384
    Es384,

    /// ECDSA using P-521 and SHA-512
    Es512,

    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256
    Ps256,

    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384
    Ps384,

    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512
    Ps512,

    /// No digital signature or MAC performed
    None,

    /// EdDSA signature algorithms
    EdDsa,

    /// ECDSA using secp256k1 curve and SHA-256
    Es256K,

    /// An unknown value.
    Unknown(String),
}

registry_enum!(JsonWebSignatureAlg {
    Hs256 => "HS256",
    Hs384 => "HS384",
    Hs512 => "HS512",
    Rs256 => "RS256",
    Rs384 => "RS384",
    Rs512 => "RS512",
    Es256 => "ES256",
    Es384 => "ES384",
    Es512 => "ES512",
    Ps256 => "PS256",
    Ps384 => "PS384",
    Ps512 => "PS512",
    None => "none",
    EdDsa => "EdDSA",
    Es256K => "ES256K",
});

/// JSON Web Key Type
///
/// Source: <https://www.iana.org/assignments/jose/web-key-types.csv>
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum JsonWebKeyType {
    /// Elliptic Curve
    Ec,

    /// RSA
    Rsa,

    /// Octet sequence
    Oct,

    /// Octet string key pairs
    Okp,

    /// An unknown value.
    Unknown(String),
}

registry_enum!(JsonWebKeyType {
    Ec => "EC",
    Rsa => "RSA",
    Oct => "oct",
    Okp => "OKP",
});

/// JSON Web Key EC Elliptic Curve
///
/// Source: <https://www.iana.org/assignments/jose/web-key-elliptic-curve.csv>
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum JsonWebKeyEcEllipticCurve {
    /// P-256 Curve
    P256,

    /// P-384 Curve
    P384,

    /// P-521 Curve
    P521,

    /// SECG secp256k1 curve
    Secp256K1,

    /// An unknown value.
    Unknown(String),
}

registry_enum!(JsonWebKeyEcEllipticCurve {
    P256 => "P-256",
    P384 => "P-384",
    P521 => "P-521",
    Secp256K1 => "secp256k1",
});

/// JSON Web Key Use
///
/// Source: <https://www.iana.org/assignments/jose/web-key-use.csv>
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum JsonWebKeyUse {
    /// Digital Signature or MAC
    Sig,

    /// Encryption
    Enc,

    /// An unknown value.
    Unknown(String),
}

registry_enum!(JsonWebKeyUse {
    Sig => "sig",
    Enc => "enc",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_values() {
        assert_eq!("RSA".parse(), Ok(JsonWebKeyType::Rsa));
        assert_eq!("EC".parse(), Ok(JsonWebKeyType::Ec));
        assert_eq!("RS384".parse(), Ok(JsonWebSignatureAlg::Rs384));
        assert_eq!("P-521".parse(), Ok(JsonWebKeyEcEllipticCurve::P521));
        assert_eq!("sig".parse(), Ok(JsonWebKeyUse::Sig));
    }

    #[test]
    fn values_are_case_sensitive() {
        assert_eq!(
            "rsa".parse(),
            Ok(JsonWebKeyType::Unknown("rsa".to_owned()))
        );
        assert_eq!(
            "rs256".parse(),
            Ok(JsonWebSignatureAlg::Unknown("rs256".to_owned()))
        );
        assert_eq!(
            "p-256".parse(),
            Ok(JsonWebKeyEcEllipticCurve::Unknown("p-256".to_owned()))
        );
    }

    #[test]
    fn display_round_trips_unknown_values() {
        let alg = JsonWebSignatureAlg::Unknown("XY512".to_owned());
        assert_eq!(alg.to_string(), "XY512");
        assert_eq!(JsonWebKeyEcEllipticCurve::Secp256K1.to_string(), "secp256k1");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_registry_values() {
        let kty: JsonWebKeyType = serde_json::from_str(r#""OKP""#).unwrap();
        assert_eq!(kty, JsonWebKeyType::Okp);
        assert_eq!(
            serde_json::to_string(&JsonWebKeyUse::Enc).unwrap(),
            r#""enc""#
        );
    }
}
