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

//! Validation of the JSON Web Keys an identity provider publishes on its
//! `jwks_uri`, and derivation of RSA public keys from them.

#![allow(clippy::module_name_repetitions)]

pub mod base64;
pub mod jwk;
pub mod keystore;
pub mod public_key;

pub use self::{
    jwk::{JsonWebKey, JsonWebKeySet, KeyRecord, KeyState, ValidationError, Validator},
    keystore::{InvalidKeyPolicy, KeySetError, StaticKeySet},
    public_key::DerivedPublicKey,
};
