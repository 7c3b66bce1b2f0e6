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

use rsa::{BigUint, RsaPublicKey};

/// Width, in bytes, of the integer the public exponent is read into
pub(crate) const EXPONENT_WIDTH: usize = 8;

/// An RSA public key derived from a validated JSON Web Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPublicKey {
    n: BigUint,
    e: u64,
}

impl DerivedPublicKey {
    pub(crate) fn new(n: BigUint, e: u64) -> Self {
        Self { n, e }
    }

    /// The modulus
    #[must_use]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The public exponent
    #[must_use]
    pub const fn e(&self) -> u64 {
        self.e
    }

    /// Size of the modulus, in bits
    #[must_use]
    pub fn bits(&self) -> usize {
        self.n.bits()
    }
}

/// Read a big-endian unsigned integer of at most [`EXPONENT_WIDTH`] bytes.
///
/// Shorter inputs are left-padded with zeroes, so `[1, 0, 1]` reads as 65537.
/// Returns `None` if the input is too long.
pub(crate) fn exponent_from_be_bytes(bytes: &[u8]) -> Option<u64> {
    let offset = EXPONENT_WIDTH.checked_sub(bytes.len())?;
    let mut buf = [0; EXPONENT_WIDTH];
    buf[offset..].copy_from_slice(bytes);
    Some(u64::from_be_bytes(buf))
}

impl TryFrom<&DerivedPublicKey> for RsaPublicKey {
    type Error = rsa::errors::Error;

    fn try_from(key: &DerivedPublicKey) -> Result<Self, Self::Error> {
        RsaPublicKey::new(key.n.clone(), BigUint::from(key.e))
    }
}

impl TryFrom<DerivedPublicKey> for RsaPublicKey {
    type Error = rsa::errors::Error;

    fn try_from(key: DerivedPublicKey) -> Result<Self, Self::Error> {
        RsaPublicKey::new(key.n, BigUint::from(key.e))
    }
}
