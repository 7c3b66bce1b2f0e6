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

//! Decoding of the base64 text found in published JSON Web Keys.
//!
//! RFC 7518 mandates unpadded base64url for key parameters, but identity
//! providers in the wild also publish padded values and values using the
//! standard alphabet. [`decode_lenient`] accepts all of those.

use std::borrow::Cow;

use base64ct::Encoding;

const PAD: char = '=';

/// The two base64 alphabets a key parameter may be encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alphabet {
    /// The standard alphabet, with `+` and `/`
    Standard,

    /// The URL-safe alphabet, with `-` and `_`
    UrlSafe,
}

impl Alphabet {
    /// Guess the alphabet used by some encoded text.
    ///
    /// `+` and `/` only exist in the standard alphabet; anything else is
    /// treated as URL-safe. Text mixing both alphabets is reported as
    /// standard, and fails to decode.
    #[must_use]
    pub fn detect(encoded: &str) -> Self {
        if encoded.contains(|c| matches!(c, '+' | '/')) {
            Self::Standard
        } else {
            Self::UrlSafe
        }
    }

    /// Decode padded text with this alphabet.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid padded base64 in this
    /// alphabet.
    pub fn decode(self, encoded: &str) -> Result<Vec<u8>, base64ct::Error> {
        match self {
            Self::Standard => base64ct::Base64::decode_vec(encoded),
            Self::UrlSafe => base64ct::Base64Url::decode_vec(encoded),
        }
    }
}

/// Right-pad `encoded` with `=` until its length is a multiple of 4.
#[must_use]
pub fn pad(encoded: &str) -> Cow<'_, str> {
    match encoded.len() % 4 {
        0 => Cow::Borrowed(encoded),
        rem => {
            let mut padded = String::with_capacity(encoded.len() + 4 - rem);
            padded.push_str(encoded);
            padded.extend(std::iter::repeat(PAD).take(4 - rem));
            Cow::Owned(padded)
        }
    }
}

/// Decode text which may be padded or not, in either alphabet.
///
/// # Errors
///
/// Returns an error if the padded text is not valid base64 in the detected
/// alphabet.
pub fn decode_lenient(encoded: &str) -> Result<Vec<u8>, base64ct::Error> {
    let padded = pad(encoded);
    Alphabet::detect(&padded).decode(&padded)
}

/// Decode padded text in the standard alphabet.
///
/// # Errors
///
/// Returns an error if the text is not valid padded standard base64.
pub fn decode_standard(encoded: &str) -> Result<Vec<u8>, base64ct::Error> {
    Alphabet::Standard.decode(encoded)
}
