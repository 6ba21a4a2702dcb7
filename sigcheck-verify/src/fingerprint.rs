// Copyright 2024 Google LLC
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


use std::{fmt, str::FromStr};

use sha2::{Digest, Sha256};
use sigcheck_common::*;

// Hex characters in a SHA-256 digest
const FINGERPRINT_LEN: usize = 64;

/// SHA-256 of a certificate, as 64 uppercase hex characters with no
/// separators. This is the form `apksigner` and `keytool` print once the
/// colons are removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hashes DER bytes exactly as they are stored in the signing block.
    pub fn of(der: &[u8]) -> Fingerprint {
        Fingerprint(hex::encode_upper(Sha256::digest(der)))
    }

    /// Parses a configured fingerprint.
    ///
    /// Either case is accepted, with or without `:` between bytes.
    pub fn parse(text: &str) -> Result<Fingerprint> {
        let hex: String = text.trim().chars().filter(|c| *c != ':').collect();
        if hex.len() != FINGERPRINT_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SigCheckError::InvalidFingerprint(text.into()));
        }
        Ok(Fingerprint(hex.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = SigCheckError;

    fn from_str(s: &str) -> Result<Fingerprint> {
        Fingerprint::parse(s)
    }
}
