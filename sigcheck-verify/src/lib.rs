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


use std::path::Path;

use fingerprint::Fingerprint;
use verifier::Verifier;

pub mod certificates;
pub mod fingerprint;
mod reader;
pub mod scheme_block;
pub mod signing_block;
pub mod signing_types;
pub mod verifier;
pub mod zip_parser;

pub use sigcheck_common::{Result, SigCheckError};
pub use verifier::{inspect_path, inspect_reader, Inspection, Outcome, Rejection};

// APK Signature Scheme v2 based on https://source.android.com/docs/security/features/apksigning/v2
// APK Signature Scheme v3 based on https://source.android.com/docs/security/features/apksigning/v3
/// Checks that the package at `package_path` carries a v3 (or, failing that,
/// v2) signer whose certificate has the SHA-256 fingerprint
/// `expected_fingerprint`.
///
/// Only the raw signing block is consulted, nothing the platform reports
/// about the package. Every failure, including a malformed
/// `expected_fingerprint`, returns `false`.
pub fn verify(package_path: impl AsRef<Path>, expected_fingerprint: &str) -> bool {
    match Fingerprint::parse(expected_fingerprint) {
        Ok(expected) => Verifier::new(expected).verify_path(package_path),
        Err(err) => {
            tracing::warn!(%err, "refusing to verify against an invalid fingerprint");
            false
        }
    }
}
