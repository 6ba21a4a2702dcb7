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


use std::{
    fmt,
    fs::File,
    io::{Read, Seek},
    path::Path
};

use crate::{
    certificates::extract_signers,
    fingerprint::Fingerprint,
    scheme_block::{id_value_pairs, select_scheme},
    signing_block::locate_signing_block,
    signing_types::{Certificate, SignatureScheme, SignerCertificates},
    zip_parser::find_eocd
};
use sigcheck_common::*;

/// Everything the signing block says about who signed a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub scheme: SignatureScheme,
    pub signers: Vec<SignerCertificates>
}

impl Inspection {
    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.signers
            .iter()
            .flat_map(|signer| signer.certificates.iter())
    }

    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.certificates().map(Certificate::fingerprint).collect()
    }
}

/// Reads the signers of the newest supported scheme in a package.
///
/// EOCD, then the APK Signing Block in front of the Central Directory it
/// points to, then the v3 or v2 block inside it, then its signers.
pub fn inspect_reader<R: Read + Seek>(reader: &mut R) -> Result<Inspection> {
    let eocd_start = find_eocd(reader)?;
    tracing::debug!(eocd_start, "found End of Central Directory");
    let signing_block = locate_signing_block(reader, eocd_start)?;
    let pairs = id_value_pairs(&signing_block.pairs);
    let scheme_block = select_scheme(&pairs)?;
    let signers = extract_signers(&scheme_block);

    Ok(Inspection {
        scheme: scheme_block.scheme,
        signers
    })
}

pub fn inspect_path(path: impl AsRef<Path>) -> Result<Inspection> {
    let mut file = File::open(path)?;
    inspect_reader(&mut file)
}

/// Why a package was not accepted.
#[derive(Debug, Clone)]
pub enum Rejection {
    /// The package couldn't be read or had no usable v3/v2 signing block.
    Structure(SigCheckError),
    /// The scheme block was found but none of its signers yielded a
    /// certificate.
    NoCertificates { scheme: SignatureScheme },
    /// Certificates were found, none with the expected fingerprint.
    FingerprintMismatch {
        scheme: SignatureScheme,
        found: Vec<Fingerprint>
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Structure(err) => write!(f, "{err}"),
            Rejection::NoCertificates { scheme } => {
                write!(f, "{scheme} signing block holds no certificates")
            }
            Rejection::FingerprintMismatch { scheme, found } => write!(
                f,
                "none of the {} {scheme} certificate(s) has the expected fingerprint",
                found.len()
            )
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Verified {
        scheme: SignatureScheme,
        fingerprint: Fingerprint
    },
    Unverified(Rejection)
}

impl Outcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified { .. })
    }
}

/// Compares the certificates a package is signed with against one expected
/// fingerprint.
///
/// Holds no state besides that fingerprint, so one instance can check any
/// number of packages, from any thread.
#[derive(Debug, Clone)]
pub struct Verifier {
    expected: Fingerprint
}

impl Verifier {
    pub fn new(expected: Fingerprint) -> Verifier {
        Verifier { expected }
    }

    pub fn expected(&self) -> &Fingerprint {
        &self.expected
    }

    /// Any certificate of any signer matching is enough. Everything else,
    /// including a package that can't be parsed, is [Outcome::Unverified].
    pub fn check_reader<R: Read + Seek>(&self, reader: &mut R) -> Outcome {
        match inspect_reader(reader) {
            Ok(inspection) => self.check_inspection(&inspection),
            Err(err) => {
                tracing::warn!(%err, "package signature could not be read");
                Outcome::Unverified(Rejection::Structure(err))
            }
        }
    }

    pub fn check_path(&self, path: impl AsRef<Path>) -> Outcome {
        let path = path.as_ref();
        match File::open(path) {
            Ok(mut file) => self.check_reader(&mut file),
            Err(err) => {
                tracing::warn!(%err, path = %path.display(), "failed to open package");
                Outcome::Unverified(Rejection::Structure(err.into()))
            }
        }
    }

    pub fn verify_reader<R: Read + Seek>(&self, reader: &mut R) -> bool {
        self.check_reader(reader).is_verified()
    }

    pub fn verify_path(&self, path: impl AsRef<Path>) -> bool {
        self.check_path(path).is_verified()
    }

    fn check_inspection(&self, inspection: &Inspection) -> Outcome {
        let scheme = inspection.scheme;
        let mut found = vec![];

        for certificate in inspection.certificates() {
            let fingerprint = certificate.fingerprint();
            tracing::debug!(%fingerprint, %scheme, "detected signing certificate");
            if fingerprint == self.expected {
                return Outcome::Verified {
                    scheme,
                    fingerprint
                };
            }
            found.push(fingerprint);
        }

        let rejection = if found.is_empty() {
            Rejection::NoCertificates { scheme }
        } else {
            Rejection::FingerprintMismatch { scheme, found }
        };
        tracing::warn!(%rejection, "package is not signed by the expected certificate");
        Outcome::Unverified(rejection)
    }
}
