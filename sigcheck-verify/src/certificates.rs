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


use crate::{
    reader::LengthPrefixedReader,
    signing_types::{Certificate, SchemeBlock, SignatureScheme, SignerCertificates}
};
use sigcheck_common::*;

/// Collects the certificates of every signer in a v2 or v3 scheme block.
pub fn extract_certificates(scheme_block: &SchemeBlock) -> Vec<Certificate> {
    extract_signers(scheme_block)
        .into_iter()
        .flat_map(|signer| signer.certificates)
        .collect()
}

/// Collects certificates grouped by signer.
///
/// Never fails. A signer that is cut short contributes the certificates read
/// before the damage, and a broken signers list ends the walk. Either way
/// the caller just sees fewer certificates.
pub fn extract_signers(scheme_block: &SchemeBlock) -> Vec<SignerCertificates> {
    let mut block = LengthPrefixedReader::new(scheme_block.value);
    let signers = match block.read_u32_prefixed() {
        Ok(signers) => signers,
        Err(err) => {
            tracing::debug!(%err, "unreadable signers list");
            return vec![];
        }
    };

    let mut signers = LengthPrefixedReader::new(signers);
    let mut found = vec![];
    while !signers.is_empty() {
        let index = found.len();
        let signer = match signers.read_u32_prefixed() {
            Ok(signer) => signer,
            Err(err) => {
                tracing::debug!(%err, index, "truncated signers list");
                break;
            }
        };

        let mut certificates = vec![];
        if let Err(err) = read_signer(signer, scheme_block.scheme, &mut certificates) {
            tracing::debug!(%err, index, kept = certificates.len(), "malformed signer");
        }
        found.push(SignerCertificates {
            index,
            certificates
        });
    }

    found
}

// Both schemes share the signer layout apart from v3's SDK range:
//   signed data | [min sdk | max sdk] | signatures | public key
fn read_signer(
    signer: &[u8],
    scheme: SignatureScheme,
    certificates: &mut Vec<Certificate>
) -> Result<()> {
    let mut signer = LengthPrefixedReader::new(signer);
    let signed_data = signer.read_u32_prefixed()?;
    read_signed_data(signed_data, scheme, certificates)?;

    if scheme.has_sdk_range() {
        signer.read_u32()?;
        signer.read_u32()?;
    }
    signer.read_u32_prefixed()?;
    signer.read_u32_prefixed()?;
    Ok(())
}

//   digests | certificates | [min sdk | max sdk] | additional attributes
fn read_signed_data(
    signed_data: &[u8],
    scheme: SignatureScheme,
    certificates: &mut Vec<Certificate>
) -> Result<()> {
    let mut signed_data = LengthPrefixedReader::new(signed_data);
    // Content digests aren't needed to compare certificates
    signed_data.read_u32_prefixed()?;

    let mut certs = LengthPrefixedReader::new(signed_data.read_u32_prefixed()?);
    while !certs.is_empty() {
        let der = certs.read_u32_prefixed()?;
        certificates.push(Certificate { der: der.to_vec() });
    }

    if scheme.has_sdk_range() {
        signed_data.read_u32()?;
        signed_data.read_u32()?;
    }
    Ok(())
}
