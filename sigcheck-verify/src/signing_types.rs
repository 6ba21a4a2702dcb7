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


// Types involved in reading the APK Signature Scheme v2/v3 metadata
use std::fmt;

use crate::fingerprint::Fingerprint;

// Named according to the APK Signature Scheme v2 doc

pub const APK_SIGNING_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";
pub const SIGNATURE_SCHEME_V2_BLOCK_ID: u32 = 0x7109871A;
pub const SIGNATURE_SCHEME_V3_BLOCK_ID: u32 = 0xF05368C0;
// size_of_self_counted covers itself, the pairs and the magic. With no room
// for at least one pair header the block is unusable.
pub const MIN_SIGNING_BLOCK_SIZE: u64 = 32;
pub const MAX_SIGNING_BLOCK_SIZE: u64 = 10 * 1024 * 1024;

/// Signature schemes whose signers we know how to read, newest last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignatureScheme {
    V2,
    V3
}

impl SignatureScheme {
    pub fn block_id(self) -> u32 {
        match self {
            SignatureScheme::V2 => SIGNATURE_SCHEME_V2_BLOCK_ID,
            SignatureScheme::V3 => SIGNATURE_SCHEME_V3_BLOCK_ID
        }
    }

    pub fn from_block_id(id: u32) -> Option<SignatureScheme> {
        match id {
            SIGNATURE_SCHEME_V2_BLOCK_ID => Some(SignatureScheme::V2),
            SIGNATURE_SCHEME_V3_BLOCK_ID => Some(SignatureScheme::V3),
            _ => None
        }
    }

    // v3 signers and signed data carry a min/max SDK pair v2 doesn't have
    pub(crate) fn has_sdk_range(self) -> bool {
        self == SignatureScheme::V3
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::V2 => write!(f, "v2"),
            SignatureScheme::V3 => write!(f, "v3")
        }
    }
}

/// An APK Signing Block located in front of the Central Directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningBlock {
    // Offset of size_of_self_not_counted from the start of the file
    pub offset: u64,
    pub cd_start: u64,
    // Value of both size fields. Counts everything except the leading one.
    pub size: u64,
    // The ID-value pairs, without either size field or the magic
    pub pairs: Vec<u8>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdValuePair<'a> {
    pub id: u32,
    pub value: &'a [u8]
}

/// The value of the ID-value pair chosen to verify against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeBlock<'a> {
    pub scheme: SignatureScheme,
    pub value: &'a [u8]
}

/// X.509 Certificate in ASN.1 DER form. Only ever hashed, never decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub der: Vec<u8>
}

impl Certificate {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.der)
    }
}

/// Certificates of one signer, in the order they appear in its signed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerCertificates {
    // Position of the signer within the scheme block's signers list
    pub index: usize,
    pub certificates: Vec<Certificate>
}
