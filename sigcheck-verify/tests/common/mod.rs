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


// Builds fixture packages with APK Signature Scheme v2/v3 signing blocks.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use deku::prelude::*;
use tempfile::NamedTempFile;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

pub const SIGNATURE_SCHEME_V2_BLOCK_ID: u32 = 0x7109871A;
pub const SIGNATURE_SCHEME_V3_BLOCK_ID: u32 = 0xF05368C0;
pub const VERITY_PADDING_BLOCK_ID: u32 = 0x42726577;
pub const APK_SIGNING_BLOCK_MAGIC: &[u8; 16] = b"APK Sig Block 42";

// Stand-ins for DER certificates. Only their bytes matter, they're hashed
// as-is and never decoded.
pub const RELEASE_CERT: &[u8] = b"0\x82\x01\x0arelease signing certificate";
pub const ATTACKER_CERT: &[u8] = b"0\x82\x01\x0aresigned by someone else";

// Named according to the APK Signature Scheme v2 doc

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct ApkSigningBlock {
    // Size of this structure MINUS this field!
    pub size_of_self_not_counted: u64,
    pub pairs: SigningBlockPairs,
    pub size_of_self_counted: u64,
    pub magic: [u8; 16]
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct SigningBlockPairs {
    pub pairs: Vec<U64LengthPrefixed<SigningBlockIdValuePair>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct SigningBlockIdValuePair {
    pub id: u32,
    pub value: Vec<u8>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct SignatureSchemeV2Block {
    pub signers: U32LengthPrefixed<Vec<U32LengthPrefixed<Signer>>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct SignatureSchemeV3Block {
    pub signers: U32LengthPrefixed<Vec<U32LengthPrefixed<V3Signer>>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct Signer {
    pub signed_data: U32LengthPrefixed<SignedData>,
    pub signatures: U32LengthPrefixed<Vec<U32LengthPrefixed<Signature>>>,
    pub public_key: U32LengthPrefixed<Vec<u8>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct V3Signer {
    pub signed_data: U32LengthPrefixed<V3SignedData>,
    pub min_sdk: u32,
    pub max_sdk: u32,
    pub signatures: U32LengthPrefixed<Vec<U32LengthPrefixed<Signature>>>,
    pub public_key: U32LengthPrefixed<Vec<u8>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct Signature {
    pub signature_algorithm_id: u32,
    pub signature: U32LengthPrefixed<Vec<u8>>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct SignedData {
    pub digests: U32LengthPrefixed<Vec<U32LengthPrefixed<Digest>>>,
    pub certificates: U32LengthPrefixed<Vec<U32LengthPrefixed<Vec<u8>>>>,
    pub additional_attributes: u32
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct V3SignedData {
    pub digests: U32LengthPrefixed<Vec<U32LengthPrefixed<Digest>>>,
    pub certificates: U32LengthPrefixed<Vec<U32LengthPrefixed<Vec<u8>>>>,
    pub min_sdk: u32,
    pub max_sdk: u32,
    pub additional_attributes: u32
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct Digest {
    pub signature_algorithm_id: u32,
    pub digest: U32LengthPrefixed<[u8; 32]>
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct U64LengthPrefixed<T: DekuWriter> {
    pub length: u64,
    pub value: T
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct U32LengthPrefixed<T: DekuWriter> {
    pub length: u32,
    pub value: T
}

#[derive(Debug, PartialEq, DekuWrite, Clone)]
pub struct RawWrapper<T: DekuWriter> {
    pub value: T
}

pub fn len_pfx_u32<T: DekuWriter + Clone>(thing: T) -> U32LengthPrefixed<T> {
    let wrap = RawWrapper {
        value: thing.clone()
    };

    U32LengthPrefixed {
        length: wrap.to_bytes().unwrap().len() as u32,
        value: thing
    }
}

pub fn len_pfx_u64<T: DekuWriter + Clone>(thing: T) -> U64LengthPrefixed<T> {
    let wrap = RawWrapper {
        value: thing.clone()
    };

    U64LengthPrefixed {
        length: wrap.to_bytes().unwrap().len() as u64,
        value: thing
    }
}

const RSA_PKCS1_V1_5_WITH_SHA2_256: u32 = 0x0103;

fn digests() -> U32LengthPrefixed<Vec<U32LengthPrefixed<Digest>>> {
    len_pfx_u32(vec![len_pfx_u32(Digest {
        signature_algorithm_id: RSA_PKCS1_V1_5_WITH_SHA2_256,
        digest: len_pfx_u32([0x5A; 32])
    })])
}

fn certificates(certs: &[&[u8]]) -> U32LengthPrefixed<Vec<U32LengthPrefixed<Vec<u8>>>> {
    len_pfx_u32(certs.iter().map(|cert| len_pfx_u32(cert.to_vec())).collect())
}

fn signatures() -> U32LengthPrefixed<Vec<U32LengthPrefixed<Signature>>> {
    len_pfx_u32(vec![len_pfx_u32(Signature {
        signature_algorithm_id: RSA_PKCS1_V1_5_WITH_SHA2_256,
        signature: len_pfx_u32(vec![0xA5; 256])
    })])
}

fn public_key() -> U32LengthPrefixed<Vec<u8>> {
    len_pfx_u32(b"0\x82\x01\x22subject public key info".to_vec())
}

/// A v2 scheme block with one signer per entry of `signers`.
pub fn v2_block(signers: &[&[&[u8]]]) -> Vec<u8> {
    let signers = signers
        .iter()
        .map(|certs| {
            len_pfx_u32(Signer {
                signed_data: len_pfx_u32(SignedData {
                    digests: digests(),
                    certificates: certificates(certs),
                    additional_attributes: 0
                }),
                signatures: signatures(),
                public_key: public_key()
            })
        })
        .collect();
    SignatureSchemeV2Block {
        signers: len_pfx_u32(signers)
    }
    .to_bytes()
    .unwrap()
}

/// A v3 scheme block with one signer per entry of `signers`.
pub fn v3_block(signers: &[&[&[u8]]]) -> Vec<u8> {
    let min_sdk = 24;
    let max_sdk = 0x7FFFFFFF;
    let signers = signers
        .iter()
        .map(|certs| {
            len_pfx_u32(V3Signer {
                signed_data: len_pfx_u32(V3SignedData {
                    digests: digests(),
                    certificates: certificates(certs),
                    min_sdk,
                    max_sdk,
                    additional_attributes: 0
                }),
                min_sdk,
                max_sdk,
                signatures: signatures(),
                public_key: public_key()
            })
        })
        .collect();
    SignatureSchemeV3Block {
        signers: len_pfx_u32(signers)
    }
    .to_bytes()
    .unwrap()
}

/// A complete APK Signing Block holding the given ID-value pairs.
pub fn signing_block(pairs: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let pairs = SigningBlockPairs {
        pairs: pairs
            .iter()
            .map(|(id, value)| {
                len_pfx_u64(SigningBlockIdValuePair {
                    id: *id,
                    value: value.clone()
                })
            })
            .collect()
    };

    let pairs_length = pairs.to_bytes().unwrap().len();
    // Plus size_of_self_counted plus magic
    let sig_block_size = (pairs_length + 8 + 16) as u64;

    ApkSigningBlock {
        size_of_self_not_counted: sig_block_size,
        pairs,
        size_of_self_counted: sig_block_size,
        magic: *APK_SIGNING_BLOCK_MAGIC
    }
    .to_bytes()
    .unwrap()
}

/// An unsigned zip with a couple of entries, as an APK minus its signatures.
pub fn zip_bytes() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(vec![]));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .with_alignment(4);
    zip.start_file("AndroidManifest.xml", options).unwrap();
    zip.write_all(b"<manifest package=\"me.example.app\"/>").unwrap();
    zip.start_file("classes.dex", options).unwrap();
    zip.write_all(&[0x64, 0x65, 0x78, 0x0A, 0x30, 0x33, 0x35, 0x00]).unwrap();
    zip.finish().unwrap().into_inner()
}

// Fixture zips have no comment, so the EOCD is always the last 22 bytes
pub fn eocd_start(zip_buf: &[u8]) -> usize {
    zip_buf.len() - 22
}

pub fn cd_start(zip_buf: &[u8]) -> usize {
    let field = eocd_start(zip_buf) + 16;
    u32::from_le_bytes(zip_buf[field..field + 4].try_into().unwrap()) as usize
}

/// Inserts `block` in front of the Central Directory and points the EOCD
/// at the Central Directory's new position.
pub fn splice_signing_block(zip_buf: &[u8], block: &[u8]) -> Vec<u8> {
    let cd_start = cd_start(zip_buf);
    let eocd_start = eocd_start(zip_buf);

    let mut final_apk: Vec<u8> = vec![];
    final_apk.extend(&zip_buf[..cd_start]);
    final_apk.extend(block);
    final_apk.extend(&zip_buf[cd_start..]);

    let field = eocd_start + block.len() + 16;
    let new_cd_start = (cd_start + block.len()) as u32;
    final_apk[field..field + 4].copy_from_slice(&new_cd_start.to_le_bytes());
    final_apk
}

pub fn signed_package(pairs: &[(u32, Vec<u8>)]) -> Vec<u8> {
    splice_signing_block(&zip_bytes(), &signing_block(pairs))
}

pub fn write_package(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
