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
    reader::{read_exact_at, read_u64_at},
    signing_types::{
        SigningBlock, APK_SIGNING_BLOCK_MAGIC, MAX_SIGNING_BLOCK_SIZE, MIN_SIGNING_BLOCK_SIZE
    },
    zip_parser::central_directory_offset
};
use sigcheck_common::*;
use std::io::{Read, Seek};

// Trailing size field plus magic
const SIGNING_BLOCK_FOOTER_SIZE: u64 = 24;

/// Reads the APK Signing Block that sits directly in front of the Central
/// Directory the EOCD at `eocd_start` points to.
///
/// Layout, see `size_of_self_not_counted` in the v2 scheme doc:
///
/// ```text
/// u64 size | ID-value pairs | u64 size | "APK Sig Block 42" | Central Directory
/// ```
///
/// Returns [SigCheckError::SigningBlockAbsent] when there's no magic where
/// the block should end, as for packages only signed with v1.
pub fn locate_signing_block<R: Read + Seek>(reader: &mut R, eocd_start: u64) -> Result<SigningBlock> {
    let cd_start = central_directory_offset(reader, eocd_start)?;
    if cd_start > eocd_start {
        return Err(SigCheckError::SigningBlockMalformed(format!(
            "central directory at {cd_start} starts after the EOCD at {eocd_start}"
        )));
    }

    let magic_offset = cd_start
        .checked_sub(APK_SIGNING_BLOCK_MAGIC.len() as u64)
        .ok_or(SigCheckError::SigningBlockAbsent)?;
    let magic = read_exact_at(reader, magic_offset, APK_SIGNING_BLOCK_MAGIC.len())?;
    if magic != APK_SIGNING_BLOCK_MAGIC {
        return Err(SigCheckError::SigningBlockAbsent);
    }

    let size_offset = magic_offset
        .checked_sub(8)
        .ok_or(SigCheckError::SigningBlockAbsent)?;
    let size = read_u64_at(reader, size_offset)?;
    let pairs_len = size
        .checked_sub(SIGNING_BLOCK_FOOTER_SIZE)
        .ok_or(SigCheckError::SigningBlockAbsent)?;
    if !(MIN_SIGNING_BLOCK_SIZE..=MAX_SIGNING_BLOCK_SIZE).contains(&size) {
        return Err(SigCheckError::SigningBlockMalformed(format!(
            "block size {size} outside {MIN_SIGNING_BLOCK_SIZE}..={MAX_SIGNING_BLOCK_SIZE}"
        )));
    }

    // The leading size field isn't counted by either of them
    let offset = cd_start
        .checked_sub(size + 8)
        .ok_or(SigCheckError::SigningBlockAbsent)?;
    let leading_size = read_u64_at(reader, offset)?;
    if leading_size != size {
        return Err(SigCheckError::SigningBlockMalformed(format!(
            "leading size {leading_size} does not match trailing size {size}"
        )));
    }

    let pairs = read_exact_at(reader, offset + 8, pairs_len as usize)?;
    tracing::debug!(offset, size, cd_start, "found APK Signing Block");

    Ok(SigningBlock {
        offset,
        cd_start,
        size,
        pairs
    })
}
