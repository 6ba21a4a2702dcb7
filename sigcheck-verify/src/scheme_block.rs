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
    signing_types::{IdValuePair, SchemeBlock, SignatureScheme}
};
use sigcheck_common::*;

// u64 length, its value is at least the u32 ID
const PAIR_HEADER_SIZE: u64 = 8;
const PAIR_ID_SIZE: u64 = 4;

/// Splits the signing block's payload into its ID-value pairs.
///
/// The list ends at the first pair whose length doesn't fit the bytes that
/// are left. Pairs before it are still returned.
pub fn id_value_pairs(pairs: &[u8]) -> Vec<IdValuePair<'_>> {
    let mut reader = LengthPrefixedReader::new(pairs);
    let mut found = vec![];

    while reader.remaining() >= PAIR_HEADER_SIZE {
        match next_pair(&mut reader) {
            Ok(pair) => found.push(pair),
            Err(err) => {
                tracing::debug!(%err, pairs = found.len(), "stopped reading ID-value pairs");
                break;
            }
        }
    }

    found
}

fn next_pair<'a>(reader: &mut LengthPrefixedReader<'a>) -> Result<IdValuePair<'a>> {
    let length = reader.read_u64()?;
    // Readers that use signed lengths see these as negative
    if length < PAIR_ID_SIZE || length > i64::MAX as u64 {
        return Err(SigCheckError::SigningBlockMalformed(format!(
            "ID-value pair length {length}"
        )));
    }

    let mut pair = LengthPrefixedReader::new(reader.read_slice(length)?);
    let id = pair.read_u32()?;
    let value = pair.read_slice(length - PAIR_ID_SIZE)?;
    Ok(IdValuePair { id, value })
}

/// Chooses the newest signature scheme present: v3, otherwise v2.
///
/// Nothing older than v2 is considered. A package without either block fails
/// with [SigCheckError::NoSupportedScheme].
pub fn select_scheme<'a>(pairs: &[IdValuePair<'a>]) -> Result<SchemeBlock<'a>> {
    let mut selected: Option<SchemeBlock<'a>> = None;

    for pair in pairs {
        let Some(scheme) = SignatureScheme::from_block_id(pair.id) else {
            tracing::trace!(id = pair.id, "skipping ID-value pair");
            continue;
        };
        // The first block of a given scheme wins
        if selected.map_or(true, |current| scheme > current.scheme) {
            selected = Some(SchemeBlock {
                scheme,
                value: pair.value
            });
        }
    }

    let selected = selected.ok_or(SigCheckError::NoSupportedScheme)?;
    tracing::debug!(scheme = %selected.scheme, len = selected.value.len(), "selected signature scheme");
    Ok(selected)
}
