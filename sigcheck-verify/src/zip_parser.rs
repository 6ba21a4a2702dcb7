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


use crate::reader::{read_exact_at, read_u32_at};
use sigcheck_common::*;
use std::io::{Read, Seek, SeekFrom};

pub const EOCD_MAGIC: &[u8; 4] = &[0x50, 0x4B, 0x05, 0x06];
// Fixed part of the End of Central Directory record
pub const EOCD_MIN_SIZE: u64 = 22;
pub const EOCD_MAX_COMMENT_SIZE: u64 = 0xFFFF;
// Offset of the Central Directory start, relative to the EOCD
pub const EOCD_CD_START_FIELD: u64 = 16;

/// Finds the End of Central Directory record, returning its offset from the
/// start of the file.
///
/// The EOCD can be followed by a comment of up to 65535 bytes, so only the
/// last 65557 bytes are searched, from the end backwards.
pub fn find_eocd<R: Read + Seek>(reader: &mut R) -> Result<u64> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    if file_len < EOCD_MIN_SIZE {
        return Err(SigCheckError::EocdNotFound);
    }

    let window_len = file_len.min(EOCD_MAX_COMMENT_SIZE + EOCD_MIN_SIZE);
    let window_start = file_len - window_len;
    let window = read_exact_at(reader, window_start, window_len as usize)?;

    // The record can't start any closer to the end than its own fixed size
    let last_candidate = window.len() - EOCD_MIN_SIZE as usize;
    for i in (0..=last_candidate).rev() {
        let magic = &window[i..(i + 4)];
        if magic == EOCD_MAGIC {
            // Found the end of central directory!
            return Ok(window_start + i as u64);
        }
    }

    Err(SigCheckError::EocdNotFound)
}

/// The EOCD also tells us where the central directories start
pub fn central_directory_offset<R: Read + Seek>(reader: &mut R, eocd_start: u64) -> Result<u64> {
    let cd_start = read_u32_at(reader, eocd_start + EOCD_CD_START_FIELD)?;
    Ok(cd_start.into())
}
