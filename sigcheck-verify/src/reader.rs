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


use byteorder::{LittleEndian, ReadBytesExt};
use sigcheck_common::*;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// Reads exactly `len` bytes of the package starting at `offset`.
pub fn read_exact_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u32_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<u32> {
    reader.seek(SeekFrom::Start(offset))?;
    Ok(reader.read_u32::<LittleEndian>()?)
}

pub fn read_u64_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<u64> {
    reader.seek(SeekFrom::Start(offset))?;
    Ok(reader.read_u64::<LittleEndian>()?)
}

/// Walks a buffer made of little-endian integers and length-prefixed
/// sub-buffers, as used throughout the APK Signing Block.
///
/// Every read is checked against what is left of the buffer, so a hostile
/// length can only ever produce [SigCheckError::LengthPrefixOutOfBounds].
pub struct LengthPrefixedReader<'a> {
    cursor: Cursor<&'a [u8]>
}

impl<'a> LengthPrefixedReader<'a> {
    pub fn new(buf: &'a [u8]) -> LengthPrefixedReader<'a> {
        LengthPrefixedReader {
            cursor: Cursor::new(buf)
        }
    }

    pub fn remaining(&self) -> u64 {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.cursor.read_u64::<LittleEndian>()?)
    }

    /// Borrows the next `len` bytes without copying them.
    pub fn read_slice(&mut self, len: u64) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let buf: &'a [u8] = *self.cursor.get_ref();
        // Both fit in usize, ensure() bounded them by the buffer length
        let start = self.cursor.position() as usize;
        let end = start + len as usize;
        let slice = buf
            .get(start..end)
            .ok_or(SigCheckError::LengthPrefixOutOfBounds {
                length: len,
                remaining: self.remaining()
            })?;
        self.cursor.set_position(end as u64);
        Ok(slice)
    }

    /// Reads a u32 length followed by that many bytes.
    pub fn read_u32_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()?;
        self.read_slice(len.into())
    }

    fn ensure(&self, len: u64) -> Result<()> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(SigCheckError::LengthPrefixOutOfBounds {
                length: len,
                remaining
            });
        }
        Ok(())
    }
}
