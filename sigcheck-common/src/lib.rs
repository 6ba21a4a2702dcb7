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


use std::{fmt, io, rc::Rc};

/// Common error type making it easier to share `Result`s between sigcheck crates.
///
/// In general designed to avoid needing utilities like `map_err`.
#[derive(Debug, Clone)]
pub enum SigCheckError {
    /// sigcheck-cli encountered an error while processing something specific
    /// to the command line implementation. For example, not enough arguments
    /// were passed via the shell.
    Cli(String),
    /// The package file could not be opened or a read at a computed offset
    /// came up short.
    FileIoError(Rc<io::Error>),
    /// No ZIP End Of Central Directory record was found in the last 65557
    /// bytes of the package, or the package is shorter than one record.
    EocdNotFound,
    /// There is no APK Signing Block in front of the Central Directory. The
    /// package is either unsigned or only carries v1 (JAR) signatures, which
    /// are never accepted.
    SigningBlockAbsent,
    /// An APK Signing Block magic was found but the block around it is not
    /// self-consistent, for example the leading and trailing size fields
    /// disagree.
    SigningBlockMalformed(String),
    /// A length prefix inside the signing block claimed more bytes than its
    /// parent structure has left.
    LengthPrefixOutOfBounds { length: u64, remaining: u64 },
    /// The signing block holds neither an APK Signature Scheme v3 nor a v2
    /// block.
    NoSupportedScheme,
    /// A configured fingerprint is not a SHA-256 digest in hexadecimal form.
    InvalidFingerprint(String)
}

/// Result type where the error is always [SigCheckError].
pub type Result<T> = std::result::Result<T, SigCheckError>;

impl fmt::Display for SigCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigCheckError::Cli(message) => write!(f, "{message}"),
            SigCheckError::FileIoError(err) => write!(f, "I/O error: {err}"),
            SigCheckError::EocdNotFound => write!(f, "ZIP End Of Central Directory not found"),
            SigCheckError::SigningBlockAbsent => write!(f, "no APK Signing Block present"),
            SigCheckError::SigningBlockMalformed(reason) => {
                write!(f, "malformed APK Signing Block: {reason}")
            }
            SigCheckError::LengthPrefixOutOfBounds { length, remaining } => write!(
                f,
                "length prefix of {length} bytes exceeds the {remaining} bytes remaining"
            ),
            SigCheckError::NoSupportedScheme => {
                write!(f, "no APK Signature Scheme v3 or v2 block present")
            }
            SigCheckError::InvalidFingerprint(value) => {
                write!(f, "not a SHA-256 fingerprint: {value:?}")
            }
        }
    }
}

impl std::error::Error for SigCheckError {}

impl From<SigCheckError> for String {
    fn from(value: SigCheckError) -> Self {
        value.to_string()
    }
}

// Automatic conversion from other types of error to SigCheckError makes the rest of the code cleaner
impl From<io::Error> for SigCheckError {
    fn from(value: io::Error) -> Self {
        SigCheckError::FileIoError(value.into())
    }
}
