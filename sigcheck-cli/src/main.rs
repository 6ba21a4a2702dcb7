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


use sigcheck_common::{Result, SigCheckError};
use sigcheck_verify::{fingerprint::Fingerprint, inspect_path, verifier::Verifier, Outcome};
use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode
};
use tracing_subscriber::EnvFilter;

/// Checks that an APK is still signed with the expected certificate.
///
/// ```
/// $ sigcheck ./base.apk A26EA8F25044AFA79B11862F23729A4EF97F25CF63D37C0E74484365FFB5ED25
/// Verified: v3 certificate A26EA8F2...
/// ```
///
/// Exits with 1 when the package is not signed by that certificate, for any
/// reason. Without a fingerprint, prints the fingerprint of every signing
/// certificate instead:
///
/// ```
/// $ sigcheck ./base.apk
/// scheme: v3
/// signer 0: A26EA8F25044AFA79B11862F23729A4EF97F25CF63D37C0E74484365FFB5ED25
/// ```
///
/// Set `RUST_LOG=sigcheck_verify=debug` to trace each step of the parse.
fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let package_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or(SigCheckError::Cli("Package path not provided".into()))?;

    let Some(expected) = env::args().nth(2) else {
        return print_fingerprints(&package_path);
    };
    let verifier = Verifier::new(Fingerprint::parse(&expected)?);

    match verifier.check_path(&package_path) {
        Outcome::Verified {
            scheme,
            fingerprint
        } => {
            println!("Verified: {scheme} certificate {fingerprint}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Unverified(rejection) => {
            eprintln!("Not verified: {rejection}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_fingerprints(package_path: &Path) -> Result<ExitCode> {
    let inspection = inspect_path(package_path)?;
    println!("scheme: {}", inspection.scheme);

    let mut any = false;
    for signer in &inspection.signers {
        for certificate in &signer.certificates {
            println!("signer {}: {}", signer.index, certificate.fingerprint());
            any = true;
        }
    }

    if !any {
        eprintln!("No signing certificates found");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
