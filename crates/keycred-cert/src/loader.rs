//! Reads the PFX/CER pair from disk.

use keycred_core::{KeyCredError, Result};
use secrecy::SecretString;
use std::path::Path;
use tracing::info;

use crate::material::CertificateMaterial;

/// Load certificate material from a PKCS#12 container and its public certificate.
///
/// The passphrase unlocks the container and is never logged. Both files are
/// only read.
///
/// # Errors
///
/// Returns `KeyCredError::CertificateLoad` if either file is missing or
/// malformed, the passphrase is wrong, the container holds no private key, or
/// the two files describe different certificates.
pub fn load_certificate(
    pfx_path: &Path,
    passphrase: &SecretString,
    cer_path: &Path,
) -> Result<CertificateMaterial> {
    let pfx_source = pfx_path.display().to_string();
    let cer_source = cer_path.display().to_string();

    let pfx = read_file(pfx_path, &pfx_source)?;
    let cer = read_file(cer_path, &cer_source)?;

    let material = CertificateMaterial::from_sources(pfx, &pfx_source, passphrase, cer, &cer_source)?;

    info!(
        pfx = %pfx_source,
        cer = %cer_source,
        subject = %material.subject(),
        thumbprint = %material.thumbprint(),
        "loaded certificate"
    );

    Ok(material)
}

fn read_file(path: &Path, source: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| KeyCredError::load(source, e))
}
