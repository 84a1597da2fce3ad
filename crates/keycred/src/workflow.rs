//! Loader → builder glue shared by the CLI commands.

use chrono::{DateTime, Utc};
use keycred_cert::{load_certificate, CertificateMaterial, PayloadBuilder};
use keycred_core::{CredentialPayload, Result};
use secrecy::SecretString;
use std::path::Path;
use tracing::warn;

/// Options for [`prepare_upload`]
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Display name for the key credentials (defaults to the certificate subject)
    pub display_name: Option<String>,

    /// Build a payload even if the certificate has expired
    pub allow_expired: bool,

    /// Reference time for the expiry check (defaults to now)
    pub now: Option<DateTime<Utc>>,
}

/// Certificate material and the payload built from it
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    /// What was loaded
    pub material: CertificateMaterial,
    /// What will be sent
    pub payload: CredentialPayload,
}

/// Load the PFX/CER pair and build the upload payload.
///
/// Unless `allow_expired` is set, a certificate whose validity has ended is
/// rejected with `KeyCredError::ValidityWindow`.
pub fn prepare_upload(
    pfx_path: &Path,
    cer_path: &Path,
    passphrase: &SecretString,
    options: &UploadOptions,
) -> Result<PreparedUpload> {
    let material = load_certificate(pfx_path, passphrase, cer_path)?;

    let now = options.now.unwrap_or_else(Utc::now);
    if options.allow_expired {
        if material.is_expired_at(now) {
            warn!(not_after = %material.not_after(), "certificate has expired; continuing as requested");
        }
    } else {
        material.ensure_not_expired(now)?;
    }

    let mut builder = PayloadBuilder::new(&material, passphrase);
    if let Some(name) = &options.display_name {
        builder = builder.display_name(name.clone());
    }
    let payload = builder.build()?;

    Ok(PreparedUpload { material, payload })
}
