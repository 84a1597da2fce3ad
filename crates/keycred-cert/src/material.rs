//! Certificate material loaded from a PFX/CER pair.

use chrono::{DateTime, TimeZone, Utc};
use keycred_core::{display_datetime, KeyCredError, Result, WindowProblem};
use p12_keystore::KeyStore;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::thumbprint::{thumbprint, x5t};

/// Label used for in-memory sources in error messages.
pub(crate) const MEMORY_SOURCE: &str = "<memory>";

/// Key material and certificate attributes for one signing key.
///
/// Holds the raw PFX and CER bytes exactly as read, so the payload carries
/// the files unchanged.
#[derive(Clone)]
pub struct CertificateMaterial {
    pub(crate) pfx: Vec<u8>,
    pub(crate) cer: Vec<u8>,
    pub(crate) der: Vec<u8>,
    pub(crate) subject: String,
    pub(crate) thumbprint: String,
    pub(crate) not_before: DateTime<Utc>,
    pub(crate) not_after: DateTime<Utc>,
}

impl std::fmt::Debug for CertificateMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("subject", &self.subject)
            .field("thumbprint", &self.thumbprint)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .field("pfx_len", &self.pfx.len())
            .field("cer_len", &self.cer.len())
            .finish()
    }
}

/// Attributes read from a DER certificate
#[derive(Debug, Clone)]
pub(crate) struct ParsedCertificate {
    pub subject: String,
    pub thumbprint: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateMaterial {
    /// Build material from in-memory PFX and CER contents.
    ///
    /// Applies the same checks as [`crate::load_certificate`].
    pub fn from_bytes(pfx: Vec<u8>, passphrase: &SecretString, cer: Vec<u8>) -> Result<Self> {
        Self::from_sources(pfx, MEMORY_SOURCE, passphrase, cer, MEMORY_SOURCE)
    }

    pub(crate) fn from_sources(
        pfx: Vec<u8>,
        pfx_source: &str,
        passphrase: &SecretString,
        cer: Vec<u8>,
        cer_source: &str,
    ) -> Result<Self> {
        let pfx_der = leaf_from_pkcs12(&pfx, pfx_source, passphrase)?;
        let pfx_cert = parse_der(&pfx_der, pfx_source)?;

        let cer_der = der_from_cer(&cer, cer_source)?;
        let cer_cert = parse_der(&cer_der, cer_source)?;

        if pfx_cert.thumbprint != cer_cert.thumbprint {
            return Err(KeyCredError::load(
                cer_source,
                format!(
                    "certificate {} does not match the PFX certificate {}",
                    cer_cert.thumbprint, pfx_cert.thumbprint
                ),
            ));
        }

        debug!(
            subject = %pfx_cert.subject,
            thumbprint = %pfx_cert.thumbprint,
            "certificate pair verified"
        );

        Ok(Self {
            pfx,
            cer,
            der: cer_der,
            subject: pfx_cert.subject,
            thumbprint: pfx_cert.thumbprint,
            not_before: pfx_cert.not_before,
            not_after: pfx_cert.not_after,
        })
    }

    /// Raw PFX file contents
    #[must_use]
    pub fn pfx_bytes(&self) -> &[u8] {
        &self.pfx
    }

    /// Raw CER file contents (DER or PEM, as read)
    #[must_use]
    pub fn cer_bytes(&self) -> &[u8] {
        &self.cer
    }

    /// DER encoding of the certificate
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name, e.g. `CN=claims-app`
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Uppercase hex SHA-1 thumbprint
    #[must_use]
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// base64url SHA-1 thumbprint, as in a JWK `x5t`
    #[must_use]
    pub fn x5t(&self) -> String {
        x5t(&self.der)
    }

    /// Start of validity
    #[must_use]
    pub const fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    /// End of validity
    #[must_use]
    pub const fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Returns true if `now` is past the end of validity
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_after
    }

    /// Reject a certificate whose validity already ended.
    pub fn ensure_not_expired(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_expired_at(now) {
            return Err(KeyCredError::ValidityWindow {
                kind: WindowProblem::Expired,
                not_before: self.not_before,
                not_after: self.not_after,
            });
        }
        Ok(())
    }

    /// One-line description for operators
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} ({}), valid {} to {}",
            self.subject,
            self.thumbprint,
            display_datetime(&self.not_before),
            display_datetime(&self.not_after)
        )
    }
}

/// Open a PKCS#12 container and return the DER of its leaf certificate.
fn leaf_from_pkcs12(pfx: &[u8], source: &str, passphrase: &SecretString) -> Result<Vec<u8>> {
    if pfx.is_empty() {
        return Err(KeyCredError::load(source, "file is empty"));
    }

    let keystore = KeyStore::from_pkcs12(pfx, passphrase.expose_secret()).map_err(|e| {
        KeyCredError::load(
            source,
            format!("cannot open PKCS#12 container (wrong passphrase or malformed file): {e}"),
        )
    })?;

    let (alias, chain) = keystore
        .private_key_chain()
        .ok_or_else(|| KeyCredError::load(source, "container holds no private key"))?;

    debug!(alias, chain_len = chain.chain().len(), "opened PKCS#12 container");

    chain
        .chain()
        .first()
        .map(|cert| cert.as_der().to_vec())
        .ok_or_else(|| KeyCredError::load(source, "private key has no certificate"))
}

/// Accept a CER file in DER or PEM form and return the DER bytes.
fn der_from_cer(cer: &[u8], source: &str) -> Result<Vec<u8>> {
    if cer.is_empty() {
        return Err(KeyCredError::load(source, "file is empty"));
    }

    if !cer.starts_with(b"-----BEGIN") {
        return Ok(cer.to_vec());
    }

    let block = pem::parse(cer).map_err(|e| KeyCredError::load(source, e))?;
    if block.tag() != "CERTIFICATE" {
        return Err(KeyCredError::load(
            source,
            format!("expected a CERTIFICATE PEM block, found {}", block.tag()),
        ));
    }
    Ok(block.contents().to_vec())
}

/// Parse a single DER-encoded X.509 certificate.
pub(crate) fn parse_der(der: &[u8], source: &str) -> Result<ParsedCertificate> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| KeyCredError::load(source, format!("malformed certificate: {e}")))?;

    let validity = cert.validity();
    Ok(ParsedCertificate {
        subject: cert.subject().to_string(),
        thumbprint: thumbprint(der),
        not_before: asn1_to_utc(validity.not_before, source)?,
        not_after: asn1_to_utc(validity.not_after, source)?,
    })
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time, source: &str) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .ok_or_else(|| KeyCredError::load(source, format!("validity time out of range: {t:?}")))
}
