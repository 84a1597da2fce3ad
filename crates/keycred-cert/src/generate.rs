//! Self-signed signing certificates.
//!
//! Produces the PFX (private key + certificate, passphrase protected) and the
//! CER (DER public certificate) that the rest of the workflow consumes.

use chrono::{DateTime, Duration, Utc};
use keycred_core::{KeyCredError, Result, WindowProblem};
use p12_keystore::{Certificate as P12Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, KeyPair,
    KeyUsagePurpose, RsaKeySize, SerialNumber,
};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::material::{CertificateMaterial, MEMORY_SOURCE};
use crate::thumbprint::thumbprint;

/// Default validity for a new signing certificate
pub const DEFAULT_VALIDITY_DAYS: i64 = 365;

/// Key algorithm choices.
///
/// Entra ID signs tokens with RS256, so signing keys must be RSA. ECDSA is
/// only useful for exercising the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    /// RSA 2048-bit
    #[default]
    Rsa2048,
    /// RSA 4096-bit
    Rsa4096,
    /// ECDSA with P-256 curve
    EcdsaP256,
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa2048" | "rsa-2048" | "rsa" => Ok(Self::Rsa2048),
            "rsa4096" | "rsa-4096" => Ok(Self::Rsa4096),
            "ecdsa-p256" | "p256" | "ecdsa" => Ok(Self::EcdsaP256),
            _ => Err(format!(
                "unknown key algorithm: {s} (valid: rsa2048, rsa4096, ecdsa-p256)"
            )),
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa2048 => write!(f, "rsa2048"),
            Self::Rsa4096 => write!(f, "rsa4096"),
            Self::EcdsaP256 => write!(f, "ecdsa-p256"),
        }
    }
}

impl KeyAlgorithm {
    fn key_pair(self) -> Result<KeyPair> {
        let generated = match self {
            Self::Rsa2048 => KeyPair::generate_rsa_for(&rcgen::PKCS_RSA_SHA256, RsaKeySize::_2048),
            Self::Rsa4096 => KeyPair::generate_rsa_for(&rcgen::PKCS_RSA_SHA256, RsaKeySize::_4096),
            Self::EcdsaP256 => KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256),
        };
        generated.map_err(|e| KeyCredError::Generate(format!("{self} key generation failed: {e}")))
    }
}

/// Parameters for a self-signed signing certificate.
#[derive(Debug, Clone)]
pub struct SelfSignedRequest {
    subject: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    algorithm: KeyAlgorithm,
}

impl SelfSignedRequest {
    /// Certificate for `subject` (`CN=name` or just `name`), valid from now for a year.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            subject: subject.into(),
            not_before: now,
            not_after: now + Duration::days(DEFAULT_VALIDITY_DAYS),
            algorithm: KeyAlgorithm::default(),
        }
    }

    /// Set an explicit validity window
    #[must_use]
    pub const fn validity(mut self, not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    /// Valid from now for `days` days.
    ///
    /// Fails with `KeyCredError::Generate` when the end date is not representable.
    pub fn valid_for_days(mut self, days: i64) -> Result<Self> {
        let not_before = Utc::now();
        let not_after = Duration::try_days(days)
            .and_then(|span| not_before.checked_add_signed(span))
            .ok_or_else(|| {
                KeyCredError::Generate(format!("a validity of {days} days is out of range"))
            })?;
        self.not_before = not_before;
        self.not_after = not_after;
        Ok(self)
    }

    /// Set the key algorithm
    #[must_use]
    pub const fn algorithm(mut self, algorithm: KeyAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Common name without a `CN=` prefix
    fn common_name(&self) -> &str {
        let trimmed = self.subject.trim();
        trimmed
            .strip_prefix("CN=")
            .or_else(|| trimmed.strip_prefix("cn="))
            .unwrap_or(trimmed)
    }

    /// Generate the key pair and certificate and package them.
    ///
    /// # Errors
    ///
    /// Returns `KeyCredError::ValidityWindow` for an inverted window and
    /// `KeyCredError::Generate` if key generation, signing, or PKCS#12
    /// packaging fails.
    pub fn generate(&self, passphrase: &SecretString) -> Result<GeneratedCertificate> {
        if self.not_after <= self.not_before {
            return Err(KeyCredError::ValidityWindow {
                kind: WindowProblem::Inverted,
                not_before: self.not_before,
                not_after: self.not_after,
            });
        }

        let common_name = self.common_name();
        if common_name.is_empty() {
            return Err(KeyCredError::Generate("subject must not be empty".into()));
        }

        let key_pair = self.algorithm.key_pair()?;

        let mut params = CertificateParams::default();

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, common_name);
        params.distinguished_name = dn;

        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsagePurpose::ServerAuth,
        ];

        params.not_before = to_offset(self.not_before)?;
        params.not_after = to_offset(self.not_after)?;

        let serial = Uuid::new_v4();
        params.serial_number = Some(SerialNumber::from_slice(serial.as_bytes()));

        let certificate = params
            .self_signed(&key_pair)
            .map_err(|e| KeyCredError::Generate(format!("signing failed: {e}")))?;

        let cer = certificate.der().to_vec();
        let thumbprint = thumbprint(&cer);
        let pfx = package_pkcs12(&key_pair.serialize_der(), &cer, &thumbprint, common_name, passphrase)?;

        // Read back what was written so the reported window matches the encoding.
        let parsed = crate::material::parse_der(&cer, MEMORY_SOURCE)?;

        info!(
            subject = %parsed.subject,
            thumbprint = %thumbprint,
            algorithm = %self.algorithm,
            "generated self-signed certificate"
        );

        Ok(GeneratedCertificate {
            pfx,
            cer,
            subject: parsed.subject,
            thumbprint,
            not_before: parsed.not_before,
            not_after: parsed.not_after,
        })
    }
}

/// Output of [`SelfSignedRequest::generate`].
pub struct GeneratedCertificate {
    /// Passphrase-protected PKCS#12 container
    pub pfx: Vec<u8>,
    /// DER public certificate
    pub cer: Vec<u8>,
    /// Subject distinguished name
    pub subject: String,
    /// Uppercase hex SHA-1 thumbprint
    pub thumbprint: String,
    /// Start of validity
    pub not_before: DateTime<Utc>,
    /// End of validity
    pub not_after: DateTime<Utc>,
}

impl std::fmt::Debug for GeneratedCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedCertificate")
            .field("subject", &self.subject)
            .field("thumbprint", &self.thumbprint)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

impl GeneratedCertificate {
    /// Write the PFX and CER files.
    ///
    /// Existing files are left alone unless `overwrite` is set.
    pub fn write_files(&self, pfx_path: &Path, cer_path: &Path, overwrite: bool) -> Result<()> {
        for path in [pfx_path, cer_path] {
            if !overwrite && path.exists() {
                return Err(KeyCredError::io(
                    path.display().to_string(),
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "file exists (use --force to overwrite)",
                    ),
                ));
            }
        }

        std::fs::write(pfx_path, &self.pfx)
            .map_err(|e| KeyCredError::io(pfx_path.display().to_string(), e))?;
        std::fs::write(cer_path, &self.cer)
            .map_err(|e| KeyCredError::io(cer_path.display().to_string(), e))?;

        info!(pfx = %pfx_path.display(), cer = %cer_path.display(), "wrote certificate files");
        Ok(())
    }

    /// Re-open the generated files as certificate material.
    pub fn to_material(&self, passphrase: &SecretString) -> Result<CertificateMaterial> {
        CertificateMaterial::from_bytes(self.pfx.clone(), passphrase, self.cer.clone())
    }
}

fn package_pkcs12(
    key_der: &[u8],
    cert_der: &[u8],
    thumbprint: &str,
    alias: &str,
    passphrase: &SecretString,
) -> Result<Vec<u8>> {
    let certificate = P12Certificate::from_der(cert_der)
        .map_err(|e| KeyCredError::Generate(format!("certificate not accepted for PKCS#12: {e}")))?;

    let local_key_id = hex::decode(thumbprint)
        .map_err(|e| KeyCredError::Generate(format!("invalid thumbprint: {e}")))?;
    let chain = PrivateKeyChain::new(key_der, local_key_id, vec![certificate]);

    let mut keystore = KeyStore::new();
    keystore.add_entry(alias, KeyStoreEntry::PrivateKeyChain(chain));

    keystore
        .writer(passphrase.expose_secret())
        .write()
        .map_err(|e| KeyCredError::Generate(format!("PKCS#12 packaging failed: {e}")))
}

fn to_offset(dt: DateTime<Utc>) -> Result<time::OffsetDateTime> {
    time::OffsetDateTime::from_unix_timestamp(dt.timestamp())
        .map_err(|e| KeyCredError::Generate(format!("timestamp out of range: {e}")))
}
