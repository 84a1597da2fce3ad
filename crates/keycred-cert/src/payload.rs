//! Builds the Graph `keyCredentials` / `passwordCredentials` payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use keycred_core::{
    CredentialPayload, KeyCredError, KeyCredential, KeyCredentialType, PasswordCredential, Result,
    WindowProblem,
};
use secrecy::SecretString;
use tracing::debug;
use uuid::Uuid;

use crate::material::CertificateMaterial;
use crate::thumbprint::custom_key_identifier;

/// Packages certificate material into a [`CredentialPayload`].
///
/// ```rust,ignore
/// let payload = PayloadBuilder::new(&material, &passphrase)
///     .display_name("CN=claims-app")
///     .build()?;
/// ```
pub struct PayloadBuilder<'a> {
    material: &'a CertificateMaterial,
    passphrase: &'a SecretString,
    display_name: Option<String>,
}

impl<'a> PayloadBuilder<'a> {
    /// Start a payload for `material`, unlocked by `passphrase`
    #[must_use]
    pub const fn new(material: &'a CertificateMaterial, passphrase: &'a SecretString) -> Self {
        Self {
            material,
            passphrase,
            display_name: None,
        }
    }

    /// Display name for both key credentials (defaults to the certificate subject)
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Build the payload.
    ///
    /// # Errors
    ///
    /// Returns `KeyCredError::ValidityWindow` if notAfter is not after
    /// notBefore, and `KeyCredError::Encoding` if the PFX or CER bytes are
    /// missing. Expiry is not checked here.
    pub fn build(&self) -> Result<CredentialPayload> {
        let material = self.material;

        if material.not_after <= material.not_before {
            return Err(KeyCredError::ValidityWindow {
                kind: WindowProblem::Inverted,
                not_before: material.not_before,
                not_after: material.not_after,
            });
        }
        if material.pfx.is_empty() {
            return Err(KeyCredError::Encoding("PFX contents are empty".into()));
        }
        if material.cer.is_empty() {
            return Err(KeyCredError::Encoding("certificate contents are empty".into()));
        }
        if material.thumbprint.is_empty() {
            return Err(KeyCredError::Encoding("certificate thumbprint is missing".into()));
        }

        let sign_key_id = Uuid::new_v4();
        let mut verify_key_id = Uuid::new_v4();
        while verify_key_id == sign_key_id {
            verify_key_id = Uuid::new_v4();
        }

        let custom_key_identifier = custom_key_identifier(&material.thumbprint);
        let display_name = self
            .display_name
            .clone()
            .unwrap_or_else(|| material.subject.clone());

        let entry = |key_id: Uuid, credential_type: KeyCredentialType, bytes: &[u8]| KeyCredential {
            custom_key_identifier: custom_key_identifier.clone(),
            end_date_time: material.not_after,
            key_id,
            start_date_time: material.not_before,
            credential_type,
            usage: credential_type.usage(),
            key: STANDARD.encode(bytes),
            display_name: display_name.clone(),
        };

        let sign = entry(sign_key_id, KeyCredentialType::X509CertAndPassword, &material.pfx);
        let verify = entry(verify_key_id, KeyCredentialType::AsymmetricX509Cert, &material.cer);
        let password = PasswordCredential {
            custom_key_identifier: custom_key_identifier.clone(),
            key_id: sign_key_id,
            end_date_time: material.not_after,
            start_date_time: material.not_before,
            secret_text: self.passphrase.clone(),
        };

        debug!(
            custom_key_identifier = %custom_key_identifier,
            sign_key_id = %sign_key_id,
            verify_key_id = %verify_key_id,
            "built credential payload"
        );

        Ok(CredentialPayload::new(sign, verify, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{KeyAlgorithm, SelfSignedRequest};
    use chrono::{TimeZone, Utc};
    use keycred_core::KeyUsage;
    use secrecy::ExposeSecret;

    fn passphrase() -> SecretString {
        SecretString::from("payload-pass".to_string())
    }

    fn material() -> CertificateMaterial {
        SelfSignedRequest::new("CN=payload-test")
            .algorithm(KeyAlgorithm::EcdsaP256)
            .generate(&passphrase())
            .unwrap()
            .to_material(&passphrase())
            .unwrap()
    }

    #[test]
    fn test_shape_and_shared_identifier() {
        let material = material();
        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();

        assert_eq!(payload.key_credentials().len(), 2);
        assert_eq!(payload.password_credentials().len(), 1);

        let cki = payload.custom_key_identifier();
        assert_eq!(cki, custom_key_identifier(material.thumbprint()));
        assert!(payload
            .key_credentials()
            .iter()
            .all(|k| k.custom_key_identifier == cki));
        assert_eq!(payload.password_credential().custom_key_identifier, cki);
    }

    #[test]
    fn test_key_ids() {
        let material = material();
        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();

        let sign = payload.sign_credential();
        let verify = payload.verify_credential();
        assert_ne!(sign.key_id, verify.key_id);
        assert_eq!(payload.password_credential().key_id, sign.key_id);
        assert_eq!(sign.key_id.get_version_num(), 4);
    }

    #[test]
    fn test_types_and_usage() {
        let material = material();
        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();

        assert_eq!(
            payload.sign_credential().credential_type,
            KeyCredentialType::X509CertAndPassword
        );
        assert_eq!(payload.sign_credential().usage, KeyUsage::Sign);
        assert_eq!(
            payload.verify_credential().credential_type,
            KeyCredentialType::AsymmetricX509Cert
        );
        assert_eq!(payload.verify_credential().usage, KeyUsage::Verify);
        assert_eq!(
            payload.password_credential().secret_text.expose_secret(),
            "payload-pass"
        );
    }

    #[test]
    fn test_key_material_roundtrip() {
        let material = material();
        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();

        let pfx = STANDARD.decode(&payload.sign_credential().key).unwrap();
        let cer = STANDARD.decode(&payload.verify_credential().key).unwrap();
        assert_eq!(pfx, material.pfx_bytes());
        assert_eq!(cer, material.cer_bytes());
    }

    #[test]
    fn test_display_name_defaults_to_subject() {
        let material = material();
        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();
        assert_eq!(payload.sign_credential().display_name, "CN=payload-test");

        let payload = PayloadBuilder::new(&material, &passphrase())
            .display_name("claims signing key")
            .build()
            .unwrap();
        assert_eq!(payload.verify_credential().display_name, "claims signing key");
    }

    #[test]
    fn test_inverted_window_produces_no_payload() {
        let mut material = material();
        material.not_after = material.not_before;

        let err = PayloadBuilder::new(&material, &passphrase()).build().unwrap_err();
        assert!(matches!(
            err,
            KeyCredError::ValidityWindow { kind: WindowProblem::Inverted, .. }
        ));

        material.not_after = material.not_before - chrono::Duration::days(1);
        assert!(PayloadBuilder::new(&material, &passphrase()).build().is_err());
    }

    #[test]
    fn test_empty_material_is_encoding_error() {
        let mut material = material();
        material.cer.clear();

        let err = PayloadBuilder::new(&material, &passphrase()).build().unwrap_err();
        assert!(matches!(err, KeyCredError::Encoding(_)));
    }

    #[test]
    fn test_fixed_thumbprint_identifier() {
        let mut material = material();
        material.thumbprint = "8D4F1C5E2A3B4C5D6E7F8091A2B3C4D5E6F70812".into();

        let payload = PayloadBuilder::new(&material, &passphrase()).build().unwrap();
        assert_eq!(
            payload.custom_key_identifier(),
            "P+SSQxGHC99J89p2HBdvdLMC6pSN9qFQcEYCNndSXxg="
        );
    }

    #[test]
    fn test_expired_certificate_still_builds() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let material = SelfSignedRequest::new("expired")
            .validity(start, end)
            .algorithm(KeyAlgorithm::EcdsaP256)
            .generate(&passphrase())
            .unwrap()
            .to_material(&passphrase())
            .unwrap();

        assert!(PayloadBuilder::new(&material, &passphrase()).build().is_ok());
        assert!(material.ensure_not_expired(Utc::now()).is_err());
    }
}
