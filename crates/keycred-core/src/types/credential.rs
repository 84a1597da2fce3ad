use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::common::graph_datetime;

/// Kind of key material carried by a key credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCredentialType {
    /// PFX with private key, unlocked by the paired password credential
    X509CertAndPassword,
    /// Public certificate only
    AsymmetricX509Cert,
}

/// What the key is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyUsage {
    /// Token signing
    Sign,
    /// Token verification
    Verify,
}

impl KeyCredentialType {
    /// The usage that goes with this type
    #[must_use]
    pub const fn usage(self) -> KeyUsage {
        match self {
            Self::X509CertAndPassword => KeyUsage::Sign,
            Self::AsymmetricX509Cert => KeyUsage::Verify,
        }
    }
}

/// One `keyCredentials` entry of an upload payload.
///
/// Field order follows the layout Graph documents for custom signing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCredential {
    /// base64(SHA-256(thumbprint)), shared by all entries of one upload
    pub custom_key_identifier: String,

    /// Certificate notAfter
    #[serde(with = "graph_datetime")]
    pub end_date_time: DateTime<Utc>,

    /// Fresh identifier for this entry
    pub key_id: Uuid,

    /// Certificate notBefore
    #[serde(with = "graph_datetime")]
    pub start_date_time: DateTime<Utc>,

    /// Key material kind
    #[serde(rename = "type")]
    pub credential_type: KeyCredentialType,

    /// Sign or Verify
    pub usage: KeyUsage,

    /// base64 of the raw PFX or CER file
    pub key: String,

    /// Friendly name shown in the portal
    pub display_name: String,
}

/// The `passwordCredentials` entry that unlocks the signing PFX.
///
/// `Debug` never prints the secret; serialization does, because Graph needs it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredential {
    /// Same value as the key credentials
    pub custom_key_identifier: String,

    /// Same value as the Sign key credential
    pub key_id: Uuid,

    /// Certificate notAfter
    #[serde(with = "graph_datetime")]
    pub end_date_time: DateTime<Utc>,

    /// Certificate notBefore
    #[serde(with = "graph_datetime")]
    pub start_date_time: DateTime<Utc>,

    /// PFX passphrase
    #[serde(serialize_with = "expose_secret")]
    pub secret_text: SecretString,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Body of the service principal PATCH that installs a custom signing key.
///
/// Built once per certificate rotation by the payload builder in `keycred-cert`.
/// There are no setters: a new certificate means a new payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    key_credentials: Vec<KeyCredential>,
    password_credentials: Vec<PasswordCredential>,
}

impl CredentialPayload {
    /// Assemble a payload from its three entries.
    ///
    /// Callers are expected to have derived all three from the same certificate;
    /// see `keycred_cert::PayloadBuilder`.
    #[must_use]
    pub fn new(sign: KeyCredential, verify: KeyCredential, password: PasswordCredential) -> Self {
        Self {
            key_credentials: vec![sign, verify],
            password_credentials: vec![password],
        }
    }

    /// All key credentials, Sign entry first
    #[must_use]
    pub fn key_credentials(&self) -> &[KeyCredential] {
        &self.key_credentials
    }

    /// The password credential(s)
    #[must_use]
    pub fn password_credentials(&self) -> &[PasswordCredential] {
        &self.password_credentials
    }

    /// The signing entry
    #[must_use]
    pub fn sign_credential(&self) -> &KeyCredential {
        &self.key_credentials[0]
    }

    /// The verification entry
    #[must_use]
    pub fn verify_credential(&self) -> &KeyCredential {
        &self.key_credentials[1]
    }

    /// The password entry
    #[must_use]
    pub fn password_credential(&self) -> &PasswordCredential {
        &self.password_credentials[0]
    }

    /// Identifier shared by every entry
    #[must_use]
    pub fn custom_key_identifier(&self) -> &str {
        &self.sign_credential().custom_key_identifier
    }

    /// Render the payload with key material and secret replaced, for logs and dry runs.
    #[must_use]
    pub fn redacted(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(keys) = value.get_mut("keyCredentials").and_then(|v| v.as_array_mut()) {
            for key in keys {
                if let Some(material) = key.get_mut("key") {
                    let len = material.as_str().map_or(0, str::len);
                    *material = serde_json::Value::String(format!("<{len} base64 chars>"));
                }
            }
        }
        if let Some(passwords) = value
            .get_mut("passwordCredentials")
            .and_then(|v| v.as_array_mut())
        {
            for password in passwords {
                if let Some(secret) = password.get_mut("secretText") {
                    *secret = serde_json::Value::String("<redacted>".into());
                }
            }
        }
        value
    }
}
