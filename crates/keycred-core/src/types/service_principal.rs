use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::graph_datetime;

/// Service principal as returned by `GET /servicePrincipals/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    /// Object identifier
    pub id: String,

    /// Application (client) identifier
    #[serde(default)]
    pub app_id: Option<String>,

    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Installed key credentials (Graph never returns the key material)
    #[serde(default)]
    pub key_credentials: Vec<KeyCredentialInfo>,

    /// Installed password credentials (Graph never returns the secret)
    #[serde(default)]
    pub password_credentials: Vec<PasswordCredentialInfo>,

    /// Thumbprint of the key tokens are signed with, when set
    #[serde(default)]
    pub preferred_token_signing_key_thumbprint: Option<String>,
}

impl ServicePrincipal {
    /// Key credentials carrying the given custom key identifier
    pub fn credentials_with_identifier<'a>(
        &'a self,
        custom_key_identifier: &'a str,
    ) -> impl Iterator<Item = &'a KeyCredentialInfo> + 'a {
        self.key_credentials
            .iter()
            .filter(move |k| k.custom_key_identifier.as_deref() == Some(custom_key_identifier))
    }

    /// Returns true if a Sign credential with this identifier is installed
    #[must_use]
    pub fn has_signing_key(&self, custom_key_identifier: &str) -> bool {
        self.credentials_with_identifier(custom_key_identifier)
            .any(|k| k.usage.as_deref() == Some("Sign"))
    }

    /// Name to show an operator
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Read-side view of a key credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCredentialInfo {
    /// base64 custom key identifier
    #[serde(default)]
    pub custom_key_identifier: Option<String>,

    /// Entry identifier
    #[serde(default)]
    pub key_id: Option<String>,

    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// `X509CertAndPassword`, `AsymmetricX509Cert`, ...
    #[serde(default, rename = "type")]
    pub credential_type: Option<String>,

    /// `Sign` or `Verify`
    #[serde(default)]
    pub usage: Option<String>,

    /// Start of validity
    #[serde(default, with = "graph_datetime::option")]
    pub start_date_time: Option<DateTime<Utc>>,

    /// End of validity
    #[serde(default, with = "graph_datetime::option")]
    pub end_date_time: Option<DateTime<Utc>>,
}

/// Read-side view of a password credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredentialInfo {
    /// base64 custom key identifier
    #[serde(default)]
    pub custom_key_identifier: Option<String>,

    /// Entry identifier
    #[serde(default)]
    pub key_id: Option<String>,

    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// First characters of the secret, as Graph reports them
    #[serde(default)]
    pub hint: Option<String>,

    /// Start of validity
    #[serde(default, with = "graph_datetime::option")]
    pub start_date_time: Option<DateTime<Utc>>,

    /// End of validity
    #[serde(default, with = "graph_datetime::option")]
    pub end_date_time: Option<DateTime<Utc>>,
}
