//! Service principal endpoints: the credential upload and its pre-flight check.

use crate::GraphClient;
use keycred_core::{CredentialPayload, Result, ServicePrincipal};
use serde::Serialize;
use tracing::{info, warn};

const COLLECTION: &str = "servicePrincipals";

/// Service principal endpoints
pub struct ServicePrincipalApi<'a> {
    client: &'a GraphClient,
}

/// Outcome of [`ServicePrincipalApi::upload_credentials`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// State seen by the pre-flight GET
    pub before: ServicePrincipal,

    /// State seen by the confirming GET, if it succeeded
    pub after: Option<ServicePrincipal>,

    /// Identifier of the uploaded credentials
    pub custom_key_identifier: String,

    /// The confirming GET shows the new signing key
    pub confirmed: bool,

    /// Why confirmation could not be performed
    pub confirmation_error: Option<String>,
}

impl<'a> ServicePrincipalApi<'a> {
    pub(crate) const fn new(client: &'a GraphClient) -> Self {
        Self { client }
    }

    /// Get a service principal by object identifier.
    ///
    /// This is the idempotent pre-flight check: run it before mutating, and
    /// again after any upload whose outcome is unknown.
    pub async fn get(&self, object_id: &str) -> Result<ServicePrincipal> {
        self.client.get(&[COLLECTION, object_id]).await
    }

    /// PATCH the service principal with a credential payload.
    ///
    /// Graph replaces the whole `keyCredentials` and `passwordCredentials`
    /// collections with the ones in the payload. Succeeds on any 2xx (Graph
    /// answers `204 No Content`). Not retried: after a timeout, GET the
    /// service principal to learn whether the update applied.
    pub async fn update_key_credentials(&self, object_id: &str, payload: &CredentialPayload) -> Result<()> {
        self.client.patch(&[COLLECTION, object_id], payload).await
    }

    /// Pre-flight GET, PATCH, then a confirming GET.
    ///
    /// A failing pre-flight aborts before anything is sent. A failing PATCH is
    /// returned as is. A failing confirmation is recorded in the report rather
    /// than returned, since the update itself was accepted.
    pub async fn upload_credentials(
        &self,
        object_id: &str,
        payload: &CredentialPayload,
    ) -> Result<UploadReport> {
        let custom_key_identifier = payload.custom_key_identifier().to_string();

        let before = self.get(object_id).await?;
        info!(
            id = %before.id,
            name = %before.label(),
            existing_key_credentials = before.key_credentials.len(),
            existing_password_credentials = before.password_credentials.len(),
            "pre-flight check passed"
        );
        if !before.key_credentials.is_empty() {
            warn!(
                count = before.key_credentials.len(),
                "existing key credentials will be replaced by this upload"
            );
        }
        if before
            .credentials_with_identifier(&custom_key_identifier)
            .next()
            .is_some()
        {
            warn!(
                %custom_key_identifier,
                "a credential with this customKeyIdentifier is already installed"
            );
        }

        self.update_key_credentials(object_id, payload).await?;
        info!(id = %object_id, %custom_key_identifier, "credentials uploaded");

        let (after, confirmed, confirmation_error) = match self.get(object_id).await {
            Ok(after) => {
                let confirmed = after.has_signing_key(&custom_key_identifier);
                if !confirmed {
                    warn!(%custom_key_identifier, "uploaded signing key not visible yet");
                }
                (Some(after), confirmed, None)
            }
            Err(e) => {
                warn!(error = %e, "update accepted but confirmation GET failed");
                (None, false, Some(e.to_string()))
            }
        };

        Ok(UploadReport {
            before,
            after,
            custom_key_identifier,
            confirmed,
            confirmation_error,
        })
    }
}
