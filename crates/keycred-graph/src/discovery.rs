//! Identity platform discovery endpoints.
//!
//! Relying parties that validate tokens signed with a custom key must fetch
//! keys from the appID-scoped endpoint; the tenant-wide key set does not
//! contain application signing keys.

use crate::http::{build_http, join_segments, parse_base_url, read_json, transport_error};
use keycred_core::{JsonWebKey, JsonWebKeySet, OpenIdConfiguration, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// The identity platform authority
pub const DEFAULT_LOGIN_URL: &str = "https://login.microsoftonline.com";

/// Tenant segment for multi-tenant applications
pub const COMMON_TENANT: &str = "common";

/// Client for the read-only discovery documents
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: HttpClient,
    base_url: Url,
    timeout: Duration,
}

impl DiscoveryClient {
    /// Client against the public cloud authority
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_LOGIN_URL, crate::DEFAULT_TIMEOUT)
    }

    /// Client against another authority (national clouds, or a mock server in tests)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http(timeout, &format!("keycred/{}", env!("CARGO_PKG_VERSION")))?,
            base_url: parse_base_url(base_url)?,
            timeout,
        })
    }

    /// `/{tenant}/v2.0/.well-known/openid-configuration`, appID-scoped when `app_id` is given
    pub fn openid_configuration_url(&self, tenant: &str, app_id: Option<&str>) -> Result<Url> {
        let mut url = join_segments(
            &self.base_url,
            &[tenant, "v2.0", ".well-known", "openid-configuration"],
        )?;
        if let Some(app_id) = app_id {
            url.query_pairs_mut().append_pair("appid", app_id);
        }
        Ok(url)
    }

    /// `/{tenant}/discovery/v2.0/keys`, appID-scoped when `app_id` is given
    pub fn signing_keys_url(&self, tenant: &str, app_id: Option<&str>) -> Result<Url> {
        let mut url = join_segments(&self.base_url, &[tenant, "discovery", "v2.0", "keys"])?;
        if let Some(app_id) = app_id {
            url.query_pairs_mut().append_pair("appid", app_id);
        }
        Ok(url)
    }

    /// Fetch the OpenID Connect discovery document
    pub async fn openid_configuration(
        &self,
        tenant: &str,
        app_id: Option<&str>,
    ) -> Result<OpenIdConfiguration> {
        let url = self.openid_configuration_url(tenant, app_id)?;
        self.fetch(url).await
    }

    /// Fetch the published signing keys
    pub async fn signing_keys(&self, tenant: &str, app_id: Option<&str>) -> Result<JsonWebKeySet> {
        let url = self.signing_keys_url(tenant, app_id)?;
        let keys: JsonWebKeySet = self.fetch(url).await?;
        debug!(count = keys.keys.len(), "fetched signing keys");
        Ok(keys)
    }

    /// Look for a certificate in the appID-scoped key set.
    ///
    /// `thumbprint` is the hex SHA-1 thumbprint and `x5t` its base64url form.
    pub async fn find_signing_key(
        &self,
        tenant: &str,
        app_id: &str,
        thumbprint: &str,
        x5t: &str,
    ) -> Result<Option<JsonWebKey>> {
        let keys = self.signing_keys(tenant, Some(app_id)).await?;
        let found = keys.find_by_thumbprint(thumbprint, x5t).cloned();
        info!(%app_id, %thumbprint, published = found.is_some(), "checked appID-scoped signing keys");
        Ok(found)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(&e, self.timeout))?;
        read_json(response, self.timeout).await
    }
}
