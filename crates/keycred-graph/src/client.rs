//! Microsoft Graph client.

use crate::api::{ClaimsMappingPolicyApi, ServicePrincipalApi};
use crate::http::{build_http, join_segments, parse_base_url, read_empty, read_json, transport_error};
use keycred_core::Result;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The Microsoft Graph v1.0 base URL
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Microsoft Graph client.
///
/// The bearer token is passed in explicitly; acquiring it (and choosing a
/// principal allowed to update application credentials) is up to the caller.
#[derive(Clone)]
pub struct GraphClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    token: SecretString,
    base_url: Url,
    timeout: Duration,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    /// Create a new client with the given bearer token using default settings
    pub fn new(token: SecretString) -> Result<Self> {
        GraphClientBuilder::new(token).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(token: SecretString) -> GraphClientBuilder {
        GraphClientBuilder::new(token)
    }

    /// Access service principal endpoints
    #[must_use]
    pub const fn service_principals(&self) -> ServicePrincipalApi<'_> {
        ServicePrincipalApi::new(self)
    }

    /// Access claims-mapping policy endpoints
    #[must_use]
    pub const fn claims_mapping_policies(&self) -> ClaimsMappingPolicyApi<'_> {
        ClaimsMappingPolicyApi::new(self)
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Absolute URL of a resource path, as used in `@odata.id` references
    pub fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.inner.base_url, segments)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.resource_url(segments)?;
        self.get_url(url).await
    }

    /// Perform a GET request against an absolute URL (e.g. `@odata.nextLink`)
    pub(crate) async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET request");
        let response = self.send(self.inner.http.get(url)).await?;
        read_json(response, self.inner.timeout).await
    }

    /// Perform a PATCH request with JSON body, expecting no content back
    pub(crate) async fn patch<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<()> {
        let url = self.resource_url(segments)?;
        debug!(url = %url, "PATCH request");
        let response = self.send(self.inner.http.patch(url).json(body)).await?;
        read_empty(response).await
    }

    /// Perform a POST request with JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.resource_url(segments)?;
        debug!(url = %url, "POST request");
        let response = self.send(self.inner.http.post(url).json(body)).await?;
        read_json(response, self.inner.timeout).await
    }

    /// Perform a POST request with JSON body, expecting no content back
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<()> {
        let url = self.resource_url(segments)?;
        debug!(url = %url, "POST request");
        let response = self.send(self.inner.http.post(url).json(body)).await?;
        read_empty(response).await
    }

    /// Perform a DELETE request
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = self.resource_url(segments)?;
        debug!(url = %url, "DELETE request");
        let response = self.send(self.inner.http.delete(url)).await?;
        read_empty(response).await
    }

    /// Attach the bearer token and send
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .bearer_auth(self.inner.token.expose_secret())
            .send()
            .await
            .map_err(|e| transport_error(&e, self.inner.timeout))
    }
}

/// Builder for configuring a [`GraphClient`]
pub struct GraphClientBuilder {
    token: SecretString,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl GraphClientBuilder {
    /// Create a new builder with the given bearer token
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            base_url: DEFAULT_GRAPH_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("keycred/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the base URL (national clouds, or a mock server in tests)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GraphClient> {
        let base_url = parse_base_url(&self.base_url)?;
        let http = build_http(self.timeout, &self.user_agent)?;

        Ok(GraphClient {
            inner: Arc::new(ClientInner {
                http,
                token: self.token,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}
