//! Command implementations.

pub mod build;
pub mod config;
pub mod discovery;
pub mod generate;
pub mod policy;
pub mod show;
pub mod upload;

use anyhow::{Context as _, Result};
use colored::Colorize;
use keycred::{
    DiscoveryClient, GraphClient, KeyCredError, SecretString, UploadError, COMMON_TENANT,
    DEFAULT_LOGIN_URL,
};

use crate::config::Config;
use crate::output::OutputFormat;

/// Environment variable holding the PFX passphrase for non-interactive use
pub const PASSWORD_ENV: &str = "KEYCRED_PFX_PASSWORD";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Graph bearer token
    pub token: Option<SecretString>,

    /// Tenant for discovery URLs
    pub tenant: Option<String>,

    /// Output format
    pub output_format: OutputFormat,

    /// Whether to show educational explanations
    pub explain: bool,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// Get the bearer token, returning an error if not set.
    pub fn require_token(&self) -> Result<SecretString> {
        self.token.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "Graph bearer token required.\n\n\
                 Set it with one of:\n  \
                 1. --token <TOKEN>\n  \
                 2. KEYCRED_GRAPH_TOKEN environment variable\n\n\
                 For example: az account get-access-token --resource-type ms-graph --query accessToken -o tsv"
            )
        })
    }

    /// Create a Graph client from the token and configured endpoint.
    pub fn graph(&self) -> Result<GraphClient> {
        let mut builder = GraphClient::builder(self.require_token()?).timeout(self.config.timeout());
        if let Some(url) = &self.config.graph_base_url {
            builder = builder.base_url(url.clone());
        }
        Ok(builder.build()?)
    }

    /// Create a discovery client for the configured authority.
    pub fn discovery(&self) -> Result<DiscoveryClient> {
        let base = self
            .config
            .login_base_url
            .as_deref()
            .unwrap_or(DEFAULT_LOGIN_URL);
        Ok(DiscoveryClient::with_base_url(base, self.config.timeout())?)
    }

    /// Tenant segment for discovery URLs.
    pub fn tenant_or_common(&self) -> &str {
        self.tenant.as_deref().unwrap_or(COMMON_TENANT)
    }

    /// Display name from the flag, else the config default.
    pub fn display_name(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.config.display_name.clone())
    }
}

/// Read the PFX passphrase from the environment or a hidden prompt.
///
/// `confirm` asks twice, for passphrases that protect a new file.
pub fn read_passphrase(confirm: bool) -> Result<SecretString> {
    if let Ok(value) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(value));
    }

    let mut prompt = dialoguer::Password::new().with_prompt("PFX passphrase");
    if confirm {
        prompt = prompt.with_confirmation("Confirm passphrase", "Passphrases do not match");
    }
    let value = prompt
        .interact()
        .with_context(|| format!("No terminal for the passphrase prompt; set {PASSWORD_ENV}"))?;
    Ok(SecretString::from(value))
}

/// Add operator hints to library errors before they reach `main`.
pub fn with_hint(err: KeyCredError) -> anyhow::Error {
    let hint = match err.as_upload() {
        Some(UploadError::Timeout(_)) => Some(
            "The request may still have been applied. Run 'keycred show <object-id>' before retrying.",
        ),
        Some(UploadError::Http4xx { status: 401, .. }) => {
            Some("The token is missing, expired, or issued for another resource.")
        }
        Some(UploadError::Http4xx { status: 403, .. }) => {
            Some("The token lacks the required Graph permission. Run with --explain to see which.")
        }
        Some(UploadError::Http4xx { status: 404, .. }) => {
            Some("Use the service principal object ID, not the application (client) ID.")
        }
        Some(UploadError::Http5xx { .. }) => {
            Some("Graph failed mid-request. Run 'keycred show <object-id>' to see what was applied.")
        }
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(err).context(format!("{} {hint}", "Hint:".yellow().bold())),
        None => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(token: Option<&str>) -> Context {
        Context {
            token: token.map(|t| SecretString::from(t.to_string())),
            tenant: None,
            output_format: OutputFormat::Pretty,
            explain: false,
            config: Config::default(),
        }
    }

    #[test]
    fn test_missing_token_explains_sources() {
        let err = context(None).require_token().unwrap_err().to_string();
        assert!(err.contains("KEYCRED_GRAPH_TOKEN"));
        assert!(context(Some("t")).graph().is_ok());
    }

    #[test]
    fn test_display_name_precedence() {
        let mut ctx = context(None);
        ctx.config.display_name = Some("from-config".into());
        assert_eq!(ctx.display_name(Some("flag".into())).as_deref(), Some("flag"));
        assert_eq!(ctx.display_name(None).as_deref(), Some("from-config"));
        assert_eq!(ctx.tenant_or_common(), "common");
    }

    #[test]
    fn test_timeout_hint() {
        colored::control::set_override(false);
        let err = with_hint(KeyCredError::Upload(UploadError::Timeout(30)));
        assert!(err.to_string().contains("keycred show"));
        let plain = with_hint(KeyCredError::Encoding("x".into()));
        assert!(!plain.to_string().contains("Hint"));
    }
}
