//! Educational features: what each command does and which Graph calls it makes.

use colored::Colorize;

/// Command explanation builder.
pub struct Explain {
    description: String,
    requests: Vec<String>,
    permission: Option<String>,
    what_happens: Vec<String>,
    learn_more: Option<String>,
}

impl Explain {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            requests: Vec::new(),
            permission: None,
            what_happens: Vec::new(),
            learn_more: None,
        }
    }

    fn request(mut self, call: impl Into<String>) -> Self {
        self.requests.push(call.into());
        self
    }

    fn permission(mut self, scope: &str) -> Self {
        self.permission = Some(scope.to_string());
        self
    }

    fn step(mut self, step: impl Into<String>) -> Self {
        self.what_happens.push(step.into());
        self
    }

    fn docs(mut self, path: &str) -> Self {
        self.learn_more = Some(format!("https://learn.microsoft.com/{path}"));
        self
    }

    /// Print the explanation to stderr, keeping stdout for results.
    pub fn print(&self) {
        eprintln!();
        eprintln!("{}", "=== What This Does ===".bold().cyan());
        eprintln!("{}", self.description);
        eprintln!();

        if !self.what_happens.is_empty() {
            eprintln!("{}", "How it works:".bold());
            for (i, step) in self.what_happens.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            eprintln!();
        }

        for call in &self.requests {
            eprintln!("{} {}", "Request:".bold(), call.dimmed());
        }

        if let Some(scope) = &self.permission {
            eprintln!("{} {}", "Permission:".bold(), scope);
        }

        if let Some(url) = &self.learn_more {
            eprintln!();
            eprintln!("{} {}", "Learn more:".bold(), url.cyan().underline());
        }

        eprintln!();
        eprintln!("{}", "=== Results ===".bold().cyan());
        eprintln!();
    }

    // ========================================================================
    // Factory methods for each command
    // ========================================================================

    pub fn generate(subject: &str) -> Self {
        Self::new(format!("Creates a self-signed certificate for {subject}."))
            .step("Generates a key pair locally; nothing is sent anywhere")
            .step("Writes the private key and certificate as a password-protected PFX")
            .step("Writes the public certificate alone as a DER .cer file")
            .step("Entra ID signs tokens with RS256, so keep the default RSA key for real use")
            .docs("entra/identity-platform/certificate-credentials")
    }

    pub fn build() -> Self {
        Self::new("Builds the keyCredentials/passwordCredentials body without sending it.")
            .step("Loads the PFX with your passphrase and checks it matches the CER")
            .step("customKeyIdentifier = base64(SHA-256(certificate thumbprint))")
            .step("One Sign entry carries the PFX, one Verify entry carries the CER")
            .step("The passwordCredential holds the PFX passphrase and shares the Sign keyId")
            .docs("graph/api/resources/keycredential")
    }

    pub fn show(object_id: &str) -> Self {
        Self::new("Reads a service principal and the credentials registered on it.")
            .request(format!("GET /servicePrincipals/{object_id}"))
            .permission("Application.Read.All")
            .step("Graph never returns key material or secrets, only metadata")
            .docs("graph/api/serviceprincipal-get")
    }

    pub fn upload(object_id: &str) -> Self {
        Self::new("Registers your certificate as the token signing key of a service principal.")
            .request(format!("GET /servicePrincipals/{object_id}"))
            .request(format!("PATCH /servicePrincipals/{object_id}"))
            .request(format!("GET /servicePrincipals/{object_id}"))
            .permission("Application.ReadWrite.All")
            .step("Checks the service principal exists before changing anything")
            .step("PATCH replaces the whole keyCredentials and passwordCredentials collections")
            .step("Reads the service principal back to confirm the new key is there")
            .step("Nothing is retried: after a timeout, run 'keycred show' before trying again")
            .docs("graph/api/serviceprincipal-update")
    }

    pub fn policy_create(name: &str) -> Self {
        Self::new(format!("Creates the claims-mapping policy '{name}'."))
            .request("POST /policies/claimsMappingPolicies")
            .permission("Policy.ReadWrite.ApplicationConfiguration")
            .step("The definition file is sent as a single JSON string")
            .step("Tokens only carry mapped claims once the app has its own signing key")
            .docs("graph/api/claimsmappingpolicy-post-claimsmappingpolicies")
    }

    pub fn policy_assign(object_id: &str, policy_id: &str) -> Self {
        Self::new("Links a claims-mapping policy to a service principal.")
            .request(format!(
                "POST /servicePrincipals/{object_id}/claimsMappingPolicies/$ref"
            ))
            .permission("Policy.Read.All and Application.ReadWrite.All")
            .step(format!("The body references policy {policy_id} by @odata.id"))
            .step("A service principal can hold only one claims-mapping policy")
            .docs("graph/api/serviceprincipal-post-claimsmappingpolicies")
    }

    pub fn policy_list(object_id: Option<&str>) -> Self {
        let request = object_id.map_or_else(
            || "GET /policies/claimsMappingPolicies".to_string(),
            |id| format!("GET /servicePrincipals/{id}/claimsMappingPolicies"),
        );
        Self::new("Lists claims-mapping policies.")
            .request(request)
            .permission("Policy.Read.All")
            .docs("graph/api/claimsmappingpolicy-list")
    }

    pub fn discovery(app_id: &str) -> Self {
        Self::new("Shows where relying parties find the keys that sign this app's tokens.")
            .step("Apps with a custom signing key publish it only under the appid-scoped endpoints")
            .step(format!("Validators must append ?appid={app_id} to the metadata and keys URLs"))
            .step("The tenant-wide key set does not contain the custom key")
            .docs("entra/identity-platform/access-tokens")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_lists_all_three_requests() {
        let explain = Explain::upload("abc");
        assert_eq!(explain.requests.len(), 3);
        assert!(explain.requests[1].starts_with("PATCH"));
        assert!(explain
            .learn_more
            .as_deref()
            .unwrap()
            .ends_with("serviceprincipal-update"));
    }

    #[test]
    fn test_policy_list_scope() {
        assert!(Explain::policy_list(Some("sp")).requests[0].contains("/servicePrincipals/sp/"));
        assert_eq!(
            Explain::policy_list(None).requests[0],
            "GET /policies/claimsMappingPolicies"
        );
    }
}
