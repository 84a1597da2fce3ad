use serde::{Deserialize, Serialize};

/// Subset of an OpenID Connect discovery document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenIdConfiguration {
    /// Token issuer (contains `{tenantid}` for the `common` tenant)
    pub issuer: String,

    /// Where the signing keys are published
    pub jwks_uri: String,

    /// Authorization endpoint
    #[serde(default)]
    pub authorization_endpoint: Option<String>,

    /// Token endpoint
    #[serde(default)]
    pub token_endpoint: Option<String>,

    /// Signing algorithms for ID tokens
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

/// A JSON Web Key Set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Published keys
    #[serde(default)]
    pub keys: Vec<JsonWebKey>,
}

/// One published signing key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type, e.g. `RSA`
    #[serde(default)]
    pub kty: Option<String>,

    /// Intended use, e.g. `sig`
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// Key identifier tokens reference in their `kid` header
    #[serde(default)]
    pub kid: Option<String>,

    /// base64url SHA-1 thumbprint of the certificate
    #[serde(default)]
    pub x5t: Option<String>,

    /// RSA modulus
    #[serde(default)]
    pub n: Option<String>,

    /// RSA exponent
    #[serde(default)]
    pub e: Option<String>,

    /// Certificate chain (base64 DER)
    #[serde(default)]
    pub x5c: Vec<String>,

    /// Issuer the key is valid for
    #[serde(default)]
    pub issuer: Option<String>,
}

impl JsonWebKeySet {
    /// Find the key published for a certificate.
    ///
    /// `thumbprint` is the hex SHA-1 thumbprint; `x5t` is its base64url form.
    /// Matching is on `kid` (case-insensitive hex) or `x5t`.
    #[must_use]
    pub fn find_by_thumbprint(&self, thumbprint: &str, x5t: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| {
            key.kid
                .as_deref()
                .is_some_and(|kid| kid.eq_ignore_ascii_case(thumbprint) || kid == x5t)
                || key.x5t.as_deref() == Some(x5t)
        })
    }

    /// Key identifiers, in publication order
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().filter_map(|k| k.kid.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &str = r#"{"keys":[
        {"kty":"RSA","use":"sig","kid":"nOo3ZDrODXEK1jKWhXslHR_KXEg","x5t":"nOo3ZDrODXEK1jKWhXslHR_KXEg","n":"oaLL","e":"AQAB","x5c":["MIIC"],"issuer":"https://login.microsoftonline.com/{tenantid}/v2.0"},
        {"kty":"RSA","use":"sig","kid":"2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED","x5t":"Kq5sNclPz7QV2-lfQIuc6R7oRu0","n":"xyz","e":"AQAB","x5c":[]}
    ]}"#;

    #[test]
    fn test_find_by_thumbprint_matches_kid() {
        let set: JsonWebKeySet = serde_json::from_str(KEYS).unwrap();
        let key = set
            .find_by_thumbprint("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed", "unused")
            .unwrap();
        assert_eq!(key.n.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_find_by_thumbprint_matches_x5t() {
        let set: JsonWebKeySet = serde_json::from_str(KEYS).unwrap();
        let key = set
            .find_by_thumbprint("0000", "Kq5sNclPz7QV2-lfQIuc6R7oRu0")
            .unwrap();
        assert_eq!(key.kid.as_deref(), Some("2AAE6C35C94FCFB415DBE95F408B9CE91EE846ED"));
        assert!(set.find_by_thumbprint("0000", "nope").is_none());
        assert_eq!(set.kids().count(), 2);
    }
}
