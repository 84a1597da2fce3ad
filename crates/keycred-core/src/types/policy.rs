use serde::{Deserialize, Serialize};

/// A claims-mapping policy directory object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimsMappingPolicy {
    /// Object identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Policy definition documents, each a JSON string
    #[serde(default)]
    pub definition: Vec<String>,

    /// Whether the policy applies tenant-wide
    #[serde(default)]
    pub is_organization_default: bool,
}

/// Body of `POST /policies/claimsMappingPolicies`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaimsMappingPolicy {
    /// Policy definition documents, each a JSON string
    pub definition: Vec<String>,

    /// Display name
    pub display_name: String,

    /// Whether the policy applies tenant-wide
    pub is_organization_default: bool,
}

impl NewClaimsMappingPolicy {
    /// Wrap a definition document (the `{"ClaimsMappingPolicy": {...}}` object).
    ///
    /// Graph stores the definition as a string, so the document is serialized
    /// compactly into the single element of `definition`.
    pub fn from_document(
        display_name: impl Into<String>,
        document: &serde_json::Value,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            definition: vec![serde_json::to_string(document)?],
            display_name: display_name.into(),
            is_organization_default: false,
        })
    }
}

/// Body of a `$ref` POST linking a directory object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryObjectReference {
    /// Absolute URL of the referenced object
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

/// Graph collection envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphCollection<T> {
    /// Items in this page
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,

    /// Link to the next page, if any
    #[serde(default, rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_is_stringified() {
        let doc = json!({
            "ClaimsMappingPolicy": {
                "Version": 1,
                "IncludeBasicClaimSet": "true",
                "ClaimsSchema": [{"Source": "user", "ID": "employeeid", "JwtClaimType": "employeeid"}]
            }
        });
        let policy = NewClaimsMappingPolicy::from_document("employeeid", &doc).unwrap();
        let body = serde_json::to_value(&policy).unwrap();
        assert_eq!(body["displayName"], "employeeid");
        assert_eq!(body["isOrganizationDefault"], false);
        let definition = body["definition"][0].as_str().unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(definition).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_reference_field_name() {
        let reference = DirectoryObjectReference {
            odata_id: "https://graph.microsoft.com/v1.0/policies/claimsMappingPolicies/abc".into(),
        };
        let body = serde_json::to_string(&reference).unwrap();
        assert!(body.starts_with(r#"{"@odata.id":"#));
    }
}
