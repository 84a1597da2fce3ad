//! Claims-mapping policy endpoints.

use crate::GraphClient;
use keycred_core::{
    ClaimsMappingPolicy, DirectoryObjectReference, GraphCollection, KeyCredError,
    NewClaimsMappingPolicy, Result,
};
use tracing::info;

const POLICIES: &str = "policies";
const CLAIMS_MAPPING_POLICIES: &str = "claimsMappingPolicies";
const SERVICE_PRINCIPALS: &str = "servicePrincipals";
const REF: &str = "$ref";

/// Claims-mapping policy endpoints
pub struct ClaimsMappingPolicyApi<'a> {
    client: &'a GraphClient,
}

impl<'a> ClaimsMappingPolicyApi<'a> {
    pub(crate) const fn new(client: &'a GraphClient) -> Self {
        Self { client }
    }

    /// Create a policy
    pub async fn create(&self, policy: &NewClaimsMappingPolicy) -> Result<ClaimsMappingPolicy> {
        let created: ClaimsMappingPolicy = self
            .client
            .post(&[POLICIES, CLAIMS_MAPPING_POLICIES], policy)
            .await?;
        info!(id = %created.id, name = %policy.display_name, "created claims-mapping policy");
        Ok(created)
    }

    /// Get a policy by identifier
    pub async fn get(&self, policy_id: &str) -> Result<ClaimsMappingPolicy> {
        self.client
            .get(&[POLICIES, CLAIMS_MAPPING_POLICIES, policy_id])
            .await
    }

    /// List all policies in the tenant
    pub async fn list(&self) -> Result<Vec<ClaimsMappingPolicy>> {
        let first = self.client.get(&[POLICIES, CLAIMS_MAPPING_POLICIES]).await?;
        self.collect_pages(first).await
    }

    /// Assign a policy to a service principal.
    ///
    /// A service principal holds at most one claims-mapping policy; Graph
    /// rejects a second assignment with a 4xx.
    pub async fn assign(&self, object_id: &str, policy_id: &str) -> Result<()> {
        let reference = DirectoryObjectReference {
            odata_id: self
                .client
                .resource_url(&[POLICIES, CLAIMS_MAPPING_POLICIES, policy_id])?
                .to_string(),
        };
        self.client
            .post_empty(
                &[SERVICE_PRINCIPALS, object_id, CLAIMS_MAPPING_POLICIES, REF],
                &reference,
            )
            .await?;
        info!(%object_id, %policy_id, "assigned claims-mapping policy");
        Ok(())
    }

    /// Remove a policy assignment from a service principal
    pub async fn unassign(&self, object_id: &str, policy_id: &str) -> Result<()> {
        self.client
            .delete(&[
                SERVICE_PRINCIPALS,
                object_id,
                CLAIMS_MAPPING_POLICIES,
                policy_id,
                REF,
            ])
            .await?;
        info!(%object_id, %policy_id, "removed claims-mapping policy assignment");
        Ok(())
    }

    /// Policies assigned to a service principal
    pub async fn assigned(&self, object_id: &str) -> Result<Vec<ClaimsMappingPolicy>> {
        let first = self
            .client
            .get(&[SERVICE_PRINCIPALS, object_id, CLAIMS_MAPPING_POLICIES])
            .await?;
        self.collect_pages(first).await
    }

    /// Follow `@odata.nextLink` until the collection is exhausted
    async fn collect_pages(
        &self,
        first: GraphCollection<ClaimsMappingPolicy>,
    ) -> Result<Vec<ClaimsMappingPolicy>> {
        let mut items = first.value;
        let mut next = first.next_link;

        while let Some(link) = next {
            let url = url::Url::parse(&link).map_err(|e| KeyCredError::InvalidUrl(format!("{link}: {e}")))?;
            let page: GraphCollection<ClaimsMappingPolicy> = self.client.get_url(url).await?;
            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }
}
