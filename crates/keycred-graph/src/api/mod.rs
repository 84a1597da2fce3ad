//! API endpoint modules.

mod claims_mapping;
mod service_principals;

pub use claims_mapping::ClaimsMappingPolicyApi;
pub use service_principals::{ServicePrincipalApi, UploadReport};
