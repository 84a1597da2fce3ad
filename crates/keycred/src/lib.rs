//! Custom token signing keys for Entra ID service principals.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use keycred::{GraphClient, SecretString};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> keycred::Result<()> {
//!     let passphrase = SecretString::from(std::env::var("KEYCRED_PFX_PASSWORD").unwrap());
//!     let token = SecretString::from(std::env::var("KEYCRED_GRAPH_TOKEN").unwrap());
//!
//!     let prepared = keycred::prepare_upload(
//!         "signing.pfx".as_ref(),
//!         "signing.cer".as_ref(),
//!         &passphrase,
//!         &keycred::UploadOptions::default(),
//!     )?;
//!
//!     let client = GraphClient::new(token)?;
//!     let report = client
//!         .service_principals()
//!         .upload_credentials("00000000-0000-0000-0000-000000000000", &prepared.payload)
//!         .await?;
//!     println!("confirmed: {}", report.confirmed);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/keycred/0.1.0")]

mod workflow;

// Re-export core types
pub use keycred_core::*;

// Re-export certificate handling
pub use keycred_cert::{
    load_certificate, thumbprint, CertificateMaterial, GeneratedCertificate, KeyAlgorithm,
    PayloadBuilder, SelfSignedRequest, DEFAULT_VALIDITY_DAYS,
};

// Re-export clients
pub use keycred_graph::{
    api, DiscoveryClient, GraphClient, GraphClientBuilder, UploadReport, COMMON_TENANT,
    DEFAULT_GRAPH_URL, DEFAULT_LOGIN_URL, DEFAULT_TIMEOUT,
};

pub use workflow::{prepare_upload, PreparedUpload, UploadOptions};

// Re-export runtime for convenience
pub use secrecy::{ExposeSecret, SecretString};
pub use tokio;
pub use serde;
pub use serde_json;
