//! Microsoft Graph client for custom signing key credentials.
//!
//! This crate provides the [`GraphClient`] used to upload a credential payload
//! to a service principal and manage claims-mapping policies, and the
//! [`DiscoveryClient`] for the identity platform's discovery documents.

#![doc(html_root_url = "https://docs.rs/keycred-graph/0.1.0")]

mod client;
mod discovery;
mod http;
pub mod api;

pub use api::UploadReport;
pub use client::{GraphClient, GraphClientBuilder, DEFAULT_GRAPH_URL, DEFAULT_TIMEOUT};
pub use discovery::{DiscoveryClient, COMMON_TENANT, DEFAULT_LOGIN_URL};
pub use keycred_core::{KeyCredError, Result, UploadError, UploadErrorKind};
