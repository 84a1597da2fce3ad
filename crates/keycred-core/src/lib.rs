//! Core types and errors for managing custom signing keys on Entra ID service principals.
//!
//! This crate provides the foundational types used across the keycred workspace:
//!
//! - **Payload**: [`CredentialPayload`] and its [`KeyCredential`] / [`PasswordCredential`]
//!   entries, serialized exactly as Microsoft Graph expects them
//! - **Graph resources**: [`ServicePrincipal`], [`ClaimsMappingPolicy`]
//! - **Discovery documents**: [`OpenIdConfiguration`], [`JsonWebKeySet`]
//! - **Errors**: [`KeyCredError`] and the [`UploadError`] subkinds
//!
//! # Example
//!
//! ```rust,ignore
//! use keycred_core::{CredentialPayload, Result};
//!
//! fn summarize(payload: &CredentialPayload) -> Result<()> {
//!     println!("customKeyIdentifier: {}", payload.custom_key_identifier());
//!     println!("{}", serde_json::to_string_pretty(&payload.redacted())?);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/keycred-core/0.1.0")]

mod error;
pub mod types;

pub use error::{KeyCredError, Result, UploadError, UploadErrorKind, WindowProblem};
pub use types::*;
