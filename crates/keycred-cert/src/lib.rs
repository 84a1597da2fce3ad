//! # keycred-cert
//!
//! Certificate side of the custom signing key workflow.
//!
//! ## Flow
//!
//! ```text
//! generate (optional)      load_certificate          PayloadBuilder
//! SelfSignedRequest ──► signing.pfx + signing.cer ──► CertificateMaterial ──► CredentialPayload
//! ```
//!
//! - [`SelfSignedRequest`] creates a passphrase-protected PFX and a DER CER
//! - [`load_certificate`] reads the pair back, checks they match, and extracts
//!   subject, thumbprint and validity window
//! - [`PayloadBuilder`] derives `customKeyIdentifier`, fresh `keyId`s and the
//!   base64 key material Graph expects
//!
//! ## Example
//!
//! ```rust,ignore
//! use keycred_cert::{load_certificate, PayloadBuilder};
//! use secrecy::SecretString;
//!
//! let passphrase = SecretString::from(std::env::var("KEYCRED_PFX_PASSWORD")?);
//! let material = load_certificate("signing.pfx".as_ref(), &passphrase, "signing.cer".as_ref())?;
//! let payload = PayloadBuilder::new(&material, &passphrase).build()?;
//! ```

mod generate;
mod loader;
mod material;
mod payload;
pub mod thumbprint;

pub use generate::{GeneratedCertificate, KeyAlgorithm, SelfSignedRequest, DEFAULT_VALIDITY_DAYS};
pub use loader::load_certificate;
pub use material::CertificateMaterial;
pub use payload::PayloadBuilder;
