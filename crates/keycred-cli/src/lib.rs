//! # keycred-cli
//!
//! Command-line front end for `keycred`.
//!
//! ## Features
//!
//! - **Certificates**: generate a self-signed PFX/CER pair, inspect the payload built from it
//! - **Upload**: pre-flight GET, PATCH of the service principal, confirming GET
//! - **Claims mapping**: create, assign and list claims-mapping policies
//! - **Discovery**: print and check the appID-scoped metadata and key endpoints
//! - **Educational mode**: `--explain` describes each step before it runs

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;
