//! Command-line argument definitions using clap.

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use keycred::KeyAlgorithm;
use std::path::PathBuf;

/// Register custom signing keys on Entra ID service principals
///
/// Generates a certificate, packages it as Graph key and password
/// credentials, and uploads it to the service principal that issues the
/// tokens. Use --explain on any command to see what it does.
#[derive(Parser, Debug)]
#[command(name = "keycred")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Graph bearer token (needs Application.ReadWrite.All or Policy.ReadWrite.ApplicationConfiguration)
    #[arg(long, env = "KEYCRED_GRAPH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Tenant ID or domain for discovery URLs
    #[arg(long, global = true)]
    pub tenant: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Explain what this command does before running it
    #[arg(long, global = true)]
    pub explain: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a self-signed certificate (PFX + CER)
    Generate(GenerateArgs),

    /// Build the credential payload without uploading it
    Build(BuildArgs),

    /// Show a service principal and its current credentials
    Show(ShowArgs),

    /// Upload the certificate to a service principal
    Upload(UploadArgs),

    /// Claims-mapping policies
    Policy(PolicyArgs),

    /// Print and check the appID-scoped discovery endpoints
    Discovery(DiscoveryArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

/// Certificate file pair shared by `build` and `upload`
#[derive(Args, Debug, Clone)]
pub struct CertificateFiles {
    /// PKCS#12 file holding the private key
    #[arg(long)]
    pub pfx: PathBuf,

    /// Public certificate (DER or PEM)
    #[arg(long)]
    pub cer: PathBuf,
}

// ============================================================================
// Certificate commands
// ============================================================================

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Subject common name (e.g. "CN=claims-signing")
    #[arg(long)]
    pub subject: String,

    /// Where to write the PKCS#12 file
    #[arg(long)]
    pub pfx: PathBuf,

    /// Where to write the DER certificate
    #[arg(long)]
    pub cer: PathBuf,

    /// Validity in days from now
    #[arg(long, conflicts_with_all = ["not_before", "not_after"])]
    pub days: Option<i64>,

    /// Start of validity (RFC 3339)
    #[arg(long, requires = "not_after")]
    pub not_before: Option<String>,

    /// End of validity (RFC 3339)
    #[arg(long, requires = "not_before")]
    pub not_after: Option<String>,

    /// Key algorithm (rsa2048, rsa4096, ecdsa-p256)
    #[arg(long, default_value_t = KeyAlgorithm::default())]
    pub algorithm: KeyAlgorithm,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub files: CertificateFiles,

    /// Display name for the key credentials (defaults to the certificate subject)
    #[arg(long)]
    pub display_name: Option<String>,

    /// Write the complete payload, secret included, to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
}

// ============================================================================
// Service principal commands
// ============================================================================

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Service principal object ID
    pub object_id: String,
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Service principal object ID (not the application ID)
    pub object_id: String,

    #[command(flatten)]
    pub files: CertificateFiles,

    /// Display name for the key credentials (defaults to the certificate subject)
    #[arg(long)]
    pub display_name: Option<String>,

    /// Build and show the payload without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Upload even if the certificate has expired
    #[arg(long)]
    pub allow_expired: bool,
}

// ============================================================================
// Policy commands
// ============================================================================

#[derive(Args, Debug)]
pub struct PolicyArgs {
    #[command(subcommand)]
    pub command: PolicyCommands,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Create a claims-mapping policy from a JSON definition file
    Create {
        /// JSON document, e.g. {"ClaimsMappingPolicy": {...}}
        #[arg(long)]
        definition: PathBuf,

        /// Policy display name
        #[arg(long)]
        display_name: String,
    },

    /// Assign a policy to a service principal
    Assign {
        /// Service principal object ID
        object_id: String,

        /// Policy ID
        policy_id: String,
    },

    /// List policies in the tenant, or those assigned to a service principal
    List {
        /// Service principal object ID
        object_id: Option<String>,
    },
}

// ============================================================================
// Discovery command
// ============================================================================

#[derive(Args, Debug)]
pub struct DiscoveryArgs {
    /// Application (client) ID
    #[arg(long)]
    pub app_id: String,

    /// SHA-1 thumbprint of the uploaded certificate to look for (implies --fetch)
    #[arg(long)]
    pub thumbprint: Option<String>,

    /// Fetch the documents instead of only printing their URLs
    #[arg(long)]
    pub fetch: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["keycred", "-vv", "config", "path"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_days_conflicts_with_window() {
        let result = Cli::try_parse_from([
            "keycred", "generate", "--subject", "CN=x", "--pfx", "a.pfx", "--cer", "a.cer",
            "--days", "30", "--not-before", "2024-01-01T00:00:00Z", "--not-after",
            "2025-01-01T00:00:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_upload_flags() {
        let cli = Cli::try_parse_from([
            "keycred", "upload", "sp-id", "--pfx", "a.pfx", "--cer", "a.cer", "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Upload(args) => {
                assert_eq!(args.object_id, "sp-id");
                assert!(args.dry_run);
                assert!(!args.allow_expired);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
