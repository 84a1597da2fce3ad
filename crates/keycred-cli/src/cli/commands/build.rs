//! `keycred build` - produce the credential payload without uploading it.

use anyhow::{Context as _, Result};
use colored::Colorize;
use keycred::{prepare_upload, UploadOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::{read_passphrase, with_hint, Context};
use crate::cli::args::BuildArgs;
use crate::education::Explain;

pub fn execute(ctx: &Context, args: BuildArgs) -> Result<()> {
    if ctx.explain {
        Explain::build().print();
    }

    let passphrase = read_passphrase(false)?;
    let options = UploadOptions {
        display_name: ctx.display_name(args.display_name),
        allow_expired: true,
        now: None,
    };
    let prepared =
        prepare_upload(&args.files.pfx, &args.files.cer, &passphrase, &options).map_err(with_hint)?;

    if let Some(out) = &args.out {
        let body = serde_json::to_string_pretty(&prepared.payload)?;
        write_private(out, body.as_bytes())
            .with_context(|| format!("Could not write {}", out.display()))?;
        eprintln!(
            "{} Payload written to {} (contains the PFX passphrase).",
            "Success:".green().bold(),
            out.display()
        );
    }

    let redacted = prepared.payload.redacted();
    if ctx.output_format.emit(&redacted)? {
        return Ok(());
    }

    println!("{}", prepared.material.summary().bold());
    println!(
        "  {} {}",
        "customKeyIdentifier:".bold(),
        prepared.payload.custom_key_identifier().cyan()
    );
    println!();
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    if args.out.is_none() {
        println!();
        println!(
            "{}",
            "secretText is redacted here; use --out FILE for the complete body.".dimmed()
        );
    }

    Ok(())
}

/// Write a file readable only by its owner (on Unix).
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    // mode() only applies to newly created files.
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}
