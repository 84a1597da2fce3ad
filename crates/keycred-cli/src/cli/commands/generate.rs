//! `keycred generate` - create a self-signed signing certificate.

use anyhow::{Context as _, Result};
use colored::Colorize;
use keycred::{display_datetime, parse_graph_datetime, SelfSignedRequest};
use serde_json::json;

use super::{read_passphrase, with_hint, Context};
use crate::cli::args::GenerateArgs;
use crate::education::Explain;

pub fn execute(ctx: &Context, args: GenerateArgs) -> Result<()> {
    if ctx.explain {
        Explain::generate(&args.subject).print();
    }

    let mut request = SelfSignedRequest::new(&args.subject).algorithm(args.algorithm);
    if let Some(days) = args.days {
        anyhow::ensure!(days > 0, "--days must be positive");
        request = request.valid_for_days(days).map_err(with_hint)?;
    }
    if let (Some(start), Some(end)) = (&args.not_before, &args.not_after) {
        let start = parse_graph_datetime(start)
            .with_context(|| format!("Invalid --not-before: {start}"))?;
        let end =
            parse_graph_datetime(end).with_context(|| format!("Invalid --not-after: {end}"))?;
        request = request.validity(start, end);
    }

    let passphrase = read_passphrase(true)?;
    let generated = request.generate(&passphrase).map_err(with_hint)?;
    generated
        .write_files(&args.pfx, &args.cer, args.force)
        .map_err(with_hint)?;

    let summary = json!({
        "subject": generated.subject,
        "thumbprint": generated.thumbprint,
        "notBefore": display_datetime(&generated.not_before),
        "notAfter": display_datetime(&generated.not_after),
        "algorithm": args.algorithm.to_string(),
        "pfx": args.pfx.display().to_string(),
        "cer": args.cer.display().to_string(),
    });
    if ctx.output_format.emit(&summary)? {
        return Ok(());
    }

    println!("{} Certificate generated.", "Success:".green().bold());
    println!();
    println!("  {:<12} {}", "Subject:".bold(), generated.subject);
    println!("  {:<12} {}", "Thumbprint:".bold(), generated.thumbprint.cyan());
    println!(
        "  {:<12} {} to {}",
        "Valid:".bold(),
        display_datetime(&generated.not_before),
        display_datetime(&generated.not_after)
    );
    println!("  {:<12} {}", "Algorithm:".bold(), args.algorithm);
    println!("  {:<12} {}", "PFX:".bold(), args.pfx.display());
    println!("  {:<12} {}", "CER:".bold(), args.cer.display());
    println!();
    println!(
        "{} keycred upload <object-id> --pfx {} --cer {}",
        "Next:".dimmed(),
        args.pfx.display(),
        args.cer.display()
    );

    Ok(())
}
