//! `keycred upload` - register the certificate on a service principal.

use anyhow::Result;
use colored::Colorize;
use keycred::{prepare_upload, UploadOptions, UploadReport};
use serde_json::json;

use super::show::print_service_principal;
use super::{read_passphrase, with_hint, Context};
use crate::cli::args::UploadArgs;
use crate::education::Explain;

pub async fn execute(ctx: &Context, args: UploadArgs) -> Result<()> {
    if ctx.explain {
        Explain::upload(&args.object_id).print();
    }

    // Fail on a missing token before prompting for the passphrase.
    let client = if args.dry_run { None } else { Some(ctx.graph()?) };

    let passphrase = read_passphrase(false)?;
    let options = UploadOptions {
        display_name: ctx.display_name(args.display_name),
        allow_expired: args.allow_expired,
        now: None,
    };
    let prepared =
        prepare_upload(&args.files.pfx, &args.files.cer, &passphrase, &options).map_err(with_hint)?;

    let Some(client) = client else {
        let preview = json!({
            "dryRun": true,
            "objectId": args.object_id,
            "thumbprint": prepared.material.thumbprint(),
            "payload": prepared.payload.redacted(),
        });
        if !ctx.output_format.emit(&preview)? {
            println!("{} nothing was sent.", "Dry run:".yellow().bold());
            println!("{}", prepared.material.summary());
            println!();
            println!("{}", serde_json::to_string_pretty(&preview["payload"])?);
        }
        return Ok(());
    };

    let report = client
        .service_principals()
        .upload_credentials(&args.object_id, &prepared.payload)
        .await
        .map_err(with_hint)?;

    if ctx.output_format.emit(&report)? {
        return Ok(());
    }

    print_report(ctx, &report, prepared.material.thumbprint());
    Ok(())
}

fn print_report(ctx: &Context, report: &UploadReport, thumbprint: &str) {
    if report.confirmed {
        println!(
            "{} Signing key {} registered on {}.",
            "Success:".green().bold(),
            thumbprint.cyan(),
            report.before.label()
        );
    } else {
        println!(
            "{} PATCH accepted, but the new key was not seen on read-back.",
            "Warning:".yellow().bold()
        );
        if let Some(reason) = &report.confirmation_error {
            println!("  {reason}");
        }
        println!("  Run 'keycred show {}' to check.", report.before.id);
    }

    if let Some(after) = &report.after {
        println!();
        print_service_principal(after);
    }

    if let Some(app_id) = &report.before.app_id {
        println!();
        println!(
            "{} keycred discovery --app-id {app_id} --tenant {} --thumbprint {thumbprint} --fetch",
            "Next:".dimmed(),
            ctx.tenant_or_common()
        );
    }
}
