//! `keycred show` - service principal and its registered credentials.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use keycred::{display_datetime, ServicePrincipal};

use super::{with_hint, Context};
use crate::cli::args::ShowArgs;
use crate::education::Explain;

pub async fn execute(ctx: &Context, args: ShowArgs) -> Result<()> {
    if ctx.explain {
        Explain::show(&args.object_id).print();
    }

    let client = ctx.graph()?;
    let sp = client
        .service_principals()
        .get(&args.object_id)
        .await
        .map_err(with_hint)?;

    if ctx.output_format.emit(&sp)? {
        return Ok(());
    }

    print_service_principal(&sp);
    Ok(())
}

/// Human-readable listing shared with `upload`
pub fn print_service_principal(sp: &ServicePrincipal) {
    println!("{} {}", sp.label().bold(), format!("({})", sp.id).dimmed());
    if let Some(app_id) = &sp.app_id {
        println!("  {:<16} {}", "App ID:".bold(), app_id);
    }
    if let Some(thumbprint) = &sp.preferred_token_signing_key_thumbprint {
        println!("  {:<16} {}", "Signing key:".bold(), thumbprint.cyan());
    }

    println!();
    if sp.key_credentials.is_empty() {
        println!("  {}", "No key credentials.".dimmed());
    }
    for key in &sp.key_credentials {
        println!(
            "  {:<20} {:<8} {} {}",
            key.credential_type.as_deref().unwrap_or("?"),
            key.usage.as_deref().unwrap_or("?"),
            key.custom_key_identifier.as_deref().unwrap_or("-"),
            validity(key.start_date_time.as_ref(), key.end_date_time.as_ref()).dimmed()
        );
    }
    for password in &sp.password_credentials {
        println!(
            "  {:<20} {:<8} {} {}",
            "Password",
            password.hint.as_deref().unwrap_or(""),
            password.custom_key_identifier.as_deref().unwrap_or("-"),
            validity(password.start_date_time.as_ref(), password.end_date_time.as_ref()).dimmed()
        );
    }
}

fn validity(start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>) -> String {
    let fmt = |dt: Option<&DateTime<Utc>>| dt.map_or_else(|| "?".to_string(), display_datetime);
    format!("{} to {}", fmt(start), fmt(end))
}
