//! `keycred discovery` - where relying parties fetch the custom signing key.

use anyhow::Result;
use colored::Colorize;
use keycred::thumbprint::x5t_from_thumbprint;
use serde_json::json;

use super::{with_hint, Context};
use crate::cli::args::DiscoveryArgs;
use crate::education::Explain;

pub async fn execute(ctx: &Context, args: DiscoveryArgs) -> Result<()> {
    if ctx.explain {
        Explain::discovery(&args.app_id).print();
    }

    let x5t = args
        .thumbprint
        .as_deref()
        .map(|thumbprint| {
            x5t_from_thumbprint(thumbprint)
                .ok_or_else(|| anyhow::anyhow!("--thumbprint must be a hex SHA-1 thumbprint"))
        })
        .transpose()?;

    let client = ctx.discovery()?;
    let tenant = ctx.tenant_or_common();
    let metadata_url = client.openid_configuration_url(tenant, Some(&args.app_id))?;
    let keys_url = client.signing_keys_url(tenant, Some(&args.app_id))?;

    let fetch = args.fetch || args.thumbprint.is_some();
    let mut result = json!({
        "tenant": tenant,
        "appId": args.app_id,
        "openidConfiguration": metadata_url.as_str(),
        "jwksUri": keys_url.as_str(),
    });

    if fetch {
        let config = client
            .openid_configuration(tenant, Some(&args.app_id))
            .await
            .map_err(with_hint)?;
        let keys = client
            .signing_keys(tenant, Some(&args.app_id))
            .await
            .map_err(with_hint)?;

        result["issuer"] = json!(config.issuer);
        result["advertisedJwksUri"] = json!(config.jwks_uri);
        result["kids"] = json!(keys.kids().collect::<Vec<_>>());

        if let (Some(thumbprint), Some(x5t)) = (&args.thumbprint, &x5t) {
            let found = keys.find_by_thumbprint(thumbprint, x5t);
            result["published"] = json!(found.is_some());
        }
    }

    if ctx.output_format.emit(&result)? {
        return Ok(());
    }

    println!("{}", "Relying parties validating this app's tokens must use:".bold());
    println!("  {:<10} {}", "Metadata:".bold(), metadata_url.as_str().cyan());
    println!("  {:<10} {}", "Keys:".bold(), keys_url.as_str().cyan());

    if fetch {
        println!();
        println!("  {:<10} {}", "Issuer:".bold(), result["issuer"].as_str().unwrap_or("?"));
        if let Some(kids) = result["kids"].as_array() {
            println!("  {:<10} {}", "Key IDs:".bold(), kids.len());
            for kid in kids.iter().filter_map(|k| k.as_str()) {
                println!("    {}", kid.dimmed());
            }
        }
        match result["published"].as_bool() {
            Some(true) => println!("{} the key is published.", "Found:".green().bold()),
            Some(false) => println!(
                "{} no published key matches this thumbprint. New keys can take a few minutes to appear.",
                "Missing:".yellow().bold()
            ),
            None => {}
        }
    } else {
        println!();
        println!("{}", "Add --fetch to download and inspect them.".dimmed());
    }

    Ok(())
}
