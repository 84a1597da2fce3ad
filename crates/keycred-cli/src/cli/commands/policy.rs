//! `keycred policy` - claims-mapping policies.

use anyhow::{Context as _, Result};
use colored::Colorize;
use keycred::{ClaimsMappingPolicy, NewClaimsMappingPolicy};

use super::{with_hint, Context};
use crate::cli::args::{PolicyArgs, PolicyCommands};
use crate::education::Explain;

pub async fn execute(ctx: &Context, args: PolicyArgs) -> Result<()> {
    match args.command {
        PolicyCommands::Create {
            definition,
            display_name,
        } => {
            if ctx.explain {
                Explain::policy_create(&display_name).print();
            }

            let raw = std::fs::read_to_string(&definition)
                .with_context(|| format!("Could not read {}", definition.display()))?;
            let document: serde_json::Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", definition.display()))?;
            let policy = NewClaimsMappingPolicy::from_document(&display_name, &document)?;

            let created = ctx
                .graph()?
                .claims_mapping_policies()
                .create(&policy)
                .await
                .map_err(with_hint)?;

            if !ctx.output_format.emit(&created)? {
                println!(
                    "{} Created policy {} ({}).",
                    "Success:".green().bold(),
                    display_name.cyan(),
                    created.id
                );
                println!(
                    "{} keycred policy assign <object-id> {}",
                    "Next:".dimmed(),
                    created.id
                );
            }
        }

        PolicyCommands::Assign {
            object_id,
            policy_id,
        } => {
            if ctx.explain {
                Explain::policy_assign(&object_id, &policy_id).print();
            }

            ctx.graph()?
                .claims_mapping_policies()
                .assign(&object_id, &policy_id)
                .await
                .map_err(with_hint)?;

            let result = serde_json::json!({ "objectId": object_id, "policyId": policy_id, "assigned": true });
            if !ctx.output_format.emit(&result)? {
                println!(
                    "{} Policy {} assigned to {}.",
                    "Success:".green().bold(),
                    policy_id.cyan(),
                    object_id
                );
            }
        }

        PolicyCommands::List { object_id } => {
            if ctx.explain {
                Explain::policy_list(object_id.as_deref()).print();
            }

            let client = ctx.graph()?;
            let api = client.claims_mapping_policies();
            let policies = match &object_id {
                Some(id) => api.assigned(id).await,
                None => api.list().await,
            }
            .map_err(with_hint)?;

            if !ctx.output_format.emit(&policies)? {
                print_policies(&policies);
            }
        }
    }

    Ok(())
}

fn print_policies(policies: &[ClaimsMappingPolicy]) {
    if policies.is_empty() {
        println!("{}", "No claims-mapping policies.".dimmed());
        return;
    }

    for policy in policies {
        let default = if policy.is_organization_default {
            " (organization default)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "{}  {}{}",
            policy.id.dimmed(),
            policy.display_name.as_deref().unwrap_or("(unnamed)").bold(),
            default
        );
    }
}
