//! `keycred config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    if ctx.output_format.emit(config)? {
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();
    println!("{}", "Current Configuration:".bold());
    println!();
    println!("  {} {}", "tenant:".bold(), config.tenant.clone().unwrap_or_else(unset));
    println!(
        "  {} {}",
        "output_format:".bold(),
        config.output_format.unwrap_or_default()
    );
    println!(
        "  {} {}",
        "graph_base_url:".bold(),
        config.graph_base_url.as_deref().unwrap_or(keycred::DEFAULT_GRAPH_URL)
    );
    println!(
        "  {} {}",
        "login_base_url:".bold(),
        config.login_base_url.as_deref().unwrap_or(keycred::DEFAULT_LOGIN_URL)
    );
    println!("  {} {}", "timeout_secs:".bold(), config.timeout().as_secs());
    println!(
        "  {} {}",
        "display_name:".bold(),
        config.display_name.clone().unwrap_or_else(unset)
    );

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}
