//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use secrecy::SecretString;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load()?;

    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or_default();

    let tenant = cli.tenant.or_else(|| config.tenant.clone());

    let ctx = commands::Context {
        token: cli.token.map(SecretString::from),
        tenant,
        output_format,
        explain: cli.explain,
        config,
    };
    debug!(output = %ctx.output_format, tenant = ?ctx.tenant, explain = ctx.explain, "configuration resolved");

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(&ctx, args),
        Commands::Build(args) => commands::build::execute(&ctx, args),
        Commands::Show(args) => commands::show::execute(&ctx, args).await,
        Commands::Upload(args) => commands::upload::execute(&ctx, args).await,
        Commands::Policy(args) => commands::policy::execute(&ctx, args).await,
        Commands::Discovery(args) => commands::discovery::execute(&ctx, args).await,
        Commands::Config(args) => commands::config::execute(&ctx, args),
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
