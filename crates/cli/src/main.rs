//! skiff: pick a demo agent and chat with it in the terminal.

use anyhow::Context;
use clap::Parser;
use skiff_cli::{AgentKind, DialoguerPicker, Services, TerminalDriver};
use skiff_config::AppConfig;
use skiff_core::error::SessionError;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "skiff",
    about = "Chat with skill-dispatching demo agents in the terminal",
    version
)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    // Logs go to stderr and stay quiet by default so they don't interleave with the chat.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    SKIFF_API_KEY=sk-...");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Or store it in a vault file:");
        eprintln!("    {}", AppConfig::vault_path(std::path::Path::new(".")).display());
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    }

    let services = Services::from_config(&config)?;
    let mut driver = TerminalDriver::stdio();

    let (index, session) = match driver.select(&DialoguerPicker, &AgentKind::labels()) {
        Ok(choice) => choice,
        Err(SessionError::NoAgentSelected) => return Ok(()),
        Err(e) => return Err(e).context("Agent menu failed"),
    };

    let agent = Arc::new(AgentKind::ALL[index].build(&services)?);
    let chat = agent.chat(session, true);
    driver.run(&chat).await?;
    Ok(())
}
