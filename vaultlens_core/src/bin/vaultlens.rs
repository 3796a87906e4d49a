//! Render a file or unified diff with its Ansible Vault content decrypted.

use anyhow::{bail, Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vaultlens_core::orchestrator::{ChainPolicy, DecryptMode, Orchestrator};
use vaultlens_core::{looks_like_unified_diff, DecryptClient, Document};

#[derive(Parser)]
#[command(
    name = "vaultlens",
    about = "Reveal Ansible Vault content in files and unified diffs",
    version
)]
struct Cli {
    /// File to render; a unified diff is rendered as a diff view
    file: Utf8PathBuf,

    /// Decrypt every region, prompting for the vault password if needed
    #[arg(short, long)]
    interactive: bool,

    /// Stop at the first region that fails to decrypt
    #[arg(long)]
    halt_on_failure: bool,

    /// Print the rendered document as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("VAULTLENS_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("vaultlens=debug")
        } else {
            EnvFilter::new("vaultlens=warn")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file))?;
    let mut document = if looks_like_unified_diff(&text) {
        Document::from_unified_diff(&text)
    } else {
        Document::from_blob(cli.file.clone(), &text)
    };

    let policy = if cli.halt_on_failure {
        ChainPolicy::Halt
    } else {
        ChainPolicy::Continue
    };
    let client = DecryptClient::new(vaultlens_services::default_service());
    let mut orchestrator = Orchestrator::new(client).with_policy(policy);

    let scan = orchestrator.rescan(&mut document).await;
    tracing::debug!(regions = scan.detected.len(), "scan finished");

    let mut failures = 0;
    if cli.interactive {
        let report = orchestrator
            .decrypt_all(&mut document, DecryptMode::Interactive)
            .await;
        for result in report.failures() {
            match &result.outcome {
                Ok(outcome) => tracing::warn!(id = %result.id, ?outcome, "not decrypted"),
                Err(err) => tracing::warn!(id = %result.id, %err, "not decrypted"),
            }
            failures += 1;
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&document).context("failed to encode document")?;
        println!("{json}");
    } else {
        print!("{}", document.render_text());
    }

    if failures > 0 {
        bail!("{failures} region(s) could not be decrypted");
    }
    Ok(())
}
