//! Focus Monitor - Main Entry Point

use std::sync::Arc;

use alerting::{Notifier, NullNotifier};
use anyhow::Context;
use clap::Parser;
use monitor::cli::Cli;
use monitor::{init_logging, replay, MonitorSettings, SessionHub};
use storage::DailySummary;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = MonitorSettings::load(cli.config.as_deref())?;
    cli.apply(&mut settings);

    init_logging(&settings.logging);

    info!("=== Focus Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let chain = settings.sound.notifier_chain();
    let notifier: Arc<dyn Notifier> = if chain.is_empty() {
        Arc::new(NullNotifier)
    } else {
        Arc::new(chain)
    };
    let (repo, sink) = settings.open_storage();
    let hub = SessionHub::new(settings.focus.clone(), notifier, sink);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            info!("Reading frames from {}", path.display());
            Box::new(BufReader::new(file))
        }
        None => {
            info!("Reading frames from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let report = replay(
        &hub,
        &settings.focus,
        settings.sound.enabled,
        reader,
        tokio::io::stdout(),
        shutdown,
    )
    .await?;

    let effects = hub.shutdown().await;
    info!(
        "Read {} lines ({} skipped); {} alerts and {} snapshots delivered, {} failed",
        report.lines,
        report.skipped,
        effects.alerts.delivered,
        effects.snapshots.delivered,
        effects.alerts.failed + effects.snapshots.failed
    );

    let summary = DailySummary::from_records(&repo.recent(usize::MAX)?);
    match report.view {
        Some(last) => info!(
            "Final score {} | {} snapshots, average {:.1}, focused {:.0}%",
            last.focus_score,
            summary.snapshots,
            summary.average_score,
            summary.focused_share * 100.0
        ),
        None => info!("No frames received"),
    }

    Ok(())
}
