//! Continuous polling: print every published snapshot until interrupted.

use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use keenetic_core::{Controller, PollState, RouterConfig, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status;

fn print_snapshot(snapshot: &Snapshot, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = status::entries(snapshot, true, &[], snapshot.fetched_at);
    let body = status::render(&entries, global)?;
    let out = if matches!(global.output, OutputFormat::Table) {
        format!("{}\n{body}", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"))
    } else {
        body
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(mut config: RouterConfig, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        config.scan_interval = Duration::from_secs(secs.max(1));
    }
    // Firmware and Wi-Fi credentials are not shown here.
    config.firmware_interval = Duration::ZERO;
    config.wifi_interval = Duration::ZERO;
    config.wifi_credentials = false;

    let controller = Controller::new(config);
    controller.connect().await?;

    let result = watch_loop(&controller, args.count, global).await;
    controller.disconnect().await;
    result
}

async fn watch_loop(
    controller: &Controller,
    count: Option<usize>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut snapshots = controller.subscribe();
    let mut poll_state = controller.poll_state();
    let mut printed = 0usize;

    if let Some(first) = snapshots.current() {
        print_snapshot(first, global)?;
        printed += 1;
    }

    while count.is_none_or(|limit| printed < limit) {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            snap = snapshots.changed() => {
                let Some(snap) = snap else { break };
                print_snapshot(&snap, global)?;
                printed += 1;
            }
            changed = poll_state.changed() => {
                if changed.is_err() {
                    break;
                }
                report_failure(&poll_state, controller, global);
            }
        }
    }
    Ok(())
}

/// A failed cycle keeps the previous snapshot; say so on stderr.
fn report_failure(poll_state: &watch::Receiver<PollState>, controller: &Controller, global: &GlobalOpts) {
    if *poll_state.borrow() != PollState::Failed || global.quiet {
        return;
    }
    let status = controller.cycle_status();
    eprintln!(
        "warning: poll failed, keeping snapshot from {}: {}",
        status
            .last_success_at
            .map_or_else(|| "-".into(), |t| t.format("%H:%M:%S").to_string()),
        status.last_error.as_deref().unwrap_or("unknown error")
    );
}
