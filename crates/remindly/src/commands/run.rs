//! `remindly run`: poll until Ctrl-C. `--log-file` is wired up in main.

use std::sync::Arc;

use tracing::{info, warn};

use remindly_core::{Identity, SensorReadings, Snapshot, SnapshotSink};

use crate::cli::OutputFormat;
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Reading};

/// Prints every delivered reading to stdout.
struct PrintSink {
    format: OutputFormat,
    color: bool,
    quiet: bool,
}

impl SnapshotSink for PrintSink {
    fn on_snapshot(&self, snapshot: &Snapshot, readings: &SensorReadings) {
        let reading = Reading::new(snapshot, *readings);
        match output::render_reading(self.format, self.color, &reading) {
            Ok(out) => output::print_output(&out, self.quiet),
            Err(e) => warn!(error = %e, "failed to render reading"),
        }
    }

    fn on_identity_changed(&self, identity: &Identity) {
        info!(
            model = identity.model.as_deref().unwrap_or("-"),
            serial = identity.serial.as_deref().unwrap_or("-"),
            firmware = identity.firmware.as_deref().unwrap_or("-"),
            dealer = identity.dealer_name.as_deref().unwrap_or("-"),
            "device information updated"
        );
    }
}

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.poller_config()?;
    let interval = config.poll_interval;
    let sink = Arc::new(PrintSink {
        format: ctx.format,
        color: ctx.color,
        quiet: ctx.quiet,
    });

    let handle = remindly_core::start(config, sink).await?;
    info!(
        every = %humantime::format_duration(interval),
        "polling; press Ctrl-C to stop"
    );

    let signal = tokio::signal::ctrl_c().await;
    info!("stopping");
    remindly_core::stop(handle).await;
    signal?;
    Ok(())
}
