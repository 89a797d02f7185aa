//! `remindly status`: one fetch through the full pipeline.

use std::sync::Arc;

use remindly_core::{Poller, SensorReadings, Snapshot, SnapshotSink};

use crate::cli::StatusArgs;
use crate::config::Context;
use crate::error::CliError;
use crate::output::{self, Reading};

/// The result is printed from the tick's return value instead.
struct Discard;

impl SnapshotSink for Discard {
    fn on_snapshot(&self, _snapshot: &Snapshot, _readings: &SensorReadings) {}
}

pub async fn handle(args: &StatusArgs, ctx: &Context) -> Result<(), CliError> {
    let mut poller = Poller::from_config(ctx.poller_config()?, Arc::new(Discard)).await?;

    let spinner = super::util::spinner("Reading device status...", ctx.quiet);
    let result = poller.tick(args.force).await;
    spinner.finish_and_clear();

    let snapshot = result?;
    let reading = Reading::new(&snapshot, snapshot.readings());
    let out = output::render_reading(ctx.format, ctx.color, &reading)?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
