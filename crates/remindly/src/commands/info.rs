//! `remindly info`: dealer contact and regeneration timing from the store.

use remindly_core::StoreSummary;

use crate::config::Context;
use crate::error::CliError;
use crate::output;

fn detail(summary: &StoreSummary) -> String {
    output::key_value_table([
        ("Dealer", summary.dealer_name.clone()),
        ("Phone", summary.dealer_phone.clone()),
        ("Email", summary.dealer_email.clone()),
        ("Last regen", summary.last_regen_date.clone()),
        ("Next regen", summary.next_regen_time.clone()),
        ("As of", summary.as_of.clone()),
    ])
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let summary = ctx.store().summary();
    let out = output::render_single(ctx.format, &summary, detail, |s| {
        s.dealer_name.clone().unwrap_or_default()
    })?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
