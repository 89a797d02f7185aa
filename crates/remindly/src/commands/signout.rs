//! `remindly signout`: forget the stored identity and status.

use crate::config::Context;
use crate::error::CliError;

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.store();
    if !super::util::confirm("Forget the stored device identity?", "signout", ctx.yes)? {
        return Ok(());
    }
    store.clear();
    if !ctx.quiet {
        eprintln!("✓ Stored identity cleared ({})", store.dir().display());
    }
    Ok(())
}
