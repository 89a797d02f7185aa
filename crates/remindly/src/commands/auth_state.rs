//! `remindly auth-state`: whether a device identity is stored.

use serde::Serialize;

use remindly_core::Identity;

use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthState {
    has_identity: bool,
    identity: Identity,
}

fn detail(state: &AuthState) -> String {
    let id = &state.identity;
    output::key_value_table([
        ("Identity stored", Some(state.has_identity.to_string())),
        ("Device id", id.device_id.clone()),
        ("Auth token", id.auth_token.clone()),
        ("Name", id.name.clone()),
        ("Model", id.model.clone()),
        ("Serial", id.serial.clone()),
        ("Firmware", id.firmware.clone()),
    ])
}

pub fn handle(ctx: &Context) -> Result<(), CliError> {
    let store = ctx.store();
    let state = AuthState {
        has_identity: store.has_identity(),
        identity: store.load_identity().redacted(),
    };
    let out = output::render_single(ctx.format, &state, detail, |s| s.has_identity.to_string())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
