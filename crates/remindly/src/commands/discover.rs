//! `remindly discover`: resolve the account's device from email/password
//! and persist it as the stored identity.

use serde::Serialize;

use remindly_core::{AccountInfo, CloudClient};

use crate::config::Context;
use crate::error::CliError;
use crate::output;

/// Printable account summary; the token is never shown.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountView {
    customer_id: String,
    location_name: Option<String>,
    device_id: String,
    device_name: Option<String>,
    model: String,
    serial_number: String,
}

impl From<&AccountInfo> for AccountView {
    fn from(account: &AccountInfo) -> Self {
        Self {
            customer_id: account.customer_id.clone(),
            location_name: account.location_name.clone(),
            device_id: account.device_id.clone(),
            device_name: account.device_name.clone(),
            model: account.pretty_model.clone(),
            serial_number: account.serial_number.clone(),
        }
    }
}

fn detail(view: &AccountView) -> String {
    output::key_value_table([
        ("Customer", Some(view.customer_id.clone())),
        ("Location", view.location_name.clone()),
        ("Device id", Some(view.device_id.clone())),
        ("Device", view.device_name.clone()),
        ("Model", Some(view.model.clone()).filter(|m| !m.is_empty())),
        ("Serial", Some(view.serial_number.clone())),
    ])
}

pub async fn handle(ctx: &Context) -> Result<(), CliError> {
    let config = ctx.poller_config()?;
    let email = config.email.clone().ok_or(CliError::NoCredentials)?;
    let password = config.password.clone().ok_or_else(|| CliError::AuthFailed {
        message: format!("no password found for {email}"),
    })?;
    let cloud = CloudClient::from_config(&config)?;

    let spinner = super::util::spinner("Discovering account...", ctx.quiet);
    let result = cloud.discover_account(&email, &password).await;
    spinner.finish_and_clear();
    let account = result?;

    ctx.store().merge_identity(&account.identity_patch());

    let view = AccountView::from(&account);
    let out = output::render_single(ctx.format, &view, detail, |v| v.device_id.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
