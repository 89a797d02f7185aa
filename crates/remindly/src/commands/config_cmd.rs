//! Config subcommand handlers.

use dialoguer::{Input, Select};

use remindly_config::Config;

use super::util::prompt_err;
use crate::cli::{ColorMode, ConfigArgs, ConfigCommand, OutputFormat};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

const VALID_KEYS: &str = "email, password_env, device_id, auth_token, poll_seconds, \
     force_update, force_on_tick, name, model, serial, storage_dir, api_base, ca_cert, \
     timeout, defaults.output, defaults.color";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy with secrets masked, for display.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    if out.password.is_some() {
        out.password = Some(MASK.into());
    }
    if out.auth_token.is_some() {
        out.auth_token = Some(MASK.into());
    }
    out
}

/// The file as written, without CLI flag overrides.
fn load_file(ctx: &Context) -> Result<Config, CliError> {
    Ok(remindly_config::load_config_from(&ctx.config_path)?)
}

fn save(ctx: &Context, cfg: &Config) -> Result<(), CliError> {
    remindly_config::save_config_to(&ctx.config_path, cfg)?;
    Ok(())
}

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value
        .parse()
        .map_err(|_| invalid(field, "must be 'true' or 'false'"))
}

fn prompt_password() -> Result<String, CliError> {
    let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if password.is_empty() {
        return Err(invalid("password", "password cannot be empty"));
    }
    Ok(password)
}

/// Apply one `key = value` assignment.
fn set_key(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    let optional = |v: String| Some(v).filter(|v| !v.is_empty());
    match key {
        "email" => cfg.email = optional(value),
        "password_env" | "password-env" => cfg.password_env = optional(value),
        "device_id" | "device-id" => cfg.device_id = optional(value),
        "auth_token" | "auth-token" => cfg.auth_token = optional(value),
        "name" => cfg.name = optional(value),
        "model" => cfg.model = optional(value),
        "serial" => cfg.serial = optional(value),
        "storage_dir" | "storage-dir" => cfg.storage_dir = optional(value).map(Into::into),
        "ca_cert" | "ca-cert" => cfg.ca_cert = optional(value).map(Into::into),
        "api_base" | "api-base" => {
            if !value.is_empty() && url::Url::parse(&value).is_err() {
                return Err(invalid("api_base", "must be an absolute URL"));
            }
            cfg.api_base = optional(value);
        }
        "poll_seconds" | "poll-seconds" => {
            cfg.poll_seconds = value
                .parse()
                .map_err(|_| invalid("poll_seconds", "must be a whole number of seconds"))?;
        }
        "timeout" => {
            cfg.timeout = value
                .parse()
                .map_err(|_| invalid("timeout", "must be a number (seconds)"))?;
        }
        "force_update" | "force-update" => cfg.force_update = parse_bool(key, &value)?,
        "force_on_tick" | "force-on-tick" => cfg.force_on_tick = parse_bool(key, &value)?,
        "defaults.output" => {
            <OutputFormat as clap::ValueEnum>::from_str(&value, true)
                .map_err(|_| invalid(key, "must be table, json, json-compact, yaml or plain"))?;
            cfg.defaults.output = value;
        }
        "defaults.color" => {
            <ColorMode as clap::ValueEnum>::from_str(&value, true)
                .map_err(|_| invalid(key, "must be auto, always or never"))?;
            cfg.defaults.color = value;
        }
        other => {
            return Err(invalid(
                other,
                &format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
            ));
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(ctx: &Context) -> Result<(), CliError> {
    eprintln!("remindly configuration wizard");
    eprintln!("   Config path: {}\n", ctx.config_path.display());

    let mut cfg = load_file(ctx).unwrap_or_default();

    let email: String = Input::new()
        .with_prompt("Remind account email")
        .with_initial_text(cfg.email.clone().unwrap_or_default())
        .interact_text()
        .map_err(prompt_err)?;
    if email.is_empty() {
        return Err(invalid("email", "email cannot be empty"));
    }

    let password = prompt_password()?;

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        remindly_config::store_password(&email, &password)?;
        cfg.password = None;
        eprintln!("   ✓ password stored in system keyring");
    } else {
        cfg.password = Some(password);
    }

    let poll_seconds: i64 = Input::new()
        .with_prompt("Seconds between polls")
        .default(cfg.poll_seconds)
        .interact_text()
        .map_err(prompt_err)?;

    cfg.email = Some(email);
    cfg.poll_seconds = poll_seconds;
    save(ctx, &cfg)?;

    eprintln!("\n✓ Configuration written to {}", ctx.config_path.display());
    eprintln!("\n  Test it: remindly discover");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(ctx),

        ConfigCommand::Show => {
            let cfg = redacted(&load_file(ctx)?);
            let out = output::render_single(
                ctx.format,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |_| ctx.config_path.display().to_string(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = load_file(ctx)?;
            set_key(&mut cfg, &key, value)?;
            save(ctx, &cfg)?;
            if !ctx.quiet {
                eprintln!("✓ Set {key}");
            }
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = load_file(ctx)?;
            let email = cfg
                .email
                .filter(|e| !e.is_empty())
                .ok_or(CliError::NoCredentials)?;
            let password = prompt_password()?;
            remindly_config::store_password(&email, &password)?;
            if !ctx.quiet {
                eprintln!("✓ Password for {email} stored in system keyring");
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}
