//! Output formatting: table, JSON, YAML, plain.
//!
//! Single-record views render as a two-column key/value table; structured
//! formats serialize the record itself.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use remindly_core::{SensorReadings, Snapshot, StatusState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn paint_state(state: StatusState, color: bool) -> String {
    match (state, color) {
        (_, false) => state.to_string(),
        (StatusState::Normal, true) => state.green().to_string(),
        (StatusState::Alert, true) => state.red().bold().to_string(),
    }
}

fn paint_salt(readings: &SensorReadings, color: bool) -> String {
    let text = format!("{:.0}%", readings.salt_level);
    if color && readings.low_salt {
        text.yellow().bold().to_string()
    } else {
        text
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one serializable record in the chosen format.
///
/// `detail_fn` produces the table view; `plain_fn` the scripting view.
pub fn render_single<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(serialize_err),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(serialize_err),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(serialize_err),
        OutputFormat::Plain => Ok(plain_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn serialize_err(e: impl std::fmt::Display) -> CliError {
    CliError::Internal(format!("failed to serialize output: {e}"))
}

/// Rounded two-column table. Rows with no value are skipped.
pub fn key_value_table<'a>(rows: impl IntoIterator<Item = (&'a str, Option<String>)>) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        if let Some(value) = value {
            builder.push_record([key.to_owned(), value]);
        }
    }
    builder.build().with(Style::rounded()).to_string()
}

// ── Snapshot view ────────────────────────────────────────────────────

/// A snapshot with its derived sensor readings, as printed by `status`
/// and `run`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading<'a> {
    #[serde(flatten)]
    pub snapshot: &'a Snapshot,
    pub readings: SensorReadings,
    pub state: StatusState,
}

impl<'a> Reading<'a> {
    pub fn new(snapshot: &'a Snapshot, readings: SensorReadings) -> Self {
        Self {
            snapshot,
            readings,
            state: readings.state(),
        }
    }
}

pub fn render_reading(
    format: OutputFormat,
    color: bool,
    reading: &Reading<'_>,
) -> Result<String, CliError> {
    render_single(
        format,
        reading,
        |r| reading_detail(r, color),
        |r| {
            format!(
                "{} {} {}",
                r.readings.salt_level, r.readings.capacity_remaining, r.state
            )
        },
    )
}

fn reading_detail(reading: &Reading<'_>, color: bool) -> String {
    let s = reading.snapshot;
    let salt_lbs = s.salt_lbs.map(|lbs| match s.max_salt {
        Some(max) => format!("{lbs} / {max} lbs"),
        None => format!("{lbs} lbs"),
    });
    key_value_table([
        ("Name", Some(s.display_name.clone())),
        ("Model", Some(s.pretty_model.clone()).filter(|m| !m.is_empty())),
        ("Serial", Some(s.serial_number.clone())),
        ("State", Some(paint_state(reading.state, color))),
        ("System status", Some(s.system_status_name.clone())),
        ("Salt", Some(paint_salt(&reading.readings, color))),
        ("Salt weight", salt_lbs),
        ("Capacity", Some(format!("{}%", s.capacity_remaining))),
        ("Last regen", s.last_regen_date.clone()),
        ("Next regen", s.regen_time.clone()),
        ("As of", s.as_of.clone()),
        ("Firmware", s.firmware.clone()),
        ("Dealer", s.dealer_name.clone()),
        ("Fetched", Some(s.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())),
    ])
}
