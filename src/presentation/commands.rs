// Console commands - Maps typed lines onto dashboard control events
use crate::application::dashboard_session::ControlEvent;
use crate::domain::filter::{CompareMode, Granularity};
use crate::domain::preset::RangePreset;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  apply                          re-render with the current controls
  preset <3h|6h|12h|24h|7d|30d|6m|1y|5y|10y|custom>
  granularity <minute|Nm|hour|day|week|month>
  agg <max|min|avg|...>
  world <id|all>
  location <id|all>
  membership <f2p|members|all>
  compare <none|type|location|worlds>
  start <YYYY-MM-DDTHH:MM|clear>
  end <YYYY-MM-DDTHH:MM|clear>
  reset-zoom
  refresh
  status | history | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Control(ControlEvent),
    Status,
    History,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("'{0}' needs a value")]
    MissingValue(&'static str),
    #[error("Invalid value for '{command}': {value}")]
    InvalidValue { command: &'static str, value: String },
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let command = match name {
        "apply" => Command::Control(ControlEvent::Apply),
        "reset-zoom" => Command::Control(ControlEvent::ResetZoom),
        "refresh" => Command::Control(ControlEvent::RefreshTick),
        "status" => Command::Status,
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "preset" => {
            let value = require("preset", arg)?;
            let preset = RangePreset::parse(value).ok_or_else(|| invalid("preset", value))?;
            Command::Control(ControlEvent::PresetSelected(preset))
        }
        "granularity" => {
            let value = require("granularity", arg)?;
            let granularity =
                Granularity::parse(value).ok_or_else(|| invalid("granularity", value))?;
            Command::Control(ControlEvent::GranularitySelected(granularity))
        }
        "agg" => {
            let value = require("agg", arg)?;
            Command::Control(ControlEvent::AggregationSelected(value.to_string()))
        }
        "world" => {
            let world = optional_id::<u32>("world", require("world", arg)?)?;
            Command::Control(ControlEvent::WorldSelected(world))
        }
        "location" => {
            let location = optional_id::<i64>("location", require("location", arg)?)?;
            Command::Control(ControlEvent::LocationSelected(location))
        }
        "membership" => {
            let is_f2p = match require("membership", arg)? {
                "f2p" | "1" => Some(true),
                "members" | "p2p" | "0" => Some(false),
                "all" => None,
                other => return Err(invalid("membership", other)),
            };
            Command::Control(ControlEvent::MembershipSelected(is_f2p))
        }
        "compare" => {
            let value = require("compare", arg)?;
            Command::Control(ControlEvent::CompareSelected(CompareMode::parse(value)))
        }
        "start" => {
            let start = optional_time("start", require("start", arg)?)?;
            Command::Control(ControlEvent::StartEdited(start))
        }
        "end" => {
            let end = optional_time("end", require("end", arg)?)?;
            Command::Control(ControlEvent::EndEdited(end))
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn require<'a>(command: &'static str, arg: Option<&'a str>) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::MissingValue(command))
}

fn invalid(command: &'static str, value: &str) -> CommandError {
    CommandError::InvalidValue {
        command,
        value: value.to_string(),
    }
}

fn optional_id<T: std::str::FromStr>(
    command: &'static str,
    value: &str,
) -> Result<Option<T>, CommandError> {
    if value == "all" {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| invalid(command, value))
}

fn optional_time(
    command: &'static str,
    value: &str,
) -> Result<Option<DateTime<Local>>, CommandError> {
    if value == "clear" {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .map_err(|_| invalid(command, value))?;
    // Skipped or repeated local times (DST changes) pick the earliest match.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(Some)
        .ok_or_else(|| invalid(command, value))
}
