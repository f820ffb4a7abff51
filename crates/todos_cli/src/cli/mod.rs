use clap::{Parser, Subcommand};
use todos_core::config::{ConfigOverrides, canonicalize_key, parse_user_id};
use todos_core::error::AppError;
use todos_core::model::{Filter, TaskId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Task list client for a remote todos service", long_about = None)]
pub struct Cli {
    /// Command to run; starts an interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List tasks
    ///
    /// Example: todos list --filter active
    List {
        #[arg(short, long, value_name = "all|active|completed")]
        filter: Option<Filter>,
    },
    /// Add a new task
    ///
    /// Example: todos add "Buy milk"
    Add { title: Vec<String> },
    /// Delete a task on the server
    ///
    /// Example: todos delete 12
    Delete { id: TaskId },
    /// Flip a task's completed flag (session only, not saved)
    ///
    /// Example: toggle 12
    Toggle { id: TaskId },
    /// Complete every task, or reopen them all when all are done (session only)
    ToggleAll,
    /// Drop completed tasks from the list (session only, not saved)
    ClearCompleted,
    /// Choose which tasks are shown
    ///
    /// Example: filter completed
    Filter { filter: Filter },
    /// Hide the error notification
    Dismiss,
    /// Render the current screen
    Show,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Delete { .. } => "delete",
            Self::Toggle { .. } => "toggle",
            Self::ToggleAll => "toggle-all",
            Self::ClearCompleted => "clear-completed",
            Self::Filter { .. } => "filter",
            Self::Dismiss => "dismiss",
            Self::Show => "show",
        }
    }

    /// Commands whose effect only lives in the running session.
    pub fn is_session_only(&self) -> bool {
        matches!(
            self,
            Self::Toggle { .. }
                | Self::ToggleAll
                | Self::ClearCompleted
                | Self::Filter { .. }
                | Self::Dismiss
                | Self::Show
        )
    }
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    BaseUrl,
    UserId,
    ErrorTimeoutMs,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let field = canonicalize_key(key_raw);
    if field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match field.as_str() {
        "base_url" | "url" => ConfigOverrideTarget::BaseUrl,
        "user_id" | "user" => ConfigOverrideTarget::UserId,
        "error_timeout_ms" | "error_timeout" => ConfigOverrideTarget::ErrorTimeoutMs,
        "theme" => ConfigOverrideTarget::Theme,
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|err| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {err}")))?;
        match parsed.target {
            ConfigOverrideTarget::BaseUrl => overrides.base_url = Some(parsed.value),
            ConfigOverrideTarget::UserId => {
                overrides.user_id = Some(
                    parse_user_id(&parsed.value)
                        .map_err(|err| AppError::invalid_input(err.message()))?,
                )
            }
            ConfigOverrideTarget::ErrorTimeoutMs => {
                let millis = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input(format!(
                        "error_timeout_ms must be a number: '{}'",
                        parsed.value
                    ))
                })?;
                overrides.error_timeout_ms = Some(millis);
            }
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
        }
    }

    Ok(overrides)
}

pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits a session line into arguments, honouring double quotes and
/// backslash escapes inside them.
pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}
