use clap::{Parser, Subcommand};
use tasklist_core::config::{ConfigOverrides, canonicalize_name};
use tasklist_core::error::AppError;
use tasklist_core::model::Filter;

#[derive(Parser, Debug)]
#[command(name = "tasklist", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: tasklist add "Buy milk"
    Add { text: Option<String> },
    /// Flip a task between pending and completed
    ///
    /// Example: tasklist toggle 1718031234567
    Toggle { id: i64 },
    /// Delete a task after confirmation
    ///
    /// Example: tasklist delete 1718031234567
    /// Example: tasklist delete 1718031234567 --yes
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show tasks
    ///
    /// Example: tasklist list
    /// Example: tasklist list --filter pending
    /// Example: tasklist list --html
    List {
        /// One of: all, pending, completed
        #[arg(long)]
        filter: Option<Filter>,
        /// Render markup instead of a table; takes precedence over --json
        #[arg(long)]
        html: bool,
    },
    /// Change the active filter for the rest of the session
    ///
    /// Example: filter completed
    Filter { filter: Filter },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorageKey,
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

    let field = canonicalize_name(key_raw);
    let target = match field.as_str() {
        "" => return Err("override key cannot be empty".to_string()),
        "theme" => ConfigOverrideTarget::Theme,
        "storage_key" | "key" | "slot" => ConfigOverrideTarget::StorageKey,
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
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorageKey => overrides.storage_key = Some(parsed.value),
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, ConfigOverrideTarget, collect_overrides, parse_config_override};
    use clap::Parser;
    use tasklist_core::model::Filter;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Midnight ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Midnight");
    }

    #[test]
    fn parse_config_override_accepts_storage_key_spellings() {
        for raw in ["storage_key=work", "Storage-Key = work", "slot=work"] {
            let parsed = parse_config_override(raw).unwrap();
            assert_eq!(parsed.target, ConfigOverrideTarget::StorageKey);
            assert_eq!(parsed.value, "work");
        }
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_key() {
        let err = parse_config_override(" = noir").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn collect_overrides_keeps_last_value() {
        let raw = vec![
            "theme=light".to_string(),
            "theme=noir".to_string(),
            "storage_key=work".to_string(),
        ];

        let overrides = collect_overrides(&raw).unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.storage_key.as_deref(), Some("work"));
    }

    #[test]
    fn collect_overrides_reports_flag_name() {
        let err = collect_overrides(&["bogus".to_string()]).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(err.message().starts_with("--config-override"));
    }

    #[test]
    fn list_parses_filter_name() {
        let cli = Cli::try_parse_from(["tasklist", "list", "--filter", "completed"]).unwrap();
        match cli.command {
            Command::List { filter, html } => {
                assert_eq!(filter, Some(Filter::Completed));
                assert!(!html);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["tasklist", "list", "--filter", "urgent"]).is_err());
    }

    #[test]
    fn delete_accepts_yes_flag() {
        let cli = Cli::try_parse_from(["tasklist", "delete", "12", "-y"]).unwrap();
        match cli.command {
            Command::Delete { id, yes } => {
                assert_eq!(id, 12);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
