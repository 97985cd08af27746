//! Command line arguments.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand};
use orads_domain::{ConfigEdit, ScopedVar, ScopedVars, TimeRange};
use url::Url;

#[derive(Parser)]
#[command(name = "orads", author, version, about, long_about = None)]
pub struct Cli {
    /// Data source settings directory
    #[arg(long, env = "ORADS_CONFIG_DIR", default_value = ".", global = true)]
    pub config_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "ORADS_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve variables and run queries through the backend
    Query(QueryArgs),
    /// Show the resolved SQL the query editor would preview
    Preview(PreviewArgs),
    /// Run a variable query and list the distinct values
    VariableValues(QueryArgs),
    /// Check that the stored settings are usable
    Health,
    /// Edit the stored data source settings
    Configure(ConfigureArgs),
    /// Print how this data source supports dashboard variables
    VariableSupport,
}

/// Dashboard context shared by the commands that resolve templates.
#[derive(Args, Clone)]
pub struct DashboardArgs {
    /// Dashboard variable, `name=value`; repeat a name for a multi-value
    #[arg(long = "global", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub globals: Vec<(String, String)>,

    /// Range start (RFC 3339); defaults to six hours before --to
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// Range end (RFC 3339); defaults to now
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,
}

impl DashboardArgs {
    /// Returns the dashboard time range.
    pub fn range(&self) -> TimeRange {
        let to = self.to.unwrap_or_else(Utc::now);
        let from = self.from.unwrap_or(to - TimeDelta::hours(6));
        TimeRange::new(from, to)
    }

    /// Returns the dashboard variables.
    pub fn globals(&self) -> anyhow::Result<ScopedVars> {
        build_scope(&self.globals)
    }
}

/// Where the backend is reached.
#[derive(Args, Clone)]
pub struct BackendArgs {
    /// Base URL of the host
    #[arg(long, env = "ORADS_GRAFANA_URL", default_value = "http://localhost:3000/")]
    pub grafana_url: Url,

    /// Service account token
    #[arg(long, env = "ORADS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl BackendArgs {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Args)]
pub struct QueryArgs {
    /// SQL text; each one becomes a target (A, B, C, ...)
    #[arg(required = true)]
    pub sql: Vec<String>,

    /// Request variable, `name=value`; repeat a name for a multi-value
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub vars: Vec<(String, String)>,

    #[command(flatten)]
    pub dashboard: DashboardArgs,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Args)]
pub struct PreviewArgs {
    /// SQL text as typed in the editor
    pub sql: String,

    #[command(flatten)]
    pub dashboard: DashboardArgs,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Instance uid, used when no settings exist yet
    #[arg(long, default_value = "oracle")]
    pub uid: String,

    /// Instance name, used when no settings exist yet
    #[arg(long, default_value = "Oracle")]
    pub name: String,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub hostname: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub service: Option<String>,

    #[arg(long)]
    pub max_open_conns: Option<u32>,

    #[arg(long)]
    pub max_idle_conns: Option<u32>,

    /// Idle timeout, e.g. `5m`
    #[arg(long)]
    pub max_idle_time: Option<String>,

    /// Connection lifetime, e.g. `1h`
    #[arg(long)]
    pub max_life_time: Option<String>,

    /// Time zone; an empty value clears it
    #[arg(long)]
    pub timezone: Option<String>,

    /// New password
    #[arg(long, conflicts_with = "reset_password")]
    pub password: Option<String>,

    /// Discard the stored password
    #[arg(long)]
    pub reset_password: bool,
}

impl ConfigureArgs {
    /// Turns the flags into form edits, in form order.
    pub fn edits(&self) -> Vec<ConfigEdit> {
        let mut edits = Vec::new();
        if let Some(user) = &self.user {
            edits.push(ConfigEdit::User(user.clone()));
        }
        if let Some(hostname) = &self.hostname {
            edits.push(ConfigEdit::Hostname(hostname.clone()));
        }
        if let Some(port) = self.port {
            edits.push(ConfigEdit::Port(port));
        }
        if let Some(service) = &self.service {
            edits.push(ConfigEdit::Service(service.clone()));
        }
        if let Some(count) = self.max_open_conns {
            edits.push(ConfigEdit::MaxOpenConns(count));
        }
        if let Some(count) = self.max_idle_conns {
            edits.push(ConfigEdit::MaxIdleConns(count));
        }
        if let Some(text) = &self.max_idle_time {
            edits.push(ConfigEdit::MaxIdleTime(text.clone()));
        }
        if let Some(text) = &self.max_life_time {
            edits.push(ConfigEdit::MaxLifeTime(text.clone()));
        }
        if let Some(timezone) = &self.timezone {
            let timezone = (!timezone.is_empty()).then(|| timezone.clone());
            edits.push(ConfigEdit::TimeZone(timezone));
        }
        if let Some(password) = &self.password {
            edits.push(ConfigEdit::Password(password.clone()));
        }
        if self.reset_password {
            edits.push(ConfigEdit::ResetPassword);
        }
        edits
    }
}

/// Parses `name=value`. The value may itself contain `=`.
pub fn parse_assignment(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{input}`"))?;
    if name.is_empty() {
        return Err(format!("missing variable name in `{input}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Groups assignments into a scope; a name given more than once becomes a
/// multi-value in the order given.
pub fn build_scope(assignments: &[(String, String)]) -> anyhow::Result<ScopedVars> {
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for (name, value) in assignments {
        match grouped.iter_mut().find(|(n, _)| *n == name.as_str()) {
            Some((_, values)) => values.push(value.as_str()),
            None => grouped.push((name.as_str(), vec![value.as_str()])),
        }
    }

    let mut scope = ScopedVars::new();
    for (name, values) in grouped {
        let var = match values.as_slice() {
            [single] => ScopedVar::single(*single),
            many => ScopedVar::multi(many.iter().copied()),
        };
        scope
            .try_insert(name, var)
            .with_context(|| format!("invalid variable `{name}`"))?;
    }
    Ok(scope)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use orads_domain::VariableValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_build_scope_groups_repeated_names() {
        let pairs = vec![
            ("host".to_string(), "db1".to_string()),
            ("env".to_string(), "prod".to_string()),
            ("host".to_string(), "db2".to_string()),
        ];

        let scope = build_scope(&pairs).unwrap();

        assert_eq!(
            scope.get("host").unwrap().value,
            VariableValue::Multi(vec!["db1".into(), "db2".into()])
        );
        assert_eq!(
            scope.get("env").unwrap().value,
            VariableValue::Single("prod".into())
        );
    }

    #[test]
    fn test_build_scope_rejects_bad_names() {
        let pairs = vec![("bad-name".to_string(), "1".to_string())];
        assert!(build_scope(&pairs).is_err());
    }

    #[test]
    fn test_configure_edits_in_order() {
        let cli = Cli::try_parse_from([
            "orads",
            "configure",
            "--hostname",
            "db.local",
            "--port",
            "1521",
            "--timezone",
            "",
            "--reset-password",
        ])
        .unwrap();
        let Commands::Configure(args) = cli.command else {
            panic!("expected configure");
        };

        assert_eq!(
            args.edits(),
            vec![
                ConfigEdit::Hostname("db.local".into()),
                ConfigEdit::Port(1521),
                ConfigEdit::TimeZone(None),
                ConfigEdit::ResetPassword,
            ]
        );
    }

    #[test]
    fn test_query_args() {
        let cli = Cli::try_parse_from([
            "orads",
            "query",
            "SELECT $x FROM dual",
            "SELECT 2 FROM dual",
            "--var",
            "x=1",
            "--from",
            "2024-01-01T00:00:00Z",
            "--to",
            "2024-01-01T01:00:00Z",
        ])
        .unwrap();
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };

        assert_eq!(args.sql.len(), 2);
        assert_eq!(args.vars, vec![("x".to_string(), "1".to_string())]);
        assert_eq!(args.dashboard.range().to_ms() - args.dashboard.range().from_ms(), 3_600_000);
        assert_eq!(args.backend.timeout(), Duration::from_secs(30));
    }
}
