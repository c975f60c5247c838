//! `sqlscout` - static SQL advisor with SQLite plan comparison

mod output;
mod rpc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use sqlscout_analyzer::{AnalyzerConfig, QueryAdvisor, RuleId, SqlDialect};
use sqlscout_core::{PlanEngine, ScoutError};
use sqlscout_driver_sqlite::SqliteEngine;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sqlscout", version, about = "Static SQL advisor with SQLite plan comparison")]
struct Cli {
    /// Path to the SQLite database file (`:memory:` for a throwaway database)
    #[arg(long, global = true, env = "SQLSCOUT_DB", default_value = "sqlscout.db")]
    db: String,

    /// SQL dialect used to parse queries
    #[arg(long, global = true, env = "SQLSCOUT_DIALECT", default_value = "sqlite")]
    dialect: SqlDialect,

    /// Skip a rule (repeatable)
    #[arg(long = "disable-rule", global = true, value_name = "RULE")]
    disable_rules: Vec<RuleId>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a SQL schema script into the database
    Load {
        /// Path to the schema file
        schema_path: PathBuf,
    },

    /// Show SQLite's EXPLAIN QUERY PLAN for a query
    Explain { query: String },

    /// Apply the static rules to a query
    Diagnose { query: String },

    /// Diagnose a query and optionally compare its plan before and after an index
    Optimize {
        query: String,

        /// DDL to apply between the two plans, e.g. `CREATE INDEX ...`
        #[arg(long)]
        create_index: Option<String>,
    },

    /// Serve line-delimited JSON-RPC on stdin/stdout
    Serve,
}

impl Cli {
    fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig::new()
            .with_dialect(self.dialect)
            .with_disabled_rules(self.disable_rules.iter().copied())
    }

    fn open_engine(&self) -> anyhow::Result<SqliteEngine> {
        SqliteEngine::open(&self.db).with_context(|| format!("opening database '{}'", self.db))
    }
}

fn init_logging() {
    // Logs go to stderr; stdout carries results and JSON-RPC responses
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let advisor = QueryAdvisor::with_config(cli.analyzer_config());
    let format = cli.format;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Load { schema_path } => {
            let schema = std::fs::read_to_string(schema_path).map_err(|e| {
                ScoutError::Configuration(format!(
                    "cannot read schema file '{}': {}",
                    schema_path.display(),
                    e
                ))
            })?;
            let engine = cli.open_engine()?;
            engine
                .load_schema(&schema)
                .with_context(|| format!("loading schema from '{}'", schema_path.display()))?;
            match format {
                OutputFormat::Table => {
                    writeln!(out, "Schema loaded into SQLite -> {}", engine.path())?
                }
                OutputFormat::Json => writeln!(out, "{}", serde_json::json!({"ok": true}))?,
            }
        }
        Command::Explain { query } => {
            let engine = cli.open_engine()?;
            let plan = engine.explain_plan(query)?;
            match format {
                OutputFormat::Table => {
                    writeln!(out, "{}", output::plan_table(&plan))?;
                    writeln!(out)?;
                    writeln!(out, "{}", output::plan_tree(&plan))?;
                }
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&plan)?)?,
            }
        }
        Command::Diagnose { query } => {
            let findings = advisor.diagnose(query);
            match format {
                OutputFormat::Table => writeln!(out, "{}", output::findings_table(&findings))?,
                OutputFormat::Json => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&findings)?)?
                }
            }
        }
        Command::Optimize {
            query,
            create_index,
        } => {
            let report = match create_index {
                Some(ddl) => {
                    let engine = cli.open_engine()?;
                    advisor.optimize(&engine, query, Some(ddl.as_str()))?
                }
                None => advisor.analyze(query),
            };
            match format {
                OutputFormat::Table => write!(out, "{}", output::report(&report))?,
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
            }
        }
        Command::Serve => {
            let engine = cli.open_engine()?;
            drop(out);
            let stdin = std::io::stdin();
            rpc::serve(&advisor, &engine, stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["sqlscout", "diagnose", "SELECT 1"]).unwrap();
        assert_eq!(cli.dialect, SqlDialect::Sqlite);
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.disable_rules.is_empty());
        assert!(matches!(cli.command, Command::Diagnose { .. }));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sqlscout",
            "optimize",
            "SELECT * FROM users ORDER BY id",
            "--create-index",
            "CREATE INDEX idx_users_id ON users(id)",
            "--db",
            ":memory:",
            "--dialect",
            "postgres",
            "--disable-rule",
            "select_star",
            "--disable-rule",
            "order_by_cost",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.db, ":memory:");
        assert_eq!(cli.format, OutputFormat::Json);
        let config = cli.analyzer_config();
        assert_eq!(config.dialect, SqlDialect::Postgres);
        assert_eq!(
            config.disabled_rules,
            vec![RuleId::SelectStar, RuleId::OrderByCost]
        );
        let Command::Optimize { create_index, .. } = cli.command else {
            panic!("expected optimize");
        };
        assert_eq!(
            create_index.as_deref(),
            Some("CREATE INDEX idx_users_id ON users(id)")
        );
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let result = Cli::try_parse_from([
            "sqlscout",
            "diagnose",
            "SELECT 1",
            "--disable-rule",
            "select_all",
        ]);
        assert!(result.is_err());
    }
}
