//! `frbr` — manage an FRBR catalogue database.
//!
//! # Usage
//!
//! ```
//! frbr load
//! frbr --database ~/catalog.sqlite3 check
//! frbr show-work 1
//! ```
//!
//! The database path comes from `frbr.toml` (or `--config`), then
//! `FRBR_DATABASE_PATH`, then `--database`, each overriding the last.

mod render;

use std::{
  io::Write,
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use frbr_core::{schema::CATALOG, store::CatalogStore};
use frbr_store_sqlite::{SqliteStore, schema::ddl};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "frbr", author, version, about = "FRBR catalogue schema tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "frbr.toml")]
  config: PathBuf,

  /// Database file; overrides the configured `database_path`.
  #[arg(short, long, value_name = "FILE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load the catalogue schema unless the database is already current.
  Load,
  /// Show the defined and stored schema versions.
  Status,
  /// Print the DDL a load would run.
  Dump,
  /// Print the tables physically present in the database.
  Describe,
  /// Report reference columns that do not resolve.
  Check,
  /// Print a work with its expressions, manifestations and items as JSON.
  ShowWork { id: i64 },
}

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CliConfig {
  #[serde(default = "default_database_path")]
  database_path: PathBuf,
}

fn default_database_path() -> PathBuf { PathBuf::from("catalog.sqlite3") }

fn load_config(cli: &Cli) -> anyhow::Result<CliConfig> {
  let database = cli
    .database
    .as_ref()
    .map(|p| p.to_string_lossy().into_owned());

  config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("FRBR"))
    .set_override_option("database_path", database)
    .context("invalid --database")?
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise CliConfig")
}

/// Open the configured database without touching its schema.
async fn open(cli: &Cli) -> anyhow::Result<SqliteStore> {
  let cfg = load_config(cli)?;
  let path = expand_tilde(&cfg.database_path);
  tracing::debug!(?path, "using database");

  SqliteStore::connect(&path)
    .await
    .with_context(|| format!("failed to open database at {path:?}"))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  run(&cli, &mut std::io::stdout()).await
}

/// Execute one command, writing its report to `out`.
async fn run(cli: &Cli, out: &mut impl Write) -> anyhow::Result<ExitCode> {
  match cli.command {
    Command::Dump => write!(out, "{}", ddl(&CATALOG))?,
    Command::Load => {
      let outcome = open(cli)
        .await?
        .load_schema(&CATALOG)
        .await
        .context("failed to load schema")?;
      writeln!(out, "{}", render::outcome(&outcome))?;
    }
    Command::Status => {
      let stored = open(cli)
        .await?
        .schema_version()
        .await
        .context("failed to read schema version")?;
      write!(out, "{}", render::status(CATALOG.version, stored))?;
    }
    Command::Describe => {
      let tables = open(cli)
        .await?
        .describe()
        .await
        .context("failed to describe database")?;
      write!(out, "{}", render::tables(&tables))?;
    }
    Command::Check => {
      let dangling = open(cli)
        .await?
        .dangling_references()
        .await
        .context("integrity check failed")?;
      for d in &dangling {
        writeln!(out, "{d}")?;
      }
      if !dangling.is_empty() {
        eprintln!("{} dangling reference(s)", dangling.len());
        return Ok(ExitCode::FAILURE);
      }
      writeln!(out, "ok")?;
    }
    Command::ShowWork { id } => {
      let Some(view) = open(cli)
        .await?
        .materialize_work(id)
        .await
        .with_context(|| format!("failed to read work {id}"))?
      else {
        anyhow::bail!("no work with id {id}");
      };
      writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
    }
  }

  Ok(ExitCode::SUCCESS)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use frbr_core::{entity::Work, kind::AgentRef, link::Creation};

  use super::*;

  fn cli_for(db: &Path, args: &[&str]) -> Cli {
    let db = db.to_string_lossy().into_owned();
    let mut argv = vec!["frbr", "--config", "/nonexistent.toml", "-d", db.as_str()];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
  }

  async fn run_to_string(cli: &Cli) -> anyhow::Result<(ExitCode, String)> {
    let mut out = Vec::new();
    let code = run(cli, &mut out).await?;
    Ok((code, String::from_utf8(out)?))
  }

  #[test]
  fn database_flag_overrides_default() {
    let cli = Cli::parse_from(["frbr", "--config", "/nonexistent.toml", "-d", "x.db", "status"]);
    assert_eq!(load_config(&cli).unwrap().database_path, PathBuf::from("x.db"));
  }

  #[test]
  fn missing_config_file_falls_back_to_default() {
    let cli = Cli::parse_from(["frbr", "--config", "/nonexistent.toml", "check"]);
    assert_eq!(
      load_config(&cli).unwrap().database_path,
      PathBuf::from("catalog.sqlite3")
    );
  }

  #[test]
  fn show_work_takes_an_id() {
    let cli = Cli::parse_from(["frbr", "show-work", "12"]);
    assert!(matches!(cli.command, Command::ShowWork { id: 12 }));
  }

  #[test]
  fn non_home_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("/tmp/c.db")), PathBuf::from("/tmp/c.db"));
    assert_eq!(expand_tilde(Path::new("c.db")), PathBuf::from("c.db"));
  }

  #[tokio::test]
  async fn check_fails_on_dangling_references() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");

    let (code, out) = run_to_string(&cli_for(&db, &["load"])).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(out.starts_with("created schema 20080829161616"), "{out}");

    let (code, out) = run_to_string(&cli_for(&db, &["check"])).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(out, "ok\n");

    let store = SqliteStore::connect(&db).await.unwrap();
    let w = store.insert(Work::default()).await.unwrap();
    store
      .insert(Creation { creator: AgentRef::Person(9), work_id: w.id, relation: None })
      .await
      .unwrap();

    let (code, out) = run_to_string(&cli_for(&db, &["check"])).await.unwrap();
    assert_eq!(code, ExitCode::FAILURE);
    assert_eq!(out, "creations#1.creator_id: no people row with id 9\n");
  }

  #[tokio::test]
  async fn show_work_prints_json_or_fails_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.sqlite3");
    let store = SqliteStore::open(&db).await.unwrap();
    let w = store
      .insert(Work { title: Some("Ulysses".into()), ..Default::default() })
      .await
      .unwrap();

    let id = w.id.to_string();
    let (code, out) = run_to_string(&cli_for(&db, &["show-work", &id])).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["work"]["title"], "Ulysses");

    let err = run_to_string(&cli_for(&db, &["show-work", "42"])).await.unwrap_err();
    assert_eq!(err.to_string(), "no work with id 42");
  }

  #[tokio::test]
  async fn dump_needs_no_database() {
    let cli = Cli::parse_from(["frbr", "-d", "/nonexistent/dir/x.db", "dump"]);
    let (code, out) = run_to_string(&cli).await.unwrap();
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(out.contains("CREATE TABLE \"works\""));
  }
}
