// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! `cargo xtask <command>` wraps the tooling used in development and CI:
//! building, linting, tests, coverage, and a check that the embedded
//! `SQLite` migrations produce the expected schema and revert cleanly.
//!
//! Standard `cargo test` needs no infrastructure; every database test runs
//! against an isolated in-memory `SQLite` database.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Check the migrations' schema and that they revert cleanly
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint clippy, docs, and formatting
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Run lib and doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the embedded migrations against an in-memory `SQLite` database.
///
/// 1. Applies every migration
/// 2. Introspects the schema (columns, keys, unique constraints, indexes)
/// 3. Compares it with the schema the persistence crate's queries rely on
/// 4. Reverts every migration and checks that no table is left behind
///
/// Nothing outside the process is touched.
fn verify_migrations() -> Result<()> {
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to open in-memory SQLite database")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {e}"))?;
    tracing::info!("Applied migrations");

    let schema = introspect_sqlite_schema(&mut conn)?;
    compare_schemas(&expected_schema(), &schema)?;
    tracing::info!("✅ Schema matches ({} tables)", schema.tables.len());

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert migrations: {e}"))?;
    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "❌ Migration revert FAILED: tables left behind: {:?}",
            reverted.tables.keys().collect::<Vec<_>>()
        ));
    }
    tracing::info!("✅ Migrations revert cleanly");

    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn columns(definitions: &[(&str, &str, bool)]) -> BTreeMap<String, Column> {
    definitions.iter()
        .map(|(name, normalized_type, nullable)| {
            (
                (*name).to_string(),
                Column {
                    name: (*name).to_string(),
                    normalized_type: (*normalized_type).to_string(),
                    nullable: *nullable,
                },
            )
        })
        .collect()
}

/// The schema the persistence crate is written against.
fn expected_schema() -> Schema {
    let persons = Table {
        columns: columns(&[
            ("identifier", "text", false),
            ("status", "text", false),
            ("name", "text", false),
            ("given_names", "text", false),
            ("sex", "text", false),
            ("birth_date", "text", false),
            ("contact", "text", false),
            ("email", "text", true),
            ("residence", "text", false),
            ("first_attendance_date", "text", true),
        ]),
        primary_keys: BTreeSet::from([String::from("identifier")]),
        foreign_keys: BTreeSet::new(),
        unique_constraints: BTreeSet::from([
            UniqueConstraint {
                columns: strings(&["contact"]),
            },
            UniqueConstraint {
                columns: strings(&["email"]),
            },
        ]),
        indexes: BTreeSet::from([Index {
            name: String::from("idx_persons_name"),
            columns: strings(&["name", "given_names"]),
        }]),
    };

    // INTEGER PRIMARY KEY columns report notnull = 0.
    let attendance_records = Table {
        columns: columns(&[
            ("record_id", "integer", true),
            ("person_identifier", "text", false),
            ("attendance_date", "text", false),
            ("is_new", "integer", false),
            ("is_present", "integer", false),
            ("wants_to_stay", "integer", false),
        ]),
        primary_keys: BTreeSet::from([String::from("record_id")]),
        foreign_keys: BTreeSet::from([ForeignKey {
            from_column: String::from("person_identifier"),
            to_table: String::from("persons"),
            to_column: String::from("identifier"),
        }]),
        unique_constraints: BTreeSet::from([UniqueConstraint {
            columns: strings(&["person_identifier", "attendance_date"]),
        }]),
        indexes: BTreeSet::from([Index {
            name: String::from("idx_attendance_records_date"),
            columns: strings(&["attendance_date"]),
        }]),
    };

    Schema {
        tables: BTreeMap::from([
            (String::from("attendance_records"), attendance_records),
            (String::from("persons"), persons),
        ]),
    }
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let table_columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in table_columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type: col.r#type.to_lowercase(),
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // origin 'u' is a UNIQUE constraint, 'pk' the primary key's autoindex
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Compare the expected schema with the introspected one, table by table.
fn compare_schemas(expected: &Schema, actual: &Schema) -> Result<()> {
    let expected_tables: BTreeSet<_> = expected.tables.keys().collect();
    let actual_tables: BTreeSet<_> = actual.tables.keys().collect();

    if expected_tables != actual_tables {
        return Err(color_eyre::eyre::eyre!(
            "❌ Schema check FAILED: Table mismatch\n  Expected: {:?}\n  Found: {:?}",
            expected_tables,
            actual_tables
        ));
    }

    for (table_name, expected_table) in &expected.tables {
        let Some(actual_table) = actual.tables.get(table_name) else {
            continue;
        };

        if expected_table.columns != actual_table.columns {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema check FAILED: Column mismatch in table '{}'\n  Expected: {:?}\n  Found: {:?}",
                table_name,
                expected_table.columns.values().collect::<Vec<_>>(),
                actual_table.columns.values().collect::<Vec<_>>()
            ));
        }

        if expected_table.primary_keys != actual_table.primary_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema check FAILED: Primary key mismatch in table '{}'\n  Expected: {:?}\n  Found: {:?}",
                table_name,
                expected_table.primary_keys,
                actual_table.primary_keys
            ));
        }

        if expected_table.foreign_keys != actual_table.foreign_keys {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema check FAILED: Foreign key mismatch in table '{}'\n  Expected: {:?}\n  Found: {:?}",
                table_name,
                expected_table.foreign_keys,
                actual_table.foreign_keys
            ));
        }

        if expected_table.unique_constraints != actual_table.unique_constraints {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema check FAILED: Unique constraint mismatch in table '{}'\n  Expected: {:?}\n  Found: {:?}",
                table_name,
                expected_table.unique_constraints,
                actual_table.unique_constraints
            ));
        }

        if expected_table.indexes != actual_table.indexes {
            return Err(color_eyre::eyre::eyre!(
                "❌ Schema check FAILED: Index mismatch in table '{}'\n  Expected: {:?}\n  Found: {:?}",
                table_name,
                expected_table.indexes,
                actual_table.indexes
            ));
        }
    }

    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
