//! Shared builders and the diff pipeline harness for integration tests.

use anyhow::Result;
use ddlsync::catalog::column::{Column, ColumnBody};
use ddlsync::catalog::id::DbObjectId;
use ddlsync::catalog::schema::{Schema, SchemaBody};
use ddlsync::catalog::statement::StatementBuilder;
use ddlsync::catalog::table::{Table, TableBody};
use ddlsync::catalog::{AnyStatement, Database};
use ddlsync::diff::operations::MigrationStep;
use ddlsync::diff::{ObjectState, alter_any, diff_steps};
use ddlsync::error::ModelResult;
use ddlsync::render::{SqlContext, SqlScript};
use ddlsync::{Dialect, Settings};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once; `RUST_LOG=ddlsync=debug` shows decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pg_column(name: &str, data_type: &str) -> Column {
    Column::builder(name, ColumnBody::pg(data_type)).build()
}

pub fn ms_column(name: &str, data_type: &str) -> Column {
    Column::builder(name, ColumnBody::ms(data_type)).build()
}

/// Table builder with the given columns already added.
pub fn table_builder(name: &str, body: TableBody, columns: Vec<Column>) -> StatementBuilder<TableBody> {
    columns
        .into_iter()
        .try_fold(Table::builder(name, body), |b, c| b.column(c))
        .unwrap()
}

pub fn pg_table(name: &str, columns: &[(&str, &str)]) -> Table {
    let columns = columns.iter().map(|(n, t)| pg_column(n, t)).collect();
    table_builder(name, TableBody::pg(), columns).build()
}

pub fn ms_table(name: &str, columns: &[(&str, &str)]) -> Table {
    let columns = columns.iter().map(|(n, t)| ms_column(n, t)).collect();
    table_builder(name, TableBody::ms(), columns).build()
}

/// Schema built by `fill`, e.g. `|s| s.table(users)?.view(active_users)`.
pub fn schema(
    name: &str,
    fill: impl FnOnce(StatementBuilder<SchemaBody>) -> ModelResult<StatementBuilder<SchemaBody>>,
) -> Schema {
    fill(Schema::builder(name, SchemaBody::default())).unwrap().build()
}

pub fn database(dialect: Dialect, schemas: Vec<Schema>) -> Database {
    schemas
        .into_iter()
        .try_fold(Database::builder(dialect), |b, s| b.schema(s))
        .unwrap()
        .build()
}

/// Run one in-place alter outside the pipeline.
pub fn alter(
    old: AnyStatement<'_>,
    new: AnyStatement<'_>,
    id: &DbObjectId,
    dialect: Dialect,
    settings: &Settings,
) -> (ObjectState, SqlScript) {
    let ctx = SqlContext::new(id, dialect, settings);
    let mut script = SqlScript::new();
    let state = alter_any(old, new, &ctx, &mut script);
    (state, script)
}

/// Helper for pipeline tests that eliminates boilerplate setup
pub struct DiffTestHelper {
    settings: Settings,
}

impl DiffTestHelper {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        init_tracing();
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Diff `old` against `new`, hand the ordered steps and the assembled
    /// script to `verification`, and return the steps.
    pub fn run_diff_test<F>(&self, old: &Database, new: &Database, verification: F) -> Result<Vec<MigrationStep>>
    where
        F: FnOnce(&[MigrationStep], &SqlScript) -> Result<()>,
    {
        let steps = diff_steps(old, new, &self.settings)?;
        let mut script = SqlScript::new();
        for step in &steps {
            script.append(step.script.clone());
        }
        verification(&steps, &script)?;
        Ok(steps)
    }

    /// Assembled script text, statements in slot order.
    pub fn script_sql(&self, old: &Database, new: &Database) -> Result<String> {
        let script = ddlsync::diff_databases(old, new, &self.settings)?;
        Ok(script.to_sql(new.dialect(), &self.settings))
    }
}

/// Statements of a script in execution order.
pub fn statements(script: &SqlScript) -> Vec<String> {
    script.ordered().map(str::to_string).collect()
}
