//! Whole-database diffs: decisions, cascades, ordering and slot assembly.

use crate::helpers::{DiffTestHelper, database, ms_column, ms_table, pg_column, pg_table, schema, statements, table_builder};
use anyhow::Result;
use ddlsync::catalog::column::{Column, ColumnBody};
use ddlsync::catalog::constraint::{Constraint, ConstraintBody};
use ddlsync::catalog::id::{DbObjectId, QualifiedName, StatementType};
use ddlsync::catalog::index::{Index, IndexBody};
use ddlsync::catalog::sequence::{Sequence, SequenceBody, SequenceOwner};
use ddlsync::catalog::table::TableBody;
use ddlsync::catalog::view::{View, ViewBody};
use ddlsync::config::{SettingsBuilder, SettingsInput};
use ddlsync::diff::operations::OperationKind;
use ddlsync::{Dialect, Slot};

#[test]
fn test_column_type_change_recreates_dependent_view() -> Result<()> {
    let helper = DiffTestHelper::new();
    let make = |column_type: &str| {
        let table = pg_table("t", &[("c", column_type)]);
        let view = View::builder("v", ViewBody::pg("SELECT c FROM public.t"))
            .depends_on(DbObjectId::column("public", "t", "c"))
            .build();
        database(Dialect::Pg, vec![schema("public", |s| s.table(table)?.view(view))])
    };

    helper.run_diff_test(&make("integer"), &make("bigint"), |steps, script| {
        let kinds: Vec<OperationKind> = steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![OperationKind::Drop, OperationKind::Alter, OperationKind::Create]
        );
        for step in steps {
            match step.kind {
                OperationKind::Drop | OperationKind::Create => {
                    assert_eq!(step.id, DbObjectId::view("public", "v"))
                }
                OperationKind::Alter => {
                    assert_eq!(step.id, DbObjectId::column("public", "t", "c"))
                }
            }
        }
        assert_eq!(
            statements(script),
            vec![
                "DROP VIEW public.v",
                "ALTER TABLE public.t ALTER COLUMN c TYPE bigint USING c::bigint",
                "CREATE VIEW public.v AS\nSELECT c FROM public.t",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_index_key_change_drops_then_creates() -> Result<()> {
    let helper = DiffTestHelper::new();
    let make = |columns: &[&str]| {
        let table = table_builder(
            "t",
            TableBody::ms(),
            vec![ms_column("a", "[int]"), ms_column("b", "[int]"), ms_column("c", "[int]")],
        )
        .index(Index::builder("ix_t_key", IndexBody::on(columns.iter().copied()).unique()).build())
        .unwrap()
        .build();
        database(Dialect::Ms, vec![schema("dbo", |s| s.table(table))])
    };

    helper.run_diff_test(&make(&["a", "b"]), &make(&["a", "b", "c"]), |steps, script| {
        assert_eq!(steps.len(), 2);
        assert!(steps[0].is_drop());
        assert!(steps[1].is_create());
        assert_eq!(
            statements(script),
            vec![
                "DROP INDEX [ix_t_key] ON [dbo].[t]",
                "CREATE UNIQUE NONCLUSTERED INDEX [ix_t_key] ON [dbo].[t] ([a], [b], [c])",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_primary_key_change_suspends_change_tracking() -> Result<()> {
    let helper = DiffTestHelper::new();
    let make = |pk: &[&str]| {
        let table = table_builder(
            "t",
            TableBody::ms(),
            vec![ms_column("id", "[int]"), ms_column("code", "[int]")],
        )
        .with_body(|b| {
            if let Some(ms) = b.ms_attrs_mut() {
                ms.tracked = Some(true);
            }
        })
        .constraint(Constraint::define("pk_t", ConstraintBody::primary_key(pk.iter().copied())).build())
        .unwrap()
        .build();
        database(Dialect::Ms, vec![schema("dbo", |s| s.table(table))])
    };

    helper.run_diff_test(&make(&["id"]), &make(&["id", "code"]), |_, script| {
        assert_eq!(
            script.in_slot(Slot::Begin).collect::<Vec<_>>(),
            vec!["ALTER TABLE [dbo].[t] DISABLE CHANGE_TRACKING"]
        );
        assert_eq!(
            statements(script),
            vec![
                "ALTER TABLE [dbo].[t] DISABLE CHANGE_TRACKING",
                "ALTER TABLE [dbo].[t] DROP CONSTRAINT [pk_t]",
                "ALTER TABLE [dbo].[t] ADD CONSTRAINT [pk_t] PRIMARY KEY ([id], [code])",
                "ALTER TABLE [dbo].[t] ENABLE CHANGE_TRACKING WITH (TRACK_COLUMNS_UPDATED = ON)",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_foreign_keys_run_after_every_table() -> Result<()> {
    let helper = DiffTestHelper::new();
    let old = database(Dialect::Pg, vec![schema("public", Ok)]);
    let orders = table_builder("orders", TableBody::pg(), vec![pg_column("user_id", "integer")])
        .constraint(
            Constraint::define(
                "orders_user_fk",
                ConstraintBody::foreign_key(["user_id"], QualifiedName::new("public", "users"), ["id"]),
            )
            .build(),
        )
        .unwrap()
        .build();
    let users = pg_table("users", &[("id", "integer")]);
    let new = database(
        Dialect::Pg,
        vec![schema("public", |s| s.table(orders)?.table(users))],
    );

    helper.run_diff_test(&old, &new, |steps, script| {
        assert_eq!(steps.len(), 3);
        for step in &steps[..2] {
            match (step.kind, step.id.kind) {
                (OperationKind::Create, StatementType::Table) => {}
                (kind, object) => panic!("Expected table creates first, got {kind} of {object}"),
            }
        }
        assert_eq!(
            statements(script).last().map(String::as_str),
            Some(
                "ALTER TABLE public.orders ADD CONSTRAINT orders_user_fk FOREIGN KEY (user_id) REFERENCES public.users (id)"
            )
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_owned_sequence_goes_with_its_table() -> Result<()> {
    let helper = DiffTestHelper::new();
    let table = pg_table("t", &[("id", "integer")]);
    let old = database(
        Dialect::Pg,
        vec![schema("public", |s| s.table(table)?.sequence(owned_sequence()))],
    );
    let new = database(Dialect::Pg, vec![schema("public", Ok)]);

    helper.run_diff_test(&old, &new, |steps, script| {
        assert_eq!(steps.len(), 1);
        assert_eq!(statements(script), vec!["DROP TABLE public.t"]);
        Ok(())
    })?;
    Ok(())
}

fn owned_sequence() -> Sequence {
    Sequence::builder("t_id_seq", SequenceBody::new(1))
        .with_body(|b| {
            b.owned_by = Some(SequenceOwner {
                table: QualifiedName::new("public", "t"),
                column: "id".into(),
            })
        })
        .build()
}

#[test]
fn test_owned_sequence_survives_table_rebuild() -> Result<()> {
    let helper = DiffTestHelper::new();
    let id = || {
        Column::builder(
            "id",
            ColumnBody::pg("integer").default_value("nextval('public.t_id_seq'::regclass)"),
        )
        .build()
    };
    let make = |columns: Vec<Column>| {
        let table = table_builder("t", TableBody::pg(), columns).build();
        database(
            Dialect::Pg,
            vec![schema("public", |s| s.table(table)?.sequence(owned_sequence()))],
        )
    };
    let old = make(vec![id(), pg_column("name", "text")]);
    let new = make(vec![pg_column("name", "text"), id()]);

    helper.run_diff_test(&old, &new, |steps, script| {
        let sequence = DbObjectId::in_schema(StatementType::Sequence, "public", "t_id_seq");
        assert!(steps.iter().any(|s| s.id == sequence && s.is_create()));
        assert!(!steps.iter().any(|s| s.id == sequence && s.is_drop()));
        assert_eq!(
            statements(script),
            vec![
                "DROP TABLE public.t",
                "CREATE SEQUENCE public.t_id_seq INCREMENT BY 1 NO MINVALUE NO MAXVALUE NO CYCLE",
                "CREATE TABLE public.t (\n    name text,\n    id integer DEFAULT nextval('public.t_id_seq'::regclass)\n)",
                "ALTER SEQUENCE public.t_id_seq OWNED BY public.t.id",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_owned_sequence_created_before_its_table() -> Result<()> {
    let helper = DiffTestHelper::new();
    let old = database(Dialect::Pg, vec![schema("public", Ok)]);
    let table = pg_table("t", &[("id", "integer")]);
    let new = database(
        Dialect::Pg,
        vec![schema("public", |s| s.table(table)?.sequence(owned_sequence()))],
    );

    helper.run_diff_test(&old, &new, |_, script| {
        assert_eq!(
            statements(script),
            vec![
                "CREATE SEQUENCE public.t_id_seq INCREMENT BY 1 NO MINVALUE NO MAXVALUE NO CYCLE",
                "CREATE TABLE public.t (\n    id integer\n)",
                "ALTER SEQUENCE public.t_id_seq OWNED BY public.t.id",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_ms_dropped_column_releases_unnamed_default() -> Result<()> {
    let helper = DiffTestHelper::new();
    let flag = Column::builder("flag", ColumnBody::ms("[bit]").default_value("((0))")).build();
    let old = database(
        Dialect::Ms,
        vec![schema("dbo", |s| {
            s.table(table_builder("t", TableBody::ms(), vec![ms_column("id", "[int]"), flag]).build())
        })],
    );
    let new = database(
        Dialect::Ms,
        vec![schema("dbo", |s| s.table(ms_table("t", &[("id", "[int]")])))],
    );

    helper.run_diff_test(&old, &new, |steps, script| {
        assert_eq!(steps.len(), 1);
        assert_eq!(
            statements(script),
            vec![
                "DECLARE @default_name sysname\n\
                 SELECT @default_name = dc.name FROM sys.default_constraints dc\n\
                 JOIN sys.columns c ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id\n\
                 WHERE dc.parent_object_id = OBJECT_ID(N'[dbo].[t]') AND c.name = N'flag'\n\
                 IF @default_name IS NOT NULL\n    EXEC(N'ALTER TABLE [dbo].[t] DROP CONSTRAINT ' + QUOTENAME(@default_name))",
                "ALTER TABLE [dbo].[t] DROP COLUMN [flag]",
            ]
        );
        Ok(())
    })?;
    Ok(())
}

#[test]
fn test_dependency_cycle_is_an_error() {
    let helper = DiffTestHelper::new();
    let view = |name: &str, other: &str| {
        View::builder(name, ViewBody::pg(format!("SELECT * FROM public.{other}")))
            .depends_on(DbObjectId::view("public", other))
            .build()
    };
    let old = database(Dialect::Pg, vec![schema("public", Ok)]);
    let new = database(
        Dialect::Pg,
        vec![schema("public", |s| s.view(view("a", "b"))?.view(view("b", "a")))],
    );

    let err = helper
        .run_diff_test(&old, &new, |_, _| Ok(()))
        .unwrap_err();
    assert!(err.to_string().contains("Dependency cycle detected"));
}

#[test]
fn test_settings_from_yaml_shape_the_script() -> Result<()> {
    let input = SettingsInput::from_yaml("drop_if_exists: true\nscript_in_transaction: true\n")?;
    let settings = SettingsBuilder::new().with_input(input).resolve();
    let helper = DiffTestHelper::with_settings(settings);

    let old = database(
        Dialect::Ms,
        vec![schema("dbo", |s| s.table(ms_table("t", &[("id", "[int]")])))],
    );
    let new = database(Dialect::Ms, vec![schema("dbo", Ok)]);

    assert_eq!(
        helper.script_sql(&old, &new)?,
        "BEGIN TRANSACTION\nGO\n\nDROP TABLE IF EXISTS [dbo].[t]\nGO\n\nCOMMIT TRANSACTION\nGO"
    );
    Ok(())
}
