//! Full script snapshots: slot order, delimiters and script wrappers.

use crate::helpers::{DiffTestHelper, database, pg_table, schema, table_builder};
use anyhow::Result;
use ddlsync::catalog::column::{Column, ColumnBody};
use ddlsync::catalog::id::DbObjectId;
use ddlsync::catalog::table::TableBody;
use ddlsync::catalog::view::{View, ViewBody};
use ddlsync::{Dialect, Settings};
use insta::assert_snapshot;

#[test]
fn test_create_table_in_transaction() -> Result<()> {
    let helper = DiffTestHelper::with_settings(Settings {
        script_in_transaction: true,
        disable_check_function_bodies: true,
        ..Settings::default()
    });
    let users = table_builder(
        "users",
        TableBody::pg(),
        vec![
            Column::builder("id", ColumnBody::pg("integer").not_null()).build(),
            Column::builder("email", ColumnBody::pg("text")).build(),
        ],
    )
    .comment("Registered users")
    .build();
    let old = database(Dialect::Pg, vec![schema("public", Ok)]);
    let new = database(Dialect::Pg, vec![schema("public", |s| s.table(users))]);

    let sql = helper.script_sql(&old, &new)?;
    assert_snapshot!(sql, @r"
    BEGIN;

    SET check_function_bodies = false;

    CREATE TABLE public.users (
        id integer NOT NULL,
        email text
    );

    COMMENT ON TABLE public.users IS 'Registered users';

    COMMIT;
    ");
    Ok(())
}

#[test]
fn test_create_ms_view_batches() -> Result<()> {
    let helper = DiffTestHelper::new();
    let view = View::builder(
        "active_users",
        ViewBody::ms("SELECT id FROM dbo.users WHERE active = 1"),
    )
    .build();
    let old = database(Dialect::Ms, vec![schema("dbo", Ok)]);
    let new = database(Dialect::Ms, vec![schema("dbo", |s| s.view(view))]);

    let sql = helper.script_sql(&old, &new)?;
    assert_snapshot!(sql, @r"
    SET QUOTED_IDENTIFIER ON
    GO

    SET ANSI_NULLS ON
    GO

    CREATE VIEW [dbo].[active_users]
    AS
    SELECT id FROM dbo.users WHERE active = 1
    GO
    ");
    Ok(())
}

#[test]
fn test_rebuilt_view_comment_at_end() -> Result<()> {
    let helper = DiffTestHelper::with_settings(Settings {
        comments_to_end: true,
        ..Settings::default()
    });
    let make = |column_type: &str| {
        let table = pg_table("t", &[("c", column_type)]);
        let view = View::builder("v", ViewBody::pg("SELECT c FROM public.t"))
            .comment("Current values")
            .depends_on(DbObjectId::column("public", "t", "c"))
            .build();
        database(Dialect::Pg, vec![schema("public", |s| s.table(table)?.view(view))])
    };

    let sql = helper.script_sql(&make("integer"), &make("bigint"))?;
    assert_snapshot!(sql, @r"
    DROP VIEW public.v;

    ALTER TABLE public.t ALTER COLUMN c TYPE bigint USING c::bigint;

    CREATE VIEW public.v AS
    SELECT c FROM public.t;

    COMMENT ON VIEW public.v IS 'Current values';
    ");
    Ok(())
}
