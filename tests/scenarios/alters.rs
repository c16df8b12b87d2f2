//! Single-object alter scenarios: what each change emits and which state
//! it reports.

use crate::helpers::{alter, init_tracing, ms_table, pg_table, statements, table_builder};
use ddlsync::catalog::AnyStatement;
use ddlsync::catalog::column::{Column, ColumnBody};
use ddlsync::catalog::constraint::{Constraint, ConstraintBody};
use ddlsync::catalog::id::{DbObjectId, StatementType};
use ddlsync::catalog::index::{Index, IndexBody, IndexColumn};
use ddlsync::catalog::sequence::{Sequence, SequenceBody};
use ddlsync::catalog::statistics::{Statistics, StatisticsBody};
use ddlsync::catalog::table::TableBody;
use ddlsync::{Dialect, ObjectState, Settings, Slot};
use rstest::rstest;

/// Changing a column type is expressed in place, and dependents must be
/// regenerated because they may rely on the old type.
#[rstest]
#[case::pg(
    Dialect::Pg,
    "integer",
    "bigint",
    "ALTER TABLE public.t ALTER COLUMN c TYPE bigint USING c::bigint"
)]
#[case::ms(
    Dialect::Ms,
    "[int]",
    "[bigint]",
    "ALTER TABLE [dbo].[t] ALTER COLUMN [c] [bigint] NULL"
)]
fn test_column_type_change_alters_with_dependencies(
    #[case] dialect: Dialect,
    #[case] old_type: &str,
    #[case] new_type: &str,
    #[case] expected: &str,
) {
    init_tracing();
    let body = |t: &str| match dialect {
        Dialect::Pg => ColumnBody::pg(t),
        Dialect::Ms => ColumnBody::ms(t),
    };
    let old = Column::builder("c", body(old_type)).build();
    let new = Column::builder("c", body(new_type)).build();
    let id = DbObjectId::column(dialect.default_schema(), "t", "c");

    let (state, script) = alter(
        AnyStatement::Column(&old),
        AnyStatement::Column(&new),
        &id,
        dialect,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::AlterWithDep);
    assert_eq!(statements(&script), vec![expected]);
}

/// Extending the key of a unique nonclustered index cannot be altered.
#[test]
fn test_index_key_change_recreates() {
    let old_body = IndexBody::on(["a", "b"]).unique();
    let mut new_body = old_body.clone();
    new_body.columns.push(IndexColumn::column("c"));
    let old = Index::builder("ix_t_ab", old_body).build();
    let new = Index::builder("ix_t_ab", new_body).build();
    let id = DbObjectId::table_child(StatementType::Index, "dbo", "t", "ix_t_ab");

    let (state, script) = alter(
        AnyStatement::Index(&old),
        AnyStatement::Index(&new),
        &id,
        Dialect::Ms,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Recreate);
    assert!(script.is_empty());
}

/// Validating a NOT VALID constraint is a metadata change only.
#[test]
fn test_constraint_validation_is_in_place() {
    let make = |not_valid: bool| {
        Constraint::define("ck_amount", ConstraintBody::check("amount > 0"))
            .with_body(|b| b.not_valid = not_valid)
            .build()
    };
    let old = make(true);
    let new = make(false);
    let id = DbObjectId::table_child(StatementType::Constraint, "public", "t", "ck_amount");

    let (state, script) = alter(
        AnyStatement::Constraint(&old),
        AnyStatement::Constraint(&new),
        &id,
        Dialect::Pg,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Alter);
    assert_eq!(
        statements(&script),
        vec!["ALTER TABLE public.t VALIDATE CONSTRAINT ck_amount"]
    );
}

/// Switching change tracking on is one statement, run after everything else.
#[test]
fn test_change_tracking_enabled() {
    let old = ms_table("t", &[("id", "[int]")]);
    let new = old
        .to_builder()
        .with_body(|b| {
            if let Some(ms) = b.ms_attrs_mut() {
                ms.tracked = Some(false);
            }
        })
        .build();
    let id = DbObjectId::table("dbo", "t");

    let (state, script) = alter(
        AnyStatement::Table(&old),
        AnyStatement::Table(&new),
        &id,
        Dialect::Ms,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Alter);
    assert_eq!(script.len(), 1);
    assert_eq!(
        script.in_slot(Slot::End).collect::<Vec<_>>(),
        vec!["ALTER TABLE [dbo].[t] ENABLE CHANGE_TRACKING WITH (TRACK_COLUMNS_UPDATED = OFF)"]
    );
}

/// Only the changed bound is emitted.
#[test]
fn test_sequence_max_value_change() {
    let make = |max: i64| {
        Sequence::builder("s", SequenceBody::new(1))
            .with_body(|b| b.max_value = Some(max))
            .build()
    };
    let id = DbObjectId::in_schema(StatementType::Sequence, "public", "s");

    let (state, script) = alter(
        AnyStatement::Sequence(&make(1000)),
        AnyStatement::Sequence(&make(2000)),
        &id,
        Dialect::Pg,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Alter);
    assert_eq!(statements(&script), vec!["ALTER SEQUENCE public.s MAXVALUE 2000"]);
}

/// Sample settings of statistics on empty tables carry no meaning.
#[test]
fn test_statistics_sample_ignored_without_data() {
    let make = |sample: u8| {
        let mut body = StatisticsBody::on(["created_at"]);
        body.parent_has_data = false;
        body.sample_percent = Some(sample);
        Statistics::builder("st_created", body).build()
    };
    let (old, new) = (make(10), make(50));
    assert!(old.compare_sample(&new));

    let id = DbObjectId::table_child(StatementType::Statistics, "dbo", "t", "st_created");
    let (state, script) = alter(
        AnyStatement::Statistics(&old),
        AnyStatement::Statistics(&new),
        &id,
        Dialect::Ms,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Nothing);
    assert!(script.is_empty());
}

/// Column order only matters when it is not ignored.
#[rstest]
#[case::enforced(false, ObjectState::Recreate)]
#[case::ignored(true, ObjectState::Nothing)]
fn test_column_reorder(#[case] ignore_column_order: bool, #[case] expected: ObjectState) {
    let old = pg_table("t", &[("a", "integer"), ("b", "integer")]);
    let new = pg_table("t", &[("b", "integer"), ("a", "integer")]);
    let settings = Settings {
        ignore_column_order,
        ..Settings::default()
    };
    let id = DbObjectId::table("public", "t");

    let (state, script) = alter(
        AnyStatement::Table(&old),
        AnyStatement::Table(&new),
        &id,
        Dialect::Pg,
        &settings,
    );
    assert_eq!(state, expected);
    assert!(script.is_empty());
}

/// A changed identity seed cannot be altered on MS SQL.
#[test]
fn test_ms_identity_seed_change_recreates() {
    use ddlsync::catalog::column::Identity;

    let make = |seed: &str| {
        let column = Column::builder("id", ColumnBody::ms("[int]").not_null())
            .with_body(|b| {
                b.identity = Some(Identity::Ms {
                    seed: seed.into(),
                    increment: "1".into(),
                })
            })
            .build();
        table_builder("t", TableBody::ms(), vec![column]).build()
    };
    let old = make("1");
    let new = make("100");
    let (Some(old_col), Some(new_col)) = (old.column("id"), new.column("id")) else {
        panic!("Expected column id on both tables");
    };
    let id = DbObjectId::column("dbo", "t", "id");

    let (state, script) = alter(
        AnyStatement::Column(old_col),
        AnyStatement::Column(new_col),
        &id,
        Dialect::Ms,
        &Settings::default(),
    );
    assert_eq!(state, ObjectState::Recreate);
    assert!(script.is_empty());
}
