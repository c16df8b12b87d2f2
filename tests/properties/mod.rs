//! Properties every object kind must satisfy in both dialects: equality is
//! reflexive and agrees with the digest, and diffing an object against an
//! identical copy yields nothing.

use crate::helpers::{database, init_tracing, ms_column, pg_column, schema, table_builder};
use ddlsync::catalog::assembly::{Assembly, AssemblyBody};
use ddlsync::catalog::constraint::{Constraint, ConstraintBody};
use ddlsync::catalog::custom_type::{CustomType, TypeBody};
use ddlsync::catalog::domain::{Domain, DomainBody};
use ddlsync::catalog::extension::{Extension, ExtensionBody};
use ddlsync::catalog::function::{Function, FunctionBody, FunctionKind};
use ddlsync::catalog::index::{Index, IndexBody};
use ddlsync::catalog::policy::{Policy, PolicyBody};
use ddlsync::catalog::role::{Role, RoleBody, User, UserBody};
use ddlsync::catalog::sequence::{Sequence, SequenceBody};
use ddlsync::catalog::statistics::{Statistics, StatisticsBody};
use ddlsync::catalog::table::TableBody;
use ddlsync::catalog::triggers::{Trigger, TriggerBody, TriggerEvent, TriggerTiming};
use ddlsync::catalog::view::{View, ViewBody};
use ddlsync::catalog::{Catalog, Database};
use ddlsync::diff::{alter_any, context_for};
use ddlsync::{Dialect, ObjectState, Settings, SqlScript, diff_databases};
use rstest::rstest;

fn pg_corpus() -> Database {
    let users = table_builder(
        "users",
        TableBody::pg(),
        vec![pg_column("id", "integer"), pg_column("email", "text")],
    )
    .comment("Registered users")
    .constraint(Constraint::define("users_pkey", ConstraintBody::primary_key(["id"])).build())
    .and_then(|t| t.index(Index::builder("users_email_idx", IndexBody::on(["email"]).unique()).build()))
    .and_then(|t| {
        t.trigger(
            Trigger::builder(
                "users_audit",
                TriggerBody::pg(
                    TriggerTiming::After,
                    vec![TriggerEvent::Insert, TriggerEvent::Update],
                    "app.audit()",
                ),
            )
            .build(),
        )
    })
    .and_then(|t| t.policy(Policy::builder("users_read", PolicyBody::default()).build()))
    .unwrap()
    .build();

    let app = schema("app", |s| {
        s.table(users)?
            .view(View::builder("active_users", ViewBody::pg("SELECT id FROM app.users")).build())?
            .function(
                Function::builder(
                    "audit",
                    FunctionBody::pg(FunctionKind::Function, "plpgsql", "BEGIN RETURN NEW; END")
                        .returns("trigger"),
                )
                .build(),
            )?
            .sequence(Sequence::builder("ticket_seq", SequenceBody::new(1)).build())?
            .custom_type(
                CustomType::builder("status", TypeBody::enumeration(["new", "done"])).build(),
            )?
            .domain(
                Domain::builder(
                    "positive_int",
                    DomainBody::new("integer").with_check("positive_int_check", "VALUE > 0"),
                )
                .build(),
            )
    });

    Database::builder(Dialect::Pg)
        .schema(app)
        .and_then(|b| b.extension(Extension::builder("pgcrypto", ExtensionBody::in_schema("app")).build()))
        .unwrap()
        .build()
}

fn ms_corpus() -> Database {
    let orders = table_builder(
        "orders",
        TableBody::ms(),
        vec![ms_column("id", "[int]"), ms_column("placed_at", "[datetime2](7)")],
    )
    .constraint(Constraint::define("PK_orders", ConstraintBody::primary_key(["id"])).build())
    .and_then(|t| t.index(Index::builder("IX_orders_placed", IndexBody::on(["placed_at"])).build()))
    .and_then(|t| t.statistics(Statistics::builder("ST_orders_placed", StatisticsBody::on(["placed_at"])).build()))
    .and_then(|t| {
        t.trigger(
            Trigger::builder(
                "TR_orders_audit",
                TriggerBody::ms(
                    TriggerTiming::After,
                    vec![TriggerEvent::Insert],
                    "BEGIN SET NOCOUNT ON; END",
                ),
            )
            .build(),
        )
    })
    .unwrap()
    .build();

    let sales = schema("sales", |s| {
        s.table(orders)?
            .view(View::builder("recent_orders", ViewBody::ms("SELECT id FROM sales.orders")).build())?
            .function(
                Function::builder(
                    "order_count",
                    FunctionBody::ms(FunctionKind::Function, "BEGIN RETURN 1 END").returns("[int]"),
                )
                .build(),
            )?
            .sequence(Sequence::builder("order_numbers", SequenceBody::new(1)).build())
    });

    Database::builder(Dialect::Ms)
        .schema(sales)
        .and_then(|b| b.role(Role::builder("readers", RoleBody::with_members(["reporting"])).build()))
        .and_then(|b| b.user(User::builder("reporting", UserBody::for_login("reporting_login")).build()))
        .and_then(|b| b.assembly(Assembly::builder("Utils", AssemblyBody::from_binaries(["0x4D5A00"])).build()))
        .unwrap()
        .build()
}

fn corpus(dialect: Dialect) -> Database {
    match dialect {
        Dialect::Pg => pg_corpus(),
        Dialect::Ms => ms_corpus(),
    }
}

#[rstest]
#[case::pg(Dialect::Pg)]
#[case::ms(Dialect::Ms)]
fn test_equality_is_reflexive_and_matches_digest(#[case] dialect: Dialect) {
    let db = corpus(dialect);
    let copy = db.clone();
    let catalog = Catalog::new(&db);
    let copy_catalog = Catalog::new(&copy);
    assert_eq!(catalog.objects.len(), copy_catalog.objects.len());

    for (id, entry) in &catalog.objects {
        let Some(other) = copy_catalog.get(id) else {
            panic!("{id} missing from the copied catalog");
        };
        assert!(entry.statement.same_as(&entry.statement), "{id} is not equal to itself");
        assert!(entry.statement.same_as(&other.statement), "{id} differs from its copy");
        assert_eq!(entry.statement.digest(), other.statement.digest(), "{id} digest");
    }
}

#[rstest]
#[case::pg(Dialect::Pg)]
#[case::ms(Dialect::Ms)]
fn test_alter_against_identical_copy_is_nothing(#[case] dialect: Dialect) {
    init_tracing();
    let settings = Settings::default();
    let db = corpus(dialect);
    let copy = db.clone();
    let old = Catalog::new(&db);
    let new = Catalog::new(&copy);

    for (id, entry) in &old.objects {
        let Some(other) = new.get(id) else {
            panic!("{id} missing from the copied catalog");
        };
        let ctx = context_for(&new, id, &settings);
        let mut script = SqlScript::new();
        let state = alter_any(entry.statement, other.statement, &ctx, &mut script);
        assert_eq!(state, ObjectState::Nothing, "{id}");
        assert!(script.is_empty(), "{id} emitted {:?}", script.statements());
    }
}

#[rstest]
#[case::pg(Dialect::Pg)]
#[case::ms(Dialect::Ms)]
fn test_identical_databases_produce_empty_script(#[case] dialect: Dialect) {
    let db = corpus(dialect);
    let script = diff_databases(&db, &db.clone(), &Settings::default()).unwrap();
    assert!(script.is_empty(), "unexpected statements: {:?}", script.statements());
}

#[rstest]
#[case::pg(Dialect::Pg)]
#[case::ms(Dialect::Ms)]
fn test_building_from_nothing_and_back(#[case] dialect: Dialect) {
    let settings = Settings::default();
    let db = corpus(dialect);
    let empty = database(dialect, Vec::new());

    let create = diff_databases(&empty, &db, &settings).unwrap();
    let drop = diff_databases(&db, &empty, &settings).unwrap();
    assert!(!create.is_empty());
    assert!(!drop.is_empty());
    assert!(
        drop.ordered().all(|sql| sql.starts_with("DROP") || sql.starts_with("ALTER")),
        "drop script should only drop: {:?}",
        drop.statements()
    );
}

#[test]
fn test_comment_change_breaks_equality() {
    let db = pg_corpus();
    let Some(users) = db.table("app", "users") else {
        panic!("Expected app.users in the corpus");
    };
    let changed = users.to_builder().comment("All users").build();
    assert_ne!(users, &changed);
    assert_ne!(users.digest(), changed.digest());
}
