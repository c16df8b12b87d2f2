//! SQL rendering for functions, procedures and aggregates.

use crate::catalog::AnyStatement;
use crate::catalog::function::{
    ArgMode, Function, FunctionKind, FunctionParam, MsFunction, PgFunction,
};
use crate::dialect::{Dialect, dollar_quote};
use crate::render::{
    Renderable, SqlContext, SqlScript, append_create_attributes, append_ms_module_settings,
    drop_statement,
};

fn pg_param(dialect: Dialect, param: &FunctionParam) -> String {
    let mut parts = Vec::new();
    if !matches!(param.mode, ArgMode::In | ArgMode::Table) {
        parts.push(param.mode.to_string());
    }
    if let Some(name) = &param.name {
        parts.push(dialect.quote_ident(name));
    }
    parts.push(param.data_type.clone());
    let mut sql = parts.join(" ");
    if let Some(default) = &param.default {
        sql.push_str(&format!(" DEFAULT {default}"));
    }
    sql
}

fn ms_param(param: &FunctionParam) -> String {
    let mut sql = format!("{} {}", param.name.as_deref().unwrap_or_default(), param.data_type);
    if let Some(default) = &param.default {
        sql.push_str(&format!(" = {default}"));
    }
    if matches!(param.mode, ArgMode::Out | ArgMode::InOut) {
        sql.push_str(" OUTPUT");
    }
    sql
}

fn keyword(kind: FunctionKind) -> &'static str {
    kind.statement_type().keyword()
}

fn pg_definition(ctx: &SqlContext<'_>, function: &Function, pg: &PgFunction) -> String {
    let name = ctx.qualified(function.name());

    if function.kind == FunctionKind::Aggregate {
        let options: Vec<String> = pg
            .aggregate
            .iter()
            .map(|(k, v)| format!("{k} = {v}"))
            .collect();
        return format!(
            "CREATE AGGREGATE {name}({}) (\n    {}\n)",
            function.argument_types(),
            options.join(",\n    ")
        );
    }

    let params: Vec<String> = function
        .parameters
        .iter()
        .filter(|p| p.mode != ArgMode::Table)
        .map(|p| pg_param(ctx.dialect, p))
        .collect();
    let mut sql = format!(
        "CREATE OR REPLACE {} {name}({})",
        keyword(function.kind),
        params.join(", ")
    );

    // RETURNS TABLE (...) / RETURNS type
    let table_columns: Vec<String> = function
        .parameters
        .iter()
        .filter(|p| p.mode == ArgMode::Table)
        .map(|p| pg_param(ctx.dialect, p))
        .collect();
    if !table_columns.is_empty() {
        sql.push_str(&format!("\nRETURNS TABLE({})", table_columns.join(", ")));
    } else if let Some(return_type) = &function.return_type {
        sql.push_str(&format!("\nRETURNS {return_type}"));
    }

    sql.push_str(&format!("\nLANGUAGE {}", pg.language));

    let mut attributes = Vec::new();
    if let Some(volatility) = &pg.volatility {
        attributes.push(volatility.clone());
    }
    if pg.strict {
        attributes.push("STRICT".to_string());
    }
    if pg.security_definer {
        attributes.push("SECURITY DEFINER".to_string());
    }
    if pg.leakproof {
        attributes.push("LEAKPROOF".to_string());
    }
    if let Some(parallel) = &pg.parallel {
        attributes.push(format!("PARALLEL {parallel}"));
    }
    if let Some(cost) = &pg.cost {
        attributes.push(format!("COST {cost}"));
    }
    if let Some(rows) = &pg.rows {
        attributes.push(format!("ROWS {rows}"));
    }
    if !attributes.is_empty() {
        sql.push('\n');
        sql.push_str(&attributes.join(" "));
    }
    for (key, value) in &pg.configuration {
        sql.push_str(&format!("\nSET {key} = {value}"));
    }

    sql.push_str("\nAS ");
    sql.push_str(&dollar_quote(&pg.definition));
    sql
}

/// Full MS module text; `verb` is `CREATE` or `ALTER`.
pub fn ms_definition(ctx: &SqlContext<'_>, function: &Function, ms: &MsFunction, verb: &str) -> String {
    let name = ctx.qualified(function.name());
    let params: Vec<String> = function.parameters.iter().map(ms_param).collect();

    let mut sql = format!("{verb} {} {name}", keyword(function.kind));
    match function.kind {
        FunctionKind::Procedure => {
            if !params.is_empty() {
                sql.push_str(&format!("\n    {}", params.join(",\n    ")));
            }
        }
        _ => {
            sql.push_str(&format!(" ({})", params.join(", ")));
            if let Some(return_type) = &function.return_type {
                sql.push_str(&format!("\nRETURNS {return_type}"));
            }
        }
    }
    if !ms.options.is_empty() {
        sql.push_str(&format!("\nWITH {}", ms.options.join(", ")));
    }

    match &ms.clr {
        Some(clr) => sql.push_str(&format!(
            "\nAS EXTERNAL NAME {}.{}.{}",
            ctx.quote(&clr.assembly),
            ctx.quote(&clr.class),
            ctx.quote(&clr.method)
        )),
        None => {
            sql.push_str("\nAS\n");
            sql.push_str(&ms.body);
        }
    }
    sql
}

/// Module statements that replace or create the routine in place.
pub fn append_definition(ctx: &SqlContext<'_>, function: &Function, verb: &str, script: &mut SqlScript) {
    if let Some(pg) = function.pg_attrs() {
        script.push(pg_definition(ctx, function, pg));
    } else if let Some(ms) = function.ms_attrs() {
        append_ms_module_settings(script, Some(ms.quoted_identifier), ms.ansi_nulls);
        script.push(ms_definition(ctx, function, ms, verb));
    }
}

impl Renderable for Function {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        append_definition(ctx, self, "CREATE", script);
        append_create_attributes(ctx, AnyStatement::Function(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let name = match ctx.dialect {
            Dialect::Pg => format!("{}({})", ctx.qualified(self.name()), self.argument_types()),
            Dialect::Ms => ctx.qualified(self.name()),
        };
        script.push(drop_statement(ctx, keyword(self.kind), &name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::function::{ClrMethod, FunctionBody};
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::config::Settings;

    #[test]
    fn test_pg_function() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Function, "public", "add_one(integer)");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let function = Function::builder(
            "add_one",
            FunctionBody::pg(FunctionKind::Function, "sql", "SELECT $1 + 1")
                .with_param(FunctionParam::new("x", "integer"))
                .returns("integer"),
        )
        .with_body(|b| {
            if let Some(pg) = b.pg_attrs_mut() {
                pg.volatility = Some("IMMUTABLE".into());
                pg.strict = true;
                pg.configuration.insert("search_path".into(), "public".into());
            }
        })
        .comment("adds one")
        .build();

        let mut script = SqlScript::new();
        function.create_sql(&ctx, &mut script);
        let sql: Vec<&str> = script.ordered().collect();
        assert_eq!(
            sql,
            vec![
                "CREATE OR REPLACE FUNCTION public.add_one(x integer)\nRETURNS integer\nLANGUAGE sql\nIMMUTABLE STRICT\nSET search_path = public\nAS $$SELECT $1 + 1$$",
                "COMMENT ON FUNCTION public.add_one(integer) IS 'adds one'",
            ]
        );

        let mut script = SqlScript::new();
        function.drop_sql(&ctx, &mut script);
        assert_eq!(script.statements()[0].sql, "DROP FUNCTION public.add_one(integer)");
    }

    #[test]
    fn test_pg_aggregate() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Aggregate, "public", "total(integer)");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let function = Function::builder(
            "total",
            FunctionBody::pg(FunctionKind::Aggregate, "internal", "")
                .with_param(FunctionParam::new("v", "integer")),
        )
        .with_body(|b| {
            if let Some(pg) = b.pg_attrs_mut() {
                pg.aggregate.insert("SFUNC".into(), "int4pl".into());
                pg.aggregate.insert("STYPE".into(), "integer".into());
            }
        })
        .build();

        let mut script = SqlScript::new();
        function.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE AGGREGATE public.total(integer) (\n    SFUNC = int4pl,\n    STYPE = integer\n)"
        );
    }

    #[test]
    fn test_ms_procedure_batches() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Procedure, "dbo", "usp_get");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let function = Function::builder(
            "usp_get",
            FunctionBody::ms(FunctionKind::Procedure, "BEGIN\n    SELECT 1\nEND")
                .with_param(FunctionParam::new("@id", "int")),
        )
        .build();

        let mut script = SqlScript::new();
        function.create_sql(&ctx, &mut script);
        let sql: Vec<&str> = script.ordered().collect();
        assert_eq!(
            sql,
            vec![
                "SET QUOTED_IDENTIFIER ON",
                "SET ANSI_NULLS ON",
                "CREATE PROCEDURE [dbo].[usp_get]\n    @id int\nAS\nBEGIN\n    SELECT 1\nEND",
            ]
        );
    }

    #[test]
    fn test_ms_clr_function() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Function, "dbo", "slugify");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let function = Function::builder(
            "slugify",
            FunctionBody::ms(FunctionKind::Function, "")
                .with_param(FunctionParam::new("@s", "nvarchar(max)"))
                .returns("nvarchar(max)"),
        )
        .with_body(|b| {
            if let Some(ms) = b.ms_attrs_mut() {
                ms.clr = Some(ClrMethod {
                    assembly: "Utils".into(),
                    class: "Utils.Text".into(),
                    method: "Slugify".into(),
                });
            }
        })
        .build();

        let mut script = SqlScript::new();
        function.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[2].sql,
            "CREATE FUNCTION [dbo].[slugify] (@s nvarchar(max))\nRETURNS nvarchar(max)\nAS EXTERNAL NAME [Utils].[Utils.Text].[Slugify]"
        );
    }
}
