//! SQL rendering for user-defined types

use crate::catalog::AnyStatement;
use crate::catalog::custom_type::{CompositeAttribute, CustomType, TypeKind};
use crate::render::{
    Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement, format_options,
};

pub fn attribute_definition(ctx: &SqlContext<'_>, attribute: &CompositeAttribute) -> String {
    let mut sql = format!("{} {}", ctx.quote(&attribute.name), attribute.data_type);
    if let Some(collation) = &attribute.collation {
        sql.push_str(&format!(" COLLATE {collation}"));
    }
    sql
}

/// `ALTER TYPE t ADD VALUE 'v' [BEFORE|AFTER 'w']`.
pub fn add_enum_value_sql(ctx: &SqlContext<'_>, value: &str, position: Option<(&str, &str)>) -> String {
    let mut sql = format!(
        "ALTER TYPE {} ADD VALUE {}",
        ctx.qualified(&ctx.id.name),
        ctx.literal(value)
    );
    if let Some((keyword, neighbour)) = position {
        sql.push_str(&format!(" {keyword} {}", ctx.literal(neighbour)));
    }
    sql
}

/// One `ALTER TYPE` carrying every composite attribute action.
pub fn alter_attributes_sql(ctx: &SqlContext<'_>, actions: &[String]) -> String {
    format!(
        "ALTER TYPE {}\n    {}",
        ctx.qualified(&ctx.id.name),
        actions.join(",\n    ")
    )
}

fn create_definition(ctx: &SqlContext<'_>, name: &str, kind: &TypeKind) -> String {
    match kind {
        TypeKind::Composite { attributes } => {
            let attributes: Vec<String> = attributes
                .iter()
                .map(|a| attribute_definition(ctx, a))
                .collect();
            format!("CREATE TYPE {name} AS (\n    {}\n)", attributes.join(",\n    "))
        }
        TypeKind::Enum { values } => {
            let values: Vec<String> = values.iter().map(|v| ctx.literal(v)).collect();
            format!("CREATE TYPE {name} AS ENUM (\n    {}\n)", values.join(",\n    "))
        }
        TypeKind::Range { subtype, options } => {
            let mut entries = vec![format!("subtype = {subtype}")];
            if !options.is_empty() {
                entries.push(format_options(options));
            }
            format!("CREATE TYPE {name} AS RANGE ({})", entries.join(", "))
        }
        TypeKind::Base { options } => {
            format!("CREATE TYPE {name} (\n    {}\n)", format_options(options))
        }
        TypeKind::Shell => format!("CREATE TYPE {name}"),
        TypeKind::Alias {
            base_type,
            not_null,
        } => {
            let nullability = if *not_null { " NOT NULL" } else { " NULL" };
            format!("CREATE TYPE {name} FROM {base_type}{nullability}")
        }
        TypeKind::Table { definitions } => {
            format!("CREATE TYPE {name} AS TABLE (\n    {}\n)", definitions.join(",\n    "))
        }
        TypeKind::Clr { assembly, class } => format!(
            "CREATE TYPE {name}\nEXTERNAL NAME {}.{}",
            ctx.quote(assembly),
            ctx.quote(class)
        ),
    }
}

impl Renderable for CustomType {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let sql = create_definition(ctx, &ctx.qualified(self.name()), &self.kind);
        script.push(ctx.guarded(sql));
        append_create_attributes(ctx, AnyStatement::Type(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "TYPE", &ctx.qualified(self.name())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::custom_type::TypeBody;
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::config::Settings;
    use crate::dialect::Dialect;

    #[test]
    fn test_pg_enum_type() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Type, "public", "mood");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let mood = CustomType::builder("mood", TypeBody::enumeration(["sad", "happy"])).build();

        let mut script = SqlScript::new();
        mood.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE TYPE public.mood AS ENUM (\n    'sad',\n    'happy'\n)"
        );
        assert_eq!(
            add_enum_value_sql(&ctx, "ok", Some(("AFTER", "sad"))),
            "ALTER TYPE public.mood ADD VALUE 'ok' AFTER 'sad'"
        );
    }

    #[test]
    fn test_pg_composite_type() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Type, "public", "address");
        let ctx = SqlContext::new(&id, Dialect::Pg, &settings);
        let mut city = CompositeAttribute::new("city", "text");
        city.collation = Some("\"C\"".into());
        let address = CustomType::builder(
            "address",
            TypeBody::composite(vec![CompositeAttribute::new("street", "text"), city]),
        )
        .build();

        let mut script = SqlScript::new();
        address.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE TYPE public.address AS (\n    street text,\n    city text COLLATE \"C\"\n)"
        );

        let mut script = SqlScript::new();
        address.drop_sql(&ctx, &mut script);
        assert_eq!(script.statements()[0].sql, "DROP TYPE public.address");
    }

    #[test]
    fn test_ms_alias_and_table_types() {
        let settings = Settings::default();
        let id = DbObjectId::in_schema(StatementType::Type, "dbo", "Phone");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let alias = CustomType::builder(
            "Phone",
            TypeBody::new(TypeKind::Alias {
                base_type: "varchar(20)".into(),
                not_null: true,
            }),
        )
        .build();

        let mut script = SqlScript::new();
        alias.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE TYPE [dbo].[Phone] FROM varchar(20) NOT NULL"
        );

        let table = CustomType::builder(
            "IdList",
            TypeBody::new(TypeKind::Table {
                definitions: vec!["[id] int NOT NULL".into(), "PRIMARY KEY ([id])".into()],
            }),
        )
        .build();
        let id = DbObjectId::in_schema(StatementType::Type, "dbo", "IdList");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let mut script = SqlScript::new();
        table.create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE TYPE [dbo].[IdList] AS TABLE (\n    [id] int NOT NULL,\n    PRIMARY KEY ([id])\n)"
        );
    }
}
