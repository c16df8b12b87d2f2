//! Per-dialect quoting, literal escaping and batch delimiters.
//!
//! Every piece of rendered SQL goes through a [`Dialect`] so the catalog and
//! diff code stay dialect-agnostic apart from the flavour-specific attributes
//! carried by each object body.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A supported SQL engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL and Greenplum.
    Pg,
    /// Microsoft SQL Server (T-SQL).
    Ms,
}

/// PostgreSQL reserved key words. Identifiers matching one of these must be quoted.
const PG_RESERVED_KEYWORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "binary",
    "both",
    "case",
    "cast",
    "check",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "false",
    "fetch",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "group",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "intersect",
    "into",
    "is",
    "isnull",
    "join",
    "lateral",
    "leading",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "natural",
    "not",
    "notnull",
    "null",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "outer",
    "overlaps",
    "placing",
    "primary",
    "references",
    "returning",
    "right",
    "select",
    "session_user",
    "similar",
    "some",
    "symmetric",
    "system_user",
    "table",
    "tablesample",
    "then",
    "to",
    "trailing",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
];

impl Dialect {
    /// Quote an identifier for this dialect.
    ///
    /// PostgreSQL identifiers are only quoted when they would otherwise be
    /// case-folded, are not valid bare identifiers, or collide with a reserved
    /// key word. MS SQL identifiers are always bracketed.
    pub fn quote_ident(self, name: &str) -> String {
        match self {
            Dialect::Pg => {
                if pg_needs_quotes(name) {
                    format!("\"{}\"", name.replace('"', "\"\""))
                } else {
                    name.to_string()
                }
            }
            Dialect::Ms => format!("[{}]", name.replace(']', "]]")),
        }
    }

    /// Quote a schema-qualified name.
    pub fn quote_qualified(self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.quote_ident(schema), self.quote_ident(name))
    }

    /// Quote a comma separated identifier list.
    pub fn quote_list<S: AsRef<str>>(self, names: &[S]) -> String {
        names
            .iter()
            .map(|n| self.quote_ident(n.as_ref()))
            .join(", ")
    }

    /// Render a string literal.
    pub fn quote_literal(self, value: &str) -> String {
        let escaped = value.replace('\'', "''");
        match self {
            Dialect::Pg => format!("'{escaped}'"),
            Dialect::Ms => format!("N'{escaped}'"),
        }
    }

    /// Text appended to every statement when a script is joined.
    pub fn delimiter(self) -> &'static str {
        match self {
            Dialect::Pg => ";",
            Dialect::Ms => "\nGO",
        }
    }

    /// The schema every database starts with; it is never created or dropped.
    pub fn default_schema(self) -> &'static str {
        match self {
            Dialect::Pg => "public",
            Dialect::Ms => "dbo",
        }
    }

    /// Schemas owned by the engine itself.
    pub fn is_system_schema(self, schema: &str) -> bool {
        match self {
            Dialect::Pg => {
                matches!(schema, "pg_catalog" | "information_schema" | "pg_toast")
                    || schema.starts_with("pg_temp_")
            }
            Dialect::Ms => {
                matches!(schema, "sys" | "INFORMATION_SCHEMA" | "guest")
            }
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Pg => write!(f, "PostgreSQL"),
            Dialect::Ms => write!(f, "MS SQL"),
        }
    }
}

fn pg_needs_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    if !(first.is_ascii_lowercase() || first == '_') {
        return true;
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$') {
        return true;
    }
    PG_RESERVED_KEYWORDS.binary_search(&name).is_ok()
}

/// Wrap a PostgreSQL routine body in dollar quotes whose tag does not occur in
/// the body itself.
pub fn dollar_quote(body: &str) -> String {
    let mut tag = String::from("$$");
    let mut fill = 0usize;
    while body.contains(&tag) {
        fill += 1;
        tag = format!("${}$", "_".repeat(fill));
    }
    format!("{tag}{body}{tag}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("users", "users")]
    #[case::mixed_case("Users", "\"Users\"")]
    #[case::keyword("order", "\"order\"")]
    #[case::leading_digit("1abc", "\"1abc\"")]
    #[case::space("my table", "\"my table\"")]
    #[case::embedded_quote("a\"b", "\"a\"\"b\"")]
    #[case::underscore("_tmp$1", "_tmp$1")]
    fn test_pg_quote_ident(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Dialect::Pg.quote_ident(input), expected);
    }

    #[test]
    fn test_keyword_table_is_sorted() {
        let mut sorted = PG_RESERVED_KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, PG_RESERVED_KEYWORDS);
    }

    #[test]
    fn test_ms_quote_ident() {
        assert_eq!(Dialect::Ms.quote_ident("users"), "[users]");
        assert_eq!(Dialect::Ms.quote_ident("a]b"), "[a]]b]");
        assert_eq!(Dialect::Ms.quote_qualified("dbo", "t"), "[dbo].[t]");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(Dialect::Pg.quote_literal("it's"), "'it''s'");
        assert_eq!(Dialect::Ms.quote_literal("it's"), "N'it''s'");
    }

    #[test]
    fn test_dollar_quote_picks_free_tag() {
        assert_eq!(dollar_quote("SELECT 1"), "$$SELECT 1$$");
        assert_eq!(dollar_quote("SELECT '$$'"), "$_$SELECT '$$'$_$");
        assert_eq!(dollar_quote("$$ $_$"), "$__$$$ $_$$__$");
    }
}
