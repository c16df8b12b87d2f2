//! Comment statements: `COMMENT ON` for PostgreSQL, the `MS_Description`
//! extended property for MS SQL.

use crate::catalog::comments::CommentAction;
use crate::dialect::Dialect;
use crate::render::{ObjectRef, SqlContext, SqlScript};

const MS_DESCRIPTION: &str = "MS_Description";

/// `existed` tells whether the object already carried a comment, which
/// decides between adding and updating the MS extended property.
pub fn comment_sql(
    ctx: &SqlContext<'_>,
    target: &ObjectRef,
    action: &CommentAction,
    existed: bool,
) -> Option<String> {
    match ctx.dialect {
        Dialect::Pg => {
            let value = match action {
                CommentAction::SetComment { comment } => ctx.literal(comment),
                CommentAction::DropComment => "NULL".to_string(),
            };
            Some(format!(
                "COMMENT ON {} {} IS {value}",
                target.keyword, target.name
            ))
        }
        Dialect::Ms => {
            if target.levels.is_empty() {
                return None;
            }
            let (procedure, value) = match action {
                CommentAction::SetComment { comment } if existed => {
                    ("sp_updateextendedproperty", Some(comment))
                }
                CommentAction::SetComment { comment } => ("sp_addextendedproperty", Some(comment)),
                CommentAction::DropComment => ("sp_dropextendedproperty", None),
            };

            let mut args = vec![format!("@name = {}", ctx.literal(MS_DESCRIPTION))];
            if let Some(value) = value {
                args.push(format!("@value = {}", ctx.literal(value)));
            }
            for (level, (kind, name)) in target.levels.iter().enumerate() {
                args.push(format!("@level{level}type = {}", ctx.literal(kind)));
                args.push(format!("@level{level}name = {}", ctx.literal(name)));
            }
            Some(format!("EXEC sys.{procedure} {}", args.join(", ")))
        }
    }
}

pub fn append_comment(
    ctx: &SqlContext<'_>,
    target: &ObjectRef,
    action: &CommentAction,
    existed: bool,
    script: &mut SqlScript,
) {
    if let Some(sql) = comment_sql(ctx, target, action, existed) {
        script.push_to(ctx.comment_slot(), sql);
    }
}
