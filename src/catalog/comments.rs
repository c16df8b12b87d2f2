use crate::catalog::AnyStatement;
use crate::catalog::statement::Statement;

/// Trait for objects that can have comments
pub trait Commentable {
    fn comment_text(&self) -> Option<&str>;
}

impl<B> Commentable for Statement<B> {
    fn comment_text(&self) -> Option<&str> {
        self.comment()
    }
}

impl Commentable for AnyStatement<'_> {
    fn comment_text(&self) -> Option<&str> {
        self.comment()
    }
}

/// Comment change between two versions of the same object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAction {
    SetComment { comment: String },
    DropComment,
}

/// Generate the comment diff action for any commentable object
pub fn diff_comments<T: Commentable + ?Sized>(old: &T, new: &T) -> Option<CommentAction> {
    match (old.comment_text(), new.comment_text()) {
        (None, Some(comment)) => Some(CommentAction::SetComment {
            comment: comment.to_string(),
        }),
        (Some(_), None) => Some(CommentAction::DropComment),
        (Some(old_comment), Some(new_comment)) if old_comment != new_comment => {
            Some(CommentAction::SetComment {
                comment: new_comment.to_string(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_statement(comment: Option<&str>) -> Statement<()> {
        let builder = Statement::builder("t", ());
        match comment {
            Some(c) => builder.comment(c).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_diff_comments() {
        let none = make_test_statement(None);
        let a = make_test_statement(Some("a"));
        let b = make_test_statement(Some("b"));

        assert_eq!(diff_comments(&none, &none), None);
        assert_eq!(diff_comments(&a, &a), None);
        assert_eq!(
            diff_comments(&none, &a),
            Some(CommentAction::SetComment {
                comment: "a".to_string()
            })
        );
        assert_eq!(diff_comments(&a, &none), Some(CommentAction::DropComment));
        assert_eq!(
            diff_comments(&a, &b),
            Some(CommentAction::SetComment {
                comment: "b".to_string()
            })
        );
    }
}
