//! SQL rendering for MS SQL database principals (roles and users).

use crate::catalog::AnyStatement;
use crate::catalog::role::{Role, User, UserBody};
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes, drop_statement};

pub fn add_member_sql(ctx: &SqlContext<'_>, role: &str, member: &str) -> String {
    format!("ALTER ROLE {} ADD MEMBER {}", ctx.quote(role), ctx.quote(member))
}

pub fn drop_member_sql(ctx: &SqlContext<'_>, role: &str, member: &str) -> String {
    format!("ALTER ROLE {} DROP MEMBER {}", ctx.quote(role), ctx.quote(member))
}

impl Renderable for Role {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!("CREATE ROLE {}", ctx.quote(self.name()));
        if let Some(owner) = self.owner() {
            sql.push_str(&format!(" AUTHORIZATION {}", ctx.quote(owner)));
        }
        script.push(sql);
        for member in &self.members {
            script.push(add_member_sql(ctx, self.name(), member));
        }
        append_create_attributes(ctx, AnyStatement::Role(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "ROLE", &ctx.quote(self.name())));
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

/// `WITH` options of `CREATE USER`.
fn user_options(ctx: &SqlContext<'_>, user: &UserBody) -> Vec<String> {
    let mut options = Vec::new();
    if let Some(schema) = &user.default_schema {
        options.push(format!("DEFAULT_SCHEMA = {}", ctx.quote(schema)));
    }
    if let Some(language) = &user.default_language {
        options.push(format!("DEFAULT_LANGUAGE = {}", ctx.quote(language)));
    }
    if user.allow_encrypted {
        options.push(format!(
            "ALLOW_ENCRYPTED_VALUE_MODIFICATIONS = {}",
            on_off(user.allow_encrypted)
        ));
    }
    options
}

/// Options of `ALTER USER .. WITH` for everything that changed between two
/// versions of a user.
pub fn alter_user_options(ctx: &SqlContext<'_>, old: &UserBody, new: &UserBody) -> Vec<String> {
    let mut options = Vec::new();
    if old.login != new.login
        && let Some(login) = &new.login
    {
        options.push(format!("LOGIN = {}", ctx.quote(login)));
    }
    if old.default_schema != new.default_schema {
        options.push(match &new.default_schema {
            Some(schema) => format!("DEFAULT_SCHEMA = {}", ctx.quote(schema)),
            None => "DEFAULT_SCHEMA = NULL".to_string(),
        });
    }
    if old.default_language != new.default_language {
        options.push(match &new.default_language {
            Some(language) => format!("DEFAULT_LANGUAGE = {}", ctx.quote(language)),
            None => "DEFAULT_LANGUAGE = NONE".to_string(),
        });
    }
    if old.allow_encrypted != new.allow_encrypted {
        options.push(format!(
            "ALLOW_ENCRYPTED_VALUE_MODIFICATIONS = {}",
            on_off(new.allow_encrypted)
        ));
    }
    if old.password != new.password
        && let Some(password) = &new.password
    {
        options.push(format!("PASSWORD = {}", ctx.literal(password)));
    }
    options
}

impl Renderable for User {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!("CREATE USER {}", ctx.quote(self.name()));
        let mut options = user_options(ctx, self);
        match (&self.login, &self.password) {
            (Some(login), _) => sql.push_str(&format!(" FOR LOGIN {}", ctx.quote(login))),
            (None, Some(password)) => {
                options.insert(0, format!("PASSWORD = {}", ctx.literal(password)));
            }
            (None, None) => sql.push_str(" WITHOUT LOGIN"),
        }
        if !options.is_empty() {
            sql.push_str(&format!(" WITH {}", options.join(", ")));
        }
        script.push(sql);
        append_create_attributes(ctx, AnyStatement::User(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(drop_statement(ctx, "USER", &ctx.quote(self.name())));
    }
}
