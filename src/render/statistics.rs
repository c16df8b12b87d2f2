//! SQL rendering for MS SQL statistics objects

use crate::catalog::AnyStatement;
use crate::catalog::statistics::{Statistics, StatisticsBody};
use crate::render::{Renderable, SqlContext, SqlScript, append_create_attributes};

fn sample_option(body: &StatisticsBody) -> Option<String> {
    // Sampling an empty table is meaningless.
    if !body.parent_has_data {
        return None;
    }
    body.sample_percent.map(|p| format!("SAMPLE {p} PERCENT"))
}

/// `UPDATE STATISTICS` applying the new sample and recompute settings.
pub fn update_statistics_sql(ctx: &SqlContext<'_>, old: &StatisticsBody, new: &StatisticsBody, name: &str) -> String {
    let mut options = vec![sample_option(new).unwrap_or_else(|| "FULLSCAN".to_string())];
    if new.norecompute {
        options.push("NORECOMPUTE".to_string());
    }
    if old.incremental != new.incremental {
        let on_off = if new.incremental { "ON" } else { "OFF" };
        options.push(format!("INCREMENTAL = {on_off}"));
    }
    format!(
        "UPDATE STATISTICS {} ({}) WITH {}",
        ctx.parent_name(),
        ctx.quote(name),
        options.join(", ")
    )
}

impl Renderable for Statistics {
    fn create_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        let mut sql = format!(
            "CREATE STATISTICS {} ON {} ({})",
            ctx.quote(self.name()),
            ctx.parent_name(),
            ctx.dialect.quote_list(&self.columns)
        );
        if let Some(filter) = &self.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }

        let mut options: Vec<String> = sample_option(self).into_iter().collect();
        if self.norecompute {
            options.push("NORECOMPUTE".to_string());
        }
        if self.incremental {
            options.push("INCREMENTAL = ON".to_string());
        }
        if !options.is_empty() {
            sql.push_str(&format!(" WITH {}", options.join(", ")));
        }
        script.push(sql);
        append_create_attributes(ctx, AnyStatement::Statistics(self), script);
    }

    fn drop_sql(&self, ctx: &SqlContext<'_>, script: &mut SqlScript) {
        script.push(format!(
            "DROP STATISTICS {}.{}",
            ctx.parent_name(),
            ctx.quote(self.name())
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::id::{DbObjectId, StatementType};
    use crate::config::Settings;
    use crate::dialect::Dialect;

    fn make_test_statistics(parent_has_data: bool) -> Statistics {
        let mut body = StatisticsBody::on(["customer_id", "created"]);
        body.sample_percent = Some(25);
        body.norecompute = true;
        body.parent_has_data = parent_has_data;
        Statistics::builder("st_orders", body).build()
    }

    #[test]
    fn test_create_statistics_with_sample() {
        let settings = Settings::default();
        let id = DbObjectId::table_child(StatementType::Statistics, "dbo", "orders", "st_orders");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);

        let mut script = SqlScript::new();
        make_test_statistics(true).create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE STATISTICS [st_orders] ON [dbo].[orders] ([customer_id], [created]) \
             WITH SAMPLE 25 PERCENT, NORECOMPUTE"
        );

        let mut script = SqlScript::new();
        make_test_statistics(true).drop_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "DROP STATISTICS [dbo].[orders].[st_orders]"
        );
    }

    #[test]
    fn test_sample_omitted_without_data() {
        let settings = Settings::default();
        let id = DbObjectId::table_child(StatementType::Statistics, "dbo", "orders", "st_orders");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);

        let mut script = SqlScript::new();
        make_test_statistics(false).create_sql(&ctx, &mut script);
        assert_eq!(
            script.statements()[0].sql,
            "CREATE STATISTICS [st_orders] ON [dbo].[orders] ([customer_id], [created]) WITH NORECOMPUTE"
        );
    }

    #[test]
    fn test_update_statistics() {
        let settings = Settings::default();
        let id = DbObjectId::table_child(StatementType::Statistics, "dbo", "orders", "st_orders");
        let ctx = SqlContext::new(&id, Dialect::Ms, &settings);
        let old = StatisticsBody::on(["a"]);
        let mut new = old.clone();
        new.incremental = true;
        assert_eq!(
            update_statistics_sql(&ctx, &old, &new, "st_orders"),
            "UPDATE STATISTICS [dbo].[orders] ([st_orders]) WITH FULLSCAN, INCREMENTAL = ON"
        );
    }
}
