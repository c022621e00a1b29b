//! SQL rendering for rewrite rule operations

use crate::catalog::id::DbObjectId;
use crate::catalog::rule::Rule;
use crate::diff::operations::{CommentOperation, RuleOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for RuleOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RuleOperation::Create { rule } => vec![RenderedSql::new(render_definition(rule))],
            RuleOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP RULE {} ON {}.{};",
                quote_ident(&identifier.name),
                quote_ident(&identifier.schema),
                quote_ident(&identifier.table)
            ))],
            RuleOperation::Replace { new_rule, .. } => {
                vec![RenderedSql::new(render_replace(new_rule))]
            }
            RuleOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            RuleOperation::Create { rule } => DbObjectId::Rule {
                schema: rule.schema.clone(),
                table: rule.table_name.clone(),
                name: rule.name.clone(),
            },
            RuleOperation::Drop { identifier } => DbObjectId::Rule {
                schema: identifier.schema.clone(),
                table: identifier.table.clone(),
                name: identifier.name.clone(),
            },
            RuleOperation::Replace { new_rule, .. } => DbObjectId::Rule {
                schema: new_rule.schema.clone(),
                table: new_rule.table_name.clone(),
                name: new_rule.name.clone(),
            },
            RuleOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Rule {
                        schema: target.schema.clone(),
                        table: target.table.clone(),
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, RuleOperation::Drop { .. })
    }
}

fn render_definition(rule: &Rule) -> String {
    let def = rule.definition.trim_end();
    if def.ends_with(';') {
        def.to_string()
    } else {
        format!("{};", def)
    }
}

fn render_replace(rule: &Rule) -> String {
    let def = render_definition(rule);
    if let Some(rest) = def.strip_prefix("CREATE RULE") {
        format!("CREATE OR REPLACE RULE{}", rest)
    } else {
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::RuleIdentifier;

    fn rule() -> Rule {
        Rule {
            schema: "public".to_string(),
            table_name: "orders".to_string(),
            name: "log_insert".to_string(),
            comment: None,
            depends_on: vec![],
            definition: "CREATE RULE log_insert AS ON INSERT TO orders DO INSERT INTO audit_log DEFAULT VALUES"
                .to_string(),
        }
    }

    #[test]
    fn create_uses_definition_verbatim() {
        let op = RuleOperation::Create {
            rule: Box::new(rule()),
        };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.starts_with("CREATE RULE log_insert"));
        assert!(sql[0].sql.ends_with(';'));
    }

    #[test]
    fn replace_swaps_create_for_create_or_replace() {
        let op = RuleOperation::Replace {
            old_rule: Box::new(rule()),
            new_rule: Box::new(rule()),
        };
        let sql = op.to_sql();
        assert!(sql[0].sql.starts_with("CREATE OR REPLACE RULE log_insert"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = RuleOperation::Drop {
            identifier: RuleIdentifier {
                schema: "public".to_string(),
                table: "orders".to_string(),
                name: "log_insert".to_string(),
            },
        };
        assert!(op.is_destructive());
    }
}
