//! SQL rendering for trigger operations

use crate::catalog::id::DbObjectId;
use crate::catalog::triggers::Trigger;
use crate::diff::operations::{CommentOperation, TriggerIdentifier, TriggerOperation};
use crate::render::{RenderedSql, SqlRenderer};

impl SqlRenderer for TriggerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            TriggerOperation::Create { trigger } => vec![render_create_trigger(trigger)],
            TriggerOperation::Drop { identifier } => vec![render_drop_trigger(identifier)],
            TriggerOperation::Replace { new_trigger, .. } => {
                // pg_get_triggerdef() always emits CREATE TRIGGER, never CREATE OR REPLACE,
                // so a replace is a drop followed by a recreate.
                vec![
                    render_drop_trigger(&TriggerIdentifier::from_trigger(new_trigger)),
                    render_create_trigger(new_trigger),
                ]
            }
            TriggerOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            TriggerOperation::Create { trigger } => DbObjectId::Trigger {
                schema: trigger.schema.clone(),
                table: trigger.table_name.clone(),
                name: trigger.name.clone(),
            },
            TriggerOperation::Drop { identifier } => DbObjectId::Trigger {
                schema: identifier.schema.clone(),
                table: identifier.table.clone(),
                name: identifier.name.clone(),
            },
            TriggerOperation::Replace { new_trigger, .. } => DbObjectId::Trigger {
                schema: new_trigger.schema.clone(),
                table: new_trigger.table_name.clone(),
                name: new_trigger.name.clone(),
            },
            TriggerOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Trigger {
                        schema: target.schema.clone(),
                        table: target.table.clone(),
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, TriggerOperation::Replace { .. })
    }
}

fn render_create_trigger(trigger: &Trigger) -> RenderedSql {
    // pg_get_triggerdef() already produces a complete, schema-qualified CREATE TRIGGER
    // statement, so we use it verbatim rather than reassembling one from the parts.
    RenderedSql::new(format!("{};", trigger.definition.trim_end_matches(';')))
}

fn render_drop_trigger(identifier: &TriggerIdentifier) -> RenderedSql {
    let sql = format!(
        "DROP TRIGGER \"{}\" ON \"{}\".\"{}\";",
        identifier.name, identifier.schema, identifier.table
    );
    RenderedSql::destructive(sql)
}
