//! SQL rendering for event trigger operations

use crate::catalog::event_trigger::EventTrigger;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{CommentOperation, EventTriggerIdentifier, EventTriggerOperation};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};

impl SqlRenderer for EventTriggerOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            EventTriggerOperation::Create { trigger } => vec![render_create(trigger)],
            EventTriggerOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP EVENT TRIGGER {};",
                quote_ident(&identifier.name)
            ))],
            EventTriggerOperation::SetEnabled { identifier, enabled } => {
                let keyword = if *enabled { "ENABLE" } else { "DISABLE" };
                vec![RenderedSql::new(format!(
                    "ALTER EVENT TRIGGER {} {};",
                    quote_ident(&identifier.name),
                    keyword
                ))]
            }
            EventTriggerOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            EventTriggerOperation::Create { trigger } => DbObjectId::EventTrigger {
                name: trigger.name.clone(),
            },
            EventTriggerOperation::Drop { identifier }
            | EventTriggerOperation::SetEnabled { identifier, .. } => DbObjectId::EventTrigger {
                name: identifier.name.clone(),
            },
            EventTriggerOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::EventTrigger {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, EventTriggerOperation::Drop { .. })
    }
}

fn render_create(trigger: &EventTrigger) -> RenderedSql {
    // event names (ddl_command_start, etc.) are bare identifiers, not string literals
    let mut sql = format!(
        "CREATE EVENT TRIGGER {} ON {}",
        quote_ident(&trigger.name),
        trigger.event
    );
    if !trigger.tags.is_empty() {
        let tags: Vec<String> = trigger.tags.iter().map(|t| escape_string(t)).collect();
        sql.push_str(&format!(" WHEN TAG IN ({})", tags.join(", ")));
    }
    sql.push_str(&format!(
        " EXECUTE FUNCTION {}.{}();",
        quote_ident(&trigger.function_schema),
        quote_ident(&trigger.function_name)
    ));
    RenderedSql::new(sql)
}
