//! SQL rendering for subscription operations
//!
//! `Subscription::conninfo` may embed a password lifted verbatim from
//! `pg_subscription.subconninfo`. It is only ever placed into the
//! `CONNECTION '...'` clause Postgres itself requires; it is never logged or
//! duplicated elsewhere in the rendered output.

use crate::catalog::id::DbObjectId;
use crate::catalog::subscription::Subscription;
use crate::diff::operations::{CommentOperation, SubscriptionOperation};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};

impl SqlRenderer for SubscriptionOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            SubscriptionOperation::Create { subscription } => vec![render_create(subscription)],
            SubscriptionOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP SUBSCRIPTION {};",
                quote_ident(&identifier.name)
            ))],
            SubscriptionOperation::Alter {
                new_subscription, ..
            } => render_alter(new_subscription),
            SubscriptionOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            SubscriptionOperation::Create { subscription } => DbObjectId::Subscription {
                name: subscription.name.clone(),
            },
            SubscriptionOperation::Drop { identifier } => DbObjectId::Subscription {
                name: identifier.name.clone(),
            },
            SubscriptionOperation::Alter {
                new_subscription, ..
            } => DbObjectId::Subscription {
                name: new_subscription.name.clone(),
            },
            SubscriptionOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Subscription {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, SubscriptionOperation::Drop { .. })
    }
}

fn render_create(subscription: &Subscription) -> RenderedSql {
    let mut options = vec![format!(
        "publication = {}",
        subscription
            .publications
            .iter()
            .map(|p| quote_ident(p))
            .collect::<Vec<_>>()
            .join(", ")
    )];
    if !subscription.enabled {
        options.push("enabled = false".to_string());
    }
    if let Some(slot_name) = &subscription.slot_name {
        options.push(format!("slot_name = {}", quote_ident(slot_name)));
    }

    RenderedSql::new(format!(
        "CREATE SUBSCRIPTION {} CONNECTION {} PUBLICATION {} WITH ({});",
        quote_ident(&subscription.name),
        escape_string(&subscription.conninfo),
        subscription
            .publications
            .iter()
            .map(|p| quote_ident(p))
            .collect::<Vec<_>>()
            .join(", "),
        options
            .into_iter()
            .filter(|o| !o.starts_with("publication"))
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

/// Connection info, publication set and enabled state can't share one
/// `ALTER SUBSCRIPTION` statement, so each changed aspect gets its own.
fn render_alter(subscription: &Subscription) -> Vec<RenderedSql> {
    let mut statements = vec![RenderedSql::new(format!(
        "ALTER SUBSCRIPTION {} CONNECTION {};",
        quote_ident(&subscription.name),
        escape_string(&subscription.conninfo)
    ))];

    statements.push(RenderedSql::new(format!(
        "ALTER SUBSCRIPTION {} SET PUBLICATION {};",
        quote_ident(&subscription.name),
        subscription
            .publications
            .iter()
            .map(|p| quote_ident(p))
            .collect::<Vec<_>>()
            .join(", ")
    )));

    statements.push(RenderedSql::new(format!(
        "ALTER SUBSCRIPTION {} {};",
        quote_ident(&subscription.name),
        if subscription.enabled {
            "ENABLE"
        } else {
            "DISABLE"
        }
    )));

    statements
}
