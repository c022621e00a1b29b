use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// Represents a PostgreSQL event trigger (`CREATE EVENT TRIGGER`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTrigger {
    pub name: String,
    pub event: String,
    pub function_schema: String,
    pub function_name: String,
    pub tags: Vec<String>,
    pub enabled: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for EventTrigger {
    fn id(&self) -> DbObjectId {
        DbObjectId::EventTrigger {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for EventTrigger {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// `pg_event_trigger.evtenabled` maps 'O' (origin, the default) and 'A'
/// (always) to enabled; 'D' (disable) and 'R' (replica) are not exposed
/// through plain ENABLE/DISABLE and are folded into disabled here.
fn is_enabled(evtenabled: &str) -> bool {
    matches!(evtenabled, "O" | "A")
}

/// Fetch all event triggers.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<EventTrigger>> {
    info!("Fetching event triggers...");
    let triggers = sqlx::query!(
        r#"
        SELECT
            t.evtname AS name,
            t.evtevent AS event,
            n.nspname AS "function_schema!",
            p.proname AS "function_name!",
            t.evttags AS "tags?",
            t.evtenabled::text AS "evtenabled!",
            d.description AS "comment?"
        FROM pg_event_trigger t
        JOIN pg_proc p ON t.evtfoid = p.oid
        JOIN pg_namespace n ON p.pronamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = t.oid AND d.objsubid = 0
        ORDER BY t.evtname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(triggers
        .into_iter()
        .map(|row| {
            let depends_on = vec![DbObjectId::Function {
                schema: row.function_schema.clone(),
                name: row.function_name.clone(),
                arguments: String::new(),
            }];
            EventTrigger {
                name: row.name,
                event: row.event,
                function_schema: row.function_schema,
                function_name: row.function_name,
                tags: row.tags.unwrap_or_default(),
                enabled: is_enabled(&row.evtenabled),
                comment: row.comment,
                depends_on,
            }
        })
        .collect())
}
