use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// Represents a PostgreSQL logical-replication subscription.
///
/// `conninfo` is read back verbatim from `pg_subscription.subconninfo`; it
/// may embed a password. Callers that render this into generated migration
/// SQL or persisted schema files are responsible for treating it as
/// sensitive (see project docs on connection-string handling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub name: String,
    pub conninfo: String,
    pub publications: Vec<String>,
    pub enabled: bool,
    pub slot_name: Option<String>,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Subscription {
    fn id(&self) -> DbObjectId {
        DbObjectId::Subscription {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Subscription {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all subscriptions visible to the connecting role (requires
/// superuser or the subscription owner; `pg_subscription` rows for
/// subscriptions owned by other roles are invisible otherwise).
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Subscription>> {
    info!("Fetching subscriptions...");
    let rows = sqlx::query!(
        r#"
        SELECT
            s.subname AS name,
            s.subconninfo AS conninfo,
            s.subpublications AS publications,
            s.subenabled AS enabled,
            s.subslotname AS "slot_name?",
            d.description AS "comment?"
        FROM pg_subscription s
        LEFT JOIN pg_description d ON d.objoid = s.oid AND d.objsubid = 0
        ORDER BY s.subname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Subscription {
            name: row.name,
            conninfo: row.conninfo,
            publications: row.publications,
            enabled: row.enabled,
            slot_name: row.slot_name,
            comment: row.comment,
            depends_on: Vec::new(),
        })
        .collect())
}
