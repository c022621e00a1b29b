//! Database roles (`pg_roles`). Roles are database-wide, not schema-scoped,
//! and have no dependencies of their own within this catalog — role
//! memberships (`role_membership.rs`) and object ownership reference them.

use super::comments::Commentable;
use super::id::{DbObjectId, DependsOn};
use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub superuser: bool,
    pub createdb: bool,
    pub createrole: bool,
    pub login: bool,
    pub replication: bool,
    pub bypassrls: bool,
    pub connection_limit: i32,
    pub comment: Option<String>,
}

impl DependsOn for Role {
    fn id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &[]
    }
}

impl Commentable for Role {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all roles except PostgreSQL's built-in `pg_*` predefined roles.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Role>> {
    info!("Fetching roles...");
    let rows = sqlx::query!(
        r#"
        SELECT
            r.rolname AS "name!",
            r.rolsuper AS "superuser!",
            r.rolcreatedb AS "createdb!",
            r.rolcreaterole AS "createrole!",
            r.rolcanlogin AS "login!",
            r.rolreplication AS "replication!",
            r.rolbypassrls AS "bypassrls!",
            r.rolconnlimit AS "connection_limit!",
            d.description AS "comment?"
        FROM pg_roles r
        LEFT JOIN pg_shdescription d ON d.objoid = r.oid
        WHERE r.rolname NOT LIKE 'pg\_%'
        ORDER BY r.rolname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Role {
            name: row.name,
            superuser: row.superuser,
            createdb: row.createdb,
            createrole: row.createrole,
            login: row.login,
            replication: row.replication,
            bypassrls: row.bypassrls,
            connection_limit: row.connection_limit,
            comment: row.comment,
        })
        .collect())
}
