use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::utils::is_system_schema;
use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// Represents a PostgreSQL query rewrite rule (`CREATE RULE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub schema: String,
    pub table_name: String,
    pub name: String,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,

    /// Complete rule definition from pg_get_ruledef(), authoritative for
    /// recreation.
    pub definition: String,
}

impl DependsOn for Rule {
    fn id(&self) -> DbObjectId {
        DbObjectId::Rule {
            schema: self.schema.clone(),
            table: self.table_name.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Rule {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all user-defined rewrite rules. PostgreSQL auto-creates a `_RETURN`
/// rule for every view; those are covered by the `View` kind and excluded
/// here.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Rule>> {
    info!("Fetching rules...");
    let rows = sqlx::query!(
        r#"
        SELECT
            n.nspname AS "schema!",
            c.relname AS "table_name!",
            r.rulename AS "name!",
            d.description AS "comment?",
            pg_get_ruledef(r.oid) AS "definition!"
        FROM pg_rewrite r
        JOIN pg_class c ON r.ev_class = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = r.oid AND d.objsubid = 0
        WHERE r.rulename != '_RETURN'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = r.oid AND dep.classid = 'pg_rewrite'::regclass AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname, r.rulename
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .filter(|row| !is_system_schema(&row.schema))
        .map(|row| {
            let depends_on = vec![DbObjectId::Table {
                schema: row.schema.clone(),
                name: row.table_name.clone(),
            }];
            Rule {
                schema: row.schema,
                table_name: row.table_name,
                name: row.name,
                comment: row.comment,
                depends_on,
                definition: row.definition,
            }
        })
        .collect())
}
