use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// Represents a PostgreSQL collation (`CREATE COLLATION`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collation {
    pub schema: String,
    pub name: String,
    pub provider: String,
    pub locale: Option<String>,
    pub lc_collate: Option<String>,
    pub lc_ctype: Option<String>,
    pub deterministic: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Collation {
    fn id(&self) -> DbObjectId {
        DbObjectId::Collation {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Collation {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all non-system, non-extension collations.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Collation>> {
    info!("Fetching collations...");
    let collations = sqlx::query!(
        r#"
        SELECT
            n.nspname AS schema,
            c.collname AS name,
            CASE c.collprovider
                WHEN 'i' THEN 'icu'
                WHEN 'c' THEN 'libc'
                WHEN 'b' THEN 'builtin'
                ELSE 'libc'
            END AS "provider!",
            c.colliculocale AS "locale?",
            c.collcollate AS "lc_collate?",
            c.collctype AS "lc_ctype?",
            c.collisdeterministic AS deterministic,
            d.description AS "comment?"
        FROM pg_collation c
        JOIN pg_namespace n ON c.collnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = c.oid AND d.objsubid = 0
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = c.oid AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.collname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in collations {
        let depends_on = vec![DbObjectId::Schema {
            name: row.schema.clone(),
        }];
        result.push(Collation {
            schema: row.schema,
            name: row.name,
            provider: row.provider,
            locale: row.locale,
            lc_collate: row.lc_collate,
            lc_ctype: row.lc_ctype,
            deterministic: row.deterministic,
            comment: row.comment,
            depends_on,
        });
    }

    Ok(result)
}
