use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// A single table published by a `CREATE PUBLICATION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationTable {
    pub schema: String,
    pub name: String,
}

/// Represents a PostgreSQL logical-replication publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub name: String,
    pub all_tables: bool,
    pub tables: Vec<PublicationTable>,
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
    pub truncate: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Publication {
    fn id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Publication {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all publications and their member tables.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Publication>> {
    info!("Fetching publications...");
    let rows = sqlx::query!(
        r#"
        SELECT
            p.oid AS "oid!",
            p.pubname AS name,
            p.puballtables AS all_tables,
            p.pubinsert AS insert,
            p.pubupdate AS update,
            p.pubdelete AS delete,
            p.pubtruncate AS truncate,
            d.description AS "comment?"
        FROM pg_publication p
        LEFT JOIN pg_description d ON d.objoid = p.oid AND d.objsubid = 0
        ORDER BY p.pubname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in rows {
        let tables = sqlx::query!(
            r#"
            SELECT n.nspname AS "schema!", c.relname AS "name!"
            FROM pg_publication_rel pr
            JOIN pg_class c ON pr.prrelid = c.oid
            JOIN pg_namespace n ON c.relnamespace = n.oid
            WHERE pr.prpubid = $1
            ORDER BY n.nspname, c.relname
            "#,
            row.oid
        )
        .fetch_all(&mut *conn)
        .await?;

        let table_entries: Vec<PublicationTable> = tables
            .into_iter()
            .map(|t| PublicationTable {
                schema: t.schema,
                name: t.name,
            })
            .collect();

        let depends_on = table_entries
            .iter()
            .map(|t| DbObjectId::Table {
                schema: t.schema.clone(),
                name: t.name.clone(),
            })
            .collect();

        result.push(Publication {
            name: row.name,
            all_tables: row.all_tables,
            tables: table_entries,
            insert: row.insert,
            update: row.update,
            delete: row.delete,
            truncate: row.truncate,
            comment: row.comment,
            depends_on,
        });
    }

    Ok(result)
}
