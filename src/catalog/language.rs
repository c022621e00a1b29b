use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

/// Represents a PostgreSQL procedural language (`CREATE LANGUAGE`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub trusted: bool,
    pub handler: Option<String>,
    pub inline_handler: Option<String>,
    pub validator: Option<String>,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for Language {
    fn id(&self) -> DbObjectId {
        DbObjectId::Language {
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for Language {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

/// Fetch all non-built-in procedural languages.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Language>> {
    info!("Fetching languages...");
    let languages = sqlx::query!(
        r#"
        SELECT
            l.lanname AS name,
            l.lanpltrusted AS trusted,
            hproc.proname AS "handler?",
            iproc.proname AS "inline_handler?",
            vproc.proname AS "validator?",
            d.description AS "comment?"
        FROM pg_language l
        LEFT JOIN pg_proc hproc ON l.lanplcallfoid = hproc.oid
        LEFT JOIN pg_proc iproc ON l.laninline = iproc.oid
        LEFT JOIN pg_proc vproc ON l.lanvalidator = vproc.oid
        LEFT JOIN pg_description d ON d.objoid = l.oid AND d.objsubid = 0
        -- plpgsql ships with every cluster and is never user-managed
        WHERE l.lanispl
          AND l.lanname != 'plpgsql'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = l.oid AND dep.deptype = 'e'
          )
        ORDER BY l.lanname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(languages
        .into_iter()
        .map(|row| Language {
            name: row.name,
            trusted: row.trusted,
            handler: row.handler,
            inline_handler: row.inline_handler,
            validator: row.validator,
            comment: row.comment,
            depends_on: Vec::new(),
        })
        .collect())
}
