use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::grant::GranteeType;
use crate::catalog::id::{DbObjectId, DependsOn};

/// A column-level privilege grant (`GRANT SELECT (col) ON table TO role`).
///
/// PostgreSQL tracks these via `pg_attribute.attacl`, separately from the
/// table-level ACL on `pg_class.relacl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGrant {
    pub grantee: GranteeType,
    pub schema: String,
    pub table: String,
    pub column: String,
    pub privileges: Vec<String>,
    pub with_grant_option: bool,
    pub depends_on: Vec<DbObjectId>,
}

impl ColumnGrant {
    pub fn id(&self) -> String {
        let grantee_str = match &self.grantee {
            GranteeType::Role(name) => name.clone(),
            GranteeType::Public => "public".to_string(),
        };
        format!(
            "{}@column:{}.{}.{}",
            grantee_str, self.schema, self.table, self.column
        )
    }
}

impl DependsOn for ColumnGrant {
    fn id(&self) -> DbObjectId {
        DbObjectId::ColumnGrant { id: self.id() }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

/// Fetch all column-level privilege grants on tables and views.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<ColumnGrant>> {
    info!("Fetching column-level grants...");
    let rows = sqlx::query!(
        r#"
        SELECT
            n.nspname AS "schema_name!",
            c.relname AS "table_name!",
            a.attname AS "column_name!",
            CASE
                WHEN acl.grantee = 0 THEN 'PUBLIC'
                ELSE r.rolname
            END AS "grantee!",
            acl.privilege_type AS "privilege_type!",
            CASE WHEN acl.is_grantable THEN 'YES' ELSE 'NO' END AS "is_grantable!"
        FROM pg_attribute a
        JOIN pg_class c ON a.attrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid,
        LATERAL aclexplode(a.attacl) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND c.relkind IN ('r', 'v', 'm')
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND a.attacl IS NOT NULL
        ORDER BY n.nspname, c.relname, a.attname,
                 CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END, acl.privilege_type
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result: Vec<ColumnGrant> = Vec::new();

    for row in rows {
        let grantee = if row.grantee == "PUBLIC" {
            GranteeType::Public
        } else {
            GranteeType::Role(row.grantee.clone())
        };
        let with_grant_option = row.is_grantable == "YES";

        match result.last_mut() {
            Some(grant)
                if grant.grantee == grantee
                    && grant.schema == row.schema_name
                    && grant.table == row.table_name
                    && grant.column == row.column_name
                    && grant.with_grant_option == with_grant_option =>
            {
                grant.privileges.push(row.privilege_type);
            }
            _ => {
                let depends_on = vec![DbObjectId::Column {
                    schema: row.schema_name.clone(),
                    table: row.table_name.clone(),
                    column: row.column_name.clone(),
                }];
                result.push(ColumnGrant {
                    grantee,
                    schema: row.schema_name,
                    table: row.table_name,
                    column: row.column_name,
                    privileges: vec![row.privilege_type],
                    with_grant_option,
                    depends_on,
                });
            }
        }
    }

    Ok(result)
}
