use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::grant::GranteeType;
use crate::catalog::id::{DbObjectId, DependsOn};

/// Kind of object an `ALTER DEFAULT PRIVILEGES` entry applies to, mirroring
/// `pg_default_acl.defaclobjtype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultObjectType {
    Table,
    Sequence,
    Function,
    Type,
    Schema,
}

impl DefaultObjectType {
    fn from_defaclobjtype(c: &str) -> Self {
        match c {
            "r" => DefaultObjectType::Table,
            "S" => DefaultObjectType::Sequence,
            "f" => DefaultObjectType::Function,
            "T" => DefaultObjectType::Type,
            "n" => DefaultObjectType::Schema,
            other => panic!("unknown pg_default_acl.defaclobjtype: {other}"),
        }
    }

    /// The plural keyword used after `GRANT ... ON` in an `ALTER DEFAULT
    /// PRIVILEGES` statement.
    pub fn as_sql_keyword(&self) -> &'static str {
        match self {
            DefaultObjectType::Table => "TABLES",
            DefaultObjectType::Sequence => "SEQUENCES",
            DefaultObjectType::Function => "FUNCTIONS",
            DefaultObjectType::Type => "TYPES",
            DefaultObjectType::Schema => "SCHEMAS",
        }
    }
}

/// A default-privilege entry: the set of privileges automatically granted
/// to `grantee` on future objects of `object_type` created by `grantor`,
/// optionally scoped to a single `schema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultGrant {
    pub grantor: String,
    pub grantee: GranteeType,
    pub schema: Option<String>,
    pub object_type: DefaultObjectType,
    pub privileges: Vec<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DefaultGrant {
    pub fn id(&self) -> String {
        let grantee_str = match &self.grantee {
            GranteeType::Role(name) => name.clone(),
            GranteeType::Public => "public".to_string(),
        };
        let scope = self.schema.clone().unwrap_or_else(|| "*".to_string());
        format!(
            "{}@{}@default:{}.{}",
            self.grantor,
            grantee_str,
            scope,
            self.object_type.as_sql_keyword()
        )
    }
}

impl DependsOn for DefaultGrant {
    fn id(&self) -> DbObjectId {
        DbObjectId::DefaultGrant { id: self.id() }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

/// Fetch all `ALTER DEFAULT PRIVILEGES` entries from `pg_default_acl`.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<DefaultGrant>> {
    info!("Fetching default privileges...");
    let rows = sqlx::query!(
        r#"
        SELECT
            grantor.rolname AS "grantor!",
            n.nspname AS "schema_name?",
            da.defaclobjtype::text AS "objtype!",
            CASE
                WHEN acl.grantee = 0 THEN 'PUBLIC'
                ELSE r.rolname
            END AS "grantee!",
            acl.privilege_type AS "privilege_type!"
        FROM pg_default_acl da
        JOIN pg_roles grantor ON da.defaclrole = grantor.oid
        LEFT JOIN pg_namespace n ON da.defaclnamespace = n.oid,
        LATERAL aclexplode(da.defaclacl) AS acl
        LEFT JOIN pg_roles r ON r.oid = acl.grantee
        ORDER BY grantor.rolname, n.nspname, da.defaclobjtype,
                 CASE WHEN acl.grantee = 0 THEN 'PUBLIC' ELSE r.rolname END, acl.privilege_type
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result: Vec<DefaultGrant> = Vec::new();

    for row in rows {
        let grantee = if row.grantee == "PUBLIC" {
            GranteeType::Public
        } else {
            GranteeType::Role(row.grantee.clone())
        };
        let object_type = DefaultObjectType::from_defaclobjtype(&row.objtype);

        match result.last_mut() {
            Some(grant)
                if grant.grantor == row.grantor
                    && grant.grantee == grantee
                    && grant.schema == row.schema_name
                    && grant.object_type == object_type =>
            {
                grant.privileges.push(row.privilege_type);
            }
            _ => {
                let mut depends_on = Vec::new();
                if let Some(schema) = &row.schema_name {
                    depends_on.push(DbObjectId::Schema {
                        name: schema.clone(),
                    });
                }
                result.push(DefaultGrant {
                    grantor: row.grantor,
                    grantee,
                    schema: row.schema_name,
                    object_type,
                    privileges: vec![row.privilege_type],
                    depends_on,
                });
            }
        }
    }

    Ok(result)
}
