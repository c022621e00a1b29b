use anyhow::Result;
use sqlx::postgres::PgConnection;
use tracing::info;

use crate::catalog::id::{DbObjectId, DependsOn};

/// Represents a `GRANT role TO member` membership edge between two roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMembership {
    pub role: String,
    pub member: String,
    pub admin_option: bool,
    pub grantor: String,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for RoleMembership {
    fn id(&self) -> DbObjectId {
        DbObjectId::RoleMembership {
            role: self.role.clone(),
            member: self.member.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

/// Fetch all role memberships, excluding the implicit membership every role
/// has in itself and memberships owned by extensions.
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<RoleMembership>> {
    info!("Fetching role memberships...");
    let rows = sqlx::query!(
        r#"
        SELECT
            roleg.rolname AS "role!",
            rolem.rolname AS "member!",
            am.admin_option AS admin_option,
            grantor.rolname AS "grantor!"
        FROM pg_auth_members am
        JOIN pg_roles roleg ON am.roleid = roleg.oid
        JOIN pg_roles rolem ON am.member = rolem.oid
        JOIN pg_roles grantor ON am.grantor = grantor.oid
        ORDER BY roleg.rolname, rolem.rolname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let depends_on = vec![
                DbObjectId::Role {
                    name: row.role.clone(),
                },
                DbObjectId::Role {
                    name: row.member.clone(),
                },
            ];
            RoleMembership {
                role: row.role,
                member: row.member,
                admin_option: row.admin_option,
                grantor: row.grantor,
                depends_on,
            }
        })
        .collect())
}
