//! SQL rendering for role operations

use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;
use crate::diff::operations::{CommentOperation, RoleOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for RoleOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RoleOperation::Create { role } => vec![render_create_role(role)],
            RoleOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP ROLE {};",
                quote_ident(&identifier.name)
            ))],
            RoleOperation::Alter { new_role, .. } => vec![render_alter_role(new_role)],
            RoleOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            RoleOperation::Create { role } => DbObjectId::Role {
                name: role.name.clone(),
            },
            RoleOperation::Drop { identifier } => DbObjectId::Role {
                name: identifier.name.clone(),
            },
            RoleOperation::Alter { new_role, .. } => DbObjectId::Role {
                name: new_role.name.clone(),
            },
            RoleOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Role {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, RoleOperation::Drop { .. })
    }
}

fn role_attributes_clause(role: &Role) -> String {
    let mut parts = Vec::new();
    parts.push(if role.superuser {
        "SUPERUSER"
    } else {
        "NOSUPERUSER"
    });
    parts.push(if role.createdb {
        "CREATEDB"
    } else {
        "NOCREATEDB"
    });
    parts.push(if role.createrole {
        "CREATEROLE"
    } else {
        "NOCREATEROLE"
    });
    parts.push(if role.login { "LOGIN" } else { "NOLOGIN" });
    parts.push(if role.replication {
        "REPLICATION"
    } else {
        "NOREPLICATION"
    });
    parts.push(if role.bypassrls {
        "BYPASSRLS"
    } else {
        "NOBYPASSRLS"
    });

    let mut clause = parts.join(" ");
    clause.push_str(&format!(" CONNECTION LIMIT {}", role.connection_limit));
    clause
}

fn render_create_role(role: &Role) -> RenderedSql {
    RenderedSql::new(format!(
        "CREATE ROLE {} WITH {};",
        quote_ident(&role.name),
        role_attributes_clause(role)
    ))
}

fn render_alter_role(role: &Role) -> RenderedSql {
    RenderedSql::new(format!(
        "ALTER ROLE {} WITH {};",
        quote_ident(&role.name),
        role_attributes_clause(role)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::RoleIdentifier;

    fn role(name: &str) -> Role {
        Role {
            name: name.to_string(),
            superuser: false,
            createdb: true,
            createrole: false,
            login: true,
            replication: false,
            bypassrls: false,
            connection_limit: 5,
            comment: None,
        }
    }

    #[test]
    fn create_includes_attributes() {
        let op = RoleOperation::Create { role: role("app") };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.contains("CREATE ROLE \"app\""));
        assert!(sql[0].sql.contains("CREATEDB"));
        assert!(sql[0].sql.contains("CONNECTION LIMIT 5"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = RoleOperation::Drop {
            identifier: RoleIdentifier {
                name: "app".to_string(),
            },
        };
        assert!(op.is_destructive());
        assert!(op.to_sql()[0].sql.starts_with("DROP ROLE"));
    }

    #[test]
    fn alter_uses_new_attributes() {
        let old_role = role("app");
        let mut new_role = role("app");
        new_role.superuser = true;
        let op = RoleOperation::Alter {
            old_role,
            new_role: new_role.clone(),
        };
        let sql = op.to_sql();
        assert!(sql[0].sql.contains("ALTER ROLE \"app\""));
        assert!(sql[0].sql.contains("SUPERUSER"));
    }
}
