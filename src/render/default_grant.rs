//! SQL rendering for `ALTER DEFAULT PRIVILEGES` operations

use crate::catalog::default_grant::DefaultGrant;
use crate::catalog::grant::GranteeType;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::DefaultGrantOperation;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for DefaultGrantOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            DefaultGrantOperation::Grant { grant } => {
                vec![RenderedSql::new(render_statement(grant, "GRANT"))]
            }
            DefaultGrantOperation::Revoke { grant } => {
                vec![RenderedSql::new(render_statement(grant, "REVOKE"))]
            }
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            DefaultGrantOperation::Grant { grant } | DefaultGrantOperation::Revoke { grant } => {
                DbObjectId::DefaultGrant { id: grant.id() }
            }
        }
    }
}

fn grantee_sql(grantee: &GranteeType) -> String {
    match grantee {
        GranteeType::Role(name) => quote_ident(name),
        GranteeType::Public => "PUBLIC".to_string(),
    }
}

fn render_statement(grant: &DefaultGrant, verb: &str) -> String {
    let schema_clause = match &grant.schema {
        Some(schema) => format!(" IN SCHEMA {}", quote_ident(schema)),
        None => String::new(),
    };
    let privileges = grant.privileges.join(", ");
    let preposition = if verb == "GRANT" { "TO" } else { "FROM" };

    format!(
        "ALTER DEFAULT PRIVILEGES FOR ROLE {}{} {} {} ON {} {} {};",
        quote_ident(&grant.grantor),
        schema_clause,
        verb,
        privileges,
        grant.object_type.as_sql_keyword(),
        preposition,
        grantee_sql(&grant.grantee)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_grant::DefaultObjectType;

    fn grant() -> DefaultGrant {
        DefaultGrant {
            grantor: "app_owner".to_string(),
            grantee: GranteeType::Role("reporting".to_string()),
            schema: Some("public".to_string()),
            object_type: DefaultObjectType::Table,
            privileges: vec!["SELECT".to_string()],
            depends_on: vec![],
        }
    }

    #[test]
    fn grant_renders_in_schema_clause() {
        let op = DefaultGrantOperation::Grant { grant: grant() };
        let sql = op.to_sql();
        assert_eq!(
            sql[0].sql,
            "ALTER DEFAULT PRIVILEGES FOR ROLE \"app_owner\" IN SCHEMA \"public\" GRANT SELECT ON TABLES TO \"reporting\";"
        );
    }

    #[test]
    fn revoke_uses_from_preposition() {
        let op = DefaultGrantOperation::Revoke { grant: grant() };
        let sql = op.to_sql();
        assert!(sql[0].sql.contains("REVOKE SELECT ON TABLES FROM \"reporting\";"));
    }

    #[test]
    fn database_wide_default_omits_schema_clause() {
        let mut g = grant();
        g.schema = None;
        let op = DefaultGrantOperation::Grant { grant: g };
        let sql = op.to_sql();
        assert!(!sql[0].sql.contains("IN SCHEMA"));
    }
}
