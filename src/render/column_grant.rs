//! SQL rendering for column-level grant operations

use crate::catalog::column_grant::ColumnGrant;
use crate::catalog::grant::GranteeType;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::ColumnGrantOperation;
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for ColumnGrantOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            ColumnGrantOperation::Grant { grant } => vec![RenderedSql::new(render_grant(grant))],
            ColumnGrantOperation::Revoke { grant } => {
                vec![RenderedSql::new(render_revoke(grant))]
            }
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            ColumnGrantOperation::Grant { grant } | ColumnGrantOperation::Revoke { grant } => {
                DbObjectId::ColumnGrant { id: grant.id() }
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

fn render_grant(grant: &ColumnGrant) -> String {
    let grant_option = if grant.with_grant_option {
        " WITH GRANT OPTION"
    } else {
        ""
    };
    format!(
        "GRANT {} ({}) ON {}.{} TO {}{};",
        grant.privileges.join(", "),
        quote_ident(&grant.column),
        quote_ident(&grant.schema),
        quote_ident(&grant.table),
        grantee_sql(&grant.grantee),
        grant_option
    )
}

fn render_revoke(grant: &ColumnGrant) -> String {
    format!(
        "REVOKE {} ({}) ON {}.{} FROM {};",
        grant.privileges.join(", "),
        quote_ident(&grant.column),
        quote_ident(&grant.schema),
        quote_ident(&grant.table),
        grantee_sql(&grant.grantee)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant() -> ColumnGrant {
        ColumnGrant {
            grantee: GranteeType::Role("reporting".to_string()),
            schema: "public".to_string(),
            table: "orders".to_string(),
            column: "total".to_string(),
            privileges: vec!["SELECT".to_string()],
            with_grant_option: false,
            depends_on: vec![],
        }
    }

    #[test]
    fn grant_renders_column_clause() {
        let op = ColumnGrantOperation::Grant { grant: grant() };
        let sql = op.to_sql();
        assert_eq!(
            sql[0].sql,
            "GRANT SELECT (\"total\") ON \"public\".\"orders\" TO \"reporting\";"
        );
    }

    #[test]
    fn revoke_renders_column_clause() {
        let op = ColumnGrantOperation::Revoke { grant: grant() };
        let sql = op.to_sql();
        assert_eq!(
            sql[0].sql,
            "REVOKE SELECT (\"total\") ON \"public\".\"orders\" FROM \"reporting\";"
        );
    }

    #[test]
    fn grant_to_public() {
        let mut g = grant();
        g.grantee = GranteeType::Public;
        let op = ColumnGrantOperation::Grant { grant: g };
        assert!(op.to_sql()[0].sql.contains("TO PUBLIC"));
    }
}
