//! SQL rendering for role membership operations

use crate::catalog::id::DbObjectId;
use crate::diff::operations::{RoleMembershipIdentifier, RoleMembershipOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for RoleMembershipOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            RoleMembershipOperation::Grant { membership } => {
                let mut sql = format!(
                    "GRANT {} TO {}",
                    quote_ident(&membership.role),
                    quote_ident(&membership.member)
                );
                if membership.admin_option {
                    sql.push_str(" WITH ADMIN OPTION");
                }
                sql.push(';');
                vec![RenderedSql::new(sql)]
            }
            RoleMembershipOperation::Revoke { identifier } => {
                vec![RenderedSql::new(format!(
                    "REVOKE {} FROM {};",
                    quote_ident(&identifier.role),
                    quote_ident(&identifier.member)
                ))]
            }
            RoleMembershipOperation::SetAdminOption {
                identifier,
                admin_option,
            } => {
                let keyword = if *admin_option { "GRANT" } else { "REVOKE" };
                let sql = if *admin_option {
                    format!(
                        "GRANT {} TO {} WITH ADMIN OPTION;",
                        quote_ident(&identifier.role),
                        quote_ident(&identifier.member)
                    )
                } else {
                    format!(
                        "REVOKE ADMIN OPTION FOR {} FROM {};",
                        quote_ident(&identifier.role),
                        quote_ident(&identifier.member)
                    )
                };
                let _ = keyword;
                vec![RenderedSql::new(sql)]
            }
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            RoleMembershipOperation::Grant { membership } => DbObjectId::RoleMembership {
                role: membership.role.clone(),
                member: membership.member.clone(),
            },
            RoleMembershipOperation::Revoke { identifier } => identifier.db_object_id(),
            RoleMembershipOperation::SetAdminOption { identifier, .. } => identifier.db_object_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::role_membership::RoleMembership;

    #[test]
    fn grant_with_admin_option() {
        let op = RoleMembershipOperation::Grant {
            membership: RoleMembership {
                role: "admins".to_string(),
                member: "alice".to_string(),
                admin_option: true,
                grantor: "postgres".to_string(),
                depends_on: vec![],
            },
        };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.contains("WITH ADMIN OPTION"));
    }

    #[test]
    fn revoke_admin_option_only() {
        let op = RoleMembershipOperation::SetAdminOption {
            identifier: RoleMembershipIdentifier {
                role: "admins".to_string(),
                member: "alice".to_string(),
            },
            admin_option: false,
        };
        let sql = op.to_sql();
        assert!(sql[0].sql.contains("REVOKE ADMIN OPTION FOR"));
    }
}
