//! Diff role memberships: `GRANT role TO member`

use crate::catalog::role_membership::RoleMembership;
use crate::diff::operations::{MigrationStep, RoleMembershipIdentifier, RoleMembershipOperation};

pub fn diff(old: Option<&RoleMembership>, new: Option<&RoleMembership>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => vec![MigrationStep::RoleMembership(
            RoleMembershipOperation::Grant {
                membership: n.clone(),
            },
        )],
        (Some(o), None) => vec![MigrationStep::RoleMembership(
            RoleMembershipOperation::Revoke {
                identifier: RoleMembershipIdentifier {
                    role: o.role.clone(),
                    member: o.member.clone(),
                },
            },
        )],
        (Some(o), Some(n)) => {
            if o.admin_option != n.admin_option {
                vec![MigrationStep::RoleMembership(
                    RoleMembershipOperation::SetAdminOption {
                        identifier: RoleMembershipIdentifier {
                            role: n.role.clone(),
                            member: n.member.clone(),
                        },
                        admin_option: n.admin_option,
                    },
                )]
            } else {
                Vec::new()
            }
        }
        (None, None) => Vec::new(),
    }
}
