//! Role membership operations

use crate::catalog::id::DbObjectId;
use crate::catalog::role_membership::RoleMembership;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMembershipIdentifier {
    pub role: String,
    pub member: String,
}

impl RoleMembershipIdentifier {
    pub fn db_object_id(&self) -> DbObjectId {
        DbObjectId::RoleMembership {
            role: self.role.clone(),
            member: self.member.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RoleMembershipOperation {
    Grant { membership: RoleMembership },
    Revoke { identifier: RoleMembershipIdentifier },
    /// `WITH ADMIN OPTION` flag changed on an otherwise unchanged membership.
    SetAdminOption {
        identifier: RoleMembershipIdentifier,
        admin_option: bool,
    },
}
