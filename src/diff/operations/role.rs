//! Role operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIdentifier {
    pub name: String,
}

impl RoleIdentifier {
    pub fn from_role(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
        }
    }
}

impl CommentTarget for RoleIdentifier {
    const OBJECT_TYPE: &'static str = "ROLE";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Role {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RoleOperation {
    Create {
        role: Role,
    },
    Drop {
        identifier: RoleIdentifier,
    },
    /// One or more of the boolean attributes or the connection limit
    /// changed; rendered as a single `ALTER ROLE ... WITH ...`.
    Alter {
        old_role: Role,
        new_role: Role,
    },
    Comment(CommentOperation<RoleIdentifier>),
}
