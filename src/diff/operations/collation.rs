//! Collation operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::collation::Collation;
use crate::catalog::id::DbObjectId;
use crate::render::quote_ident;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationIdentifier {
    pub schema: String,
    pub name: String,
}

impl CollationIdentifier {
    pub fn from_collation(collation: &Collation) -> Self {
        Self {
            schema: collation.schema.clone(),
            name: collation.name.clone(),
        }
    }
}

impl CommentTarget for CollationIdentifier {
    const OBJECT_TYPE: &'static str = "COLLATION";

    fn identifier(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Collation {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CollationOperation {
    Create { collation: Collation },
    Drop { identifier: CollationIdentifier },
    Comment(CommentOperation<CollationIdentifier>),
}
