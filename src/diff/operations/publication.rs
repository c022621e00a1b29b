//! Publication operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::publication::Publication;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationIdentifier {
    pub name: String,
}

impl PublicationIdentifier {
    pub fn from_publication(publication: &Publication) -> Self {
        Self {
            name: publication.name.clone(),
        }
    }
}

impl CommentTarget for PublicationIdentifier {
    const OBJECT_TYPE: &'static str = "PUBLICATION";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Publication {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PublicationOperation {
    Create {
        publication: Publication,
    },
    Drop {
        identifier: PublicationIdentifier,
    },
    /// Table membership or WITH-option change on an existing publication.
    Alter {
        old_publication: Publication,
        new_publication: Publication,
    },
    Comment(CommentOperation<PublicationIdentifier>),
}
