//! Materialized view operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::materialized_view::MaterializedView;
use crate::render::quote_ident;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedViewIdentifier {
    pub schema: String,
    pub name: String,
}

impl MaterializedViewIdentifier {
    pub fn from_view(view: &MaterializedView) -> Self {
        Self {
            schema: view.schema.clone(),
            name: view.name.clone(),
        }
    }
}

impl CommentTarget for MaterializedViewIdentifier {
    const OBJECT_TYPE: &'static str = "MATERIALIZED VIEW";

    fn identifier(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::MaterializedView {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum MaterializedViewOperation {
    Create {
        view: Box<MaterializedView>,
    },
    Drop {
        identifier: MaterializedViewIdentifier,
    },
    /// Materialized views have no `CREATE OR REPLACE`; a definition change
    /// is always a drop followed by a recreate.
    Replace {
        old_view: Box<MaterializedView>,
        new_view: Box<MaterializedView>,
    },
    Comment(CommentOperation<MaterializedViewIdentifier>),
}

impl MaterializedViewOperation {
    pub fn operation_kind(&self) -> super::OperationKind {
        match self {
            Self::Create { .. } => super::OperationKind::Create,
            Self::Drop { .. } => super::OperationKind::Drop,
            Self::Replace { .. } => super::OperationKind::Alter,
            Self::Comment(_) => super::OperationKind::Alter,
        }
    }
}
