//! Rewrite rule operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::rule::Rule;
use crate::render::quote_ident;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIdentifier {
    pub schema: String,
    pub table: String,
    pub name: String,
}

impl RuleIdentifier {
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            schema: rule.schema.clone(),
            table: rule.table_name.clone(),
            name: rule.name.clone(),
        }
    }
}

impl CommentTarget for RuleIdentifier {
    const OBJECT_TYPE: &'static str = "RULE";

    fn identifier(&self) -> String {
        format!(
            "\"{}\" ON {}.{}",
            self.name,
            quote_ident(&self.schema),
            quote_ident(&self.table)
        )
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Rule {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RuleOperation {
    Create {
        rule: Box<Rule>,
    },
    Drop {
        identifier: RuleIdentifier,
    },
    Replace {
        old_rule: Box<Rule>,
        new_rule: Box<Rule>,
    },
    Comment(CommentOperation<RuleIdentifier>),
}

impl RuleOperation {
    pub fn operation_kind(&self) -> super::OperationKind {
        match self {
            Self::Create { .. } => super::OperationKind::Create,
            Self::Drop { .. } => super::OperationKind::Drop,
            Self::Replace { .. } => super::OperationKind::Replace,
            Self::Comment(_) => super::OperationKind::Alter,
        }
    }
}
