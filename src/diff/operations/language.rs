//! Language operations

use super::{CommentOperation, CommentTarget};
use crate::catalog::id::DbObjectId;
use crate::catalog::language::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageIdentifier {
    pub name: String,
}

impl LanguageIdentifier {
    pub fn from_language(language: &Language) -> Self {
        Self {
            name: language.name.clone(),
        }
    }
}

impl CommentTarget for LanguageIdentifier {
    const OBJECT_TYPE: &'static str = "LANGUAGE";

    fn identifier(&self) -> String {
        format!("\"{}\"", self.name)
    }

    fn db_object_id(&self) -> DbObjectId {
        DbObjectId::Language {
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LanguageOperation {
    Create { language: Language },
    Drop { identifier: LanguageIdentifier },
    Comment(CommentOperation<LanguageIdentifier>),
}
