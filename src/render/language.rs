//! SQL rendering for procedural language operations

use crate::catalog::id::DbObjectId;
use crate::catalog::language::Language;
use crate::diff::operations::{CommentOperation, LanguageIdentifier, LanguageOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for LanguageOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            LanguageOperation::Create { language } => vec![render_create(language)],
            LanguageOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP LANGUAGE {};",
                quote_ident(&identifier.name)
            ))],
            LanguageOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            LanguageOperation::Create { language } => DbObjectId::Language {
                name: language.name.clone(),
            },
            LanguageOperation::Drop { identifier } => DbObjectId::Language {
                name: identifier.name.clone(),
            },
            LanguageOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Language {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, LanguageOperation::Drop { .. })
    }
}

fn render_create(language: &Language) -> RenderedSql {
    let trusted = if language.trusted { "TRUSTED " } else { "" };
    let mut sql = format!("CREATE {}LANGUAGE {}", trusted, quote_ident(&language.name));
    if let Some(handler) = &language.handler {
        sql.push_str(&format!(" HANDLER {}", quote_ident(handler)));
    }
    if let Some(inline_handler) = &language.inline_handler {
        sql.push_str(&format!(" INLINE {}", quote_ident(inline_handler)));
    }
    if let Some(validator) = &language.validator {
        sql.push_str(&format!(" VALIDATOR {}", quote_ident(validator)));
    }
    sql.push(';');
    RenderedSql::new(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::LanguageIdentifier;

    fn language() -> Language {
        Language {
            name: "plpython3u".to_string(),
            trusted: true,
            handler: Some("plpython3_call_handler".to_string()),
            inline_handler: Some("plpython3_inline_handler".to_string()),
            validator: Some("plpython3_validator".to_string()),
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_trusted_with_handlers() {
        let op = LanguageOperation::Create { language: language() };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.starts_with("CREATE TRUSTED LANGUAGE"));
        assert!(sql[0].sql.contains("HANDLER"));
        assert!(sql[0].sql.contains("INLINE"));
        assert!(sql[0].sql.contains("VALIDATOR"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = LanguageOperation::Drop {
            identifier: LanguageIdentifier {
                name: "plpython3u".to_string(),
            },
        };
        assert!(op.is_destructive());
    }
}
