//! SQL rendering for collation operations

use crate::catalog::collation::Collation;
use crate::catalog::id::DbObjectId;
use crate::diff::operations::{CollationIdentifier, CollationOperation, CommentOperation};
use crate::render::{RenderedSql, SqlRenderer, escape_string, quote_ident};

impl SqlRenderer for CollationOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            CollationOperation::Create { collation } => vec![render_create(collation)],
            CollationOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP COLLATION {}.{};",
                quote_ident(&identifier.schema),
                quote_ident(&identifier.name)
            ))],
            CollationOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            CollationOperation::Create { collation } => DbObjectId::Collation {
                schema: collation.schema.clone(),
                name: collation.name.clone(),
            },
            CollationOperation::Drop { identifier } => DbObjectId::Collation {
                schema: identifier.schema.clone(),
                name: identifier.name.clone(),
            },
            CollationOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Collation {
                        schema: target.schema.clone(),
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, CollationOperation::Drop { .. })
    }
}

fn render_create(collation: &Collation) -> RenderedSql {
    let mut parts = vec![format!("PROVIDER = {}", collation.provider)];
    if let Some(locale) = &collation.locale {
        parts.push(format!("LOCALE = {}", escape_string(locale)));
    }
    if let Some(lc_collate) = &collation.lc_collate {
        parts.push(format!("LC_COLLATE = {}", escape_string(lc_collate)));
    }
    if let Some(lc_ctype) = &collation.lc_ctype {
        parts.push(format!("LC_CTYPE = {}", escape_string(lc_ctype)));
    }
    parts.push(format!("DETERMINISTIC = {}", collation.deterministic));

    RenderedSql::new(format!(
        "CREATE COLLATION {}.{} ({});",
        quote_ident(&collation.schema),
        quote_ident(&collation.name),
        parts.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::CollationIdentifier;

    fn collation() -> Collation {
        Collation {
            schema: "public".to_string(),
            name: "case_insensitive".to_string(),
            provider: "icu".to_string(),
            locale: Some("en-US".to_string()),
            lc_collate: None,
            lc_ctype: None,
            deterministic: false,
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_with_provider_and_locale() {
        let op = CollationOperation::Create { collation: collation() };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.contains("PROVIDER = icu"));
        assert!(sql[0].sql.contains("LOCALE = 'en-US'"));
        assert!(sql[0].sql.contains("DETERMINISTIC = false"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = CollationOperation::Drop {
            identifier: CollationIdentifier {
                schema: "public".to_string(),
                name: "case_insensitive".to_string(),
            },
        };
        assert!(op.is_destructive());
    }
}
