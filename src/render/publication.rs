//! SQL rendering for publication operations

use crate::catalog::id::DbObjectId;
use crate::catalog::publication::Publication;
use crate::diff::operations::{CommentOperation, PublicationIdentifier, PublicationOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for PublicationOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            PublicationOperation::Create { publication } => vec![render_create(publication)],
            PublicationOperation::Drop { identifier } => vec![RenderedSql::destructive(format!(
                "DROP PUBLICATION {};",
                quote_ident(&identifier.name)
            ))],
            PublicationOperation::Alter {
                new_publication, ..
            } => render_alter(new_publication),
            PublicationOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            PublicationOperation::Create { publication } => DbObjectId::Publication {
                name: publication.name.clone(),
            },
            PublicationOperation::Drop { identifier } => DbObjectId::Publication {
                name: identifier.name.clone(),
            },
            PublicationOperation::Alter {
                new_publication, ..
            } => DbObjectId::Publication {
                name: new_publication.name.clone(),
            },
            PublicationOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::Publication {
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(self, PublicationOperation::Drop { .. })
    }
}

fn publication_target_clause(publication: &Publication) -> String {
    if publication.all_tables {
        "FOR ALL TABLES".to_string()
    } else if publication.tables.is_empty() {
        String::new()
    } else {
        let tables: Vec<String> = publication
            .tables
            .iter()
            .map(|t| format!("{}.{}", quote_ident(&t.schema), quote_ident(&t.name)))
            .collect();
        format!("FOR TABLE {}", tables.join(", "))
    }
}

fn publication_options_clause(publication: &Publication) -> String {
    let mut actions = Vec::new();
    if publication.insert {
        actions.push("insert");
    }
    if publication.update {
        actions.push("update");
    }
    if publication.delete {
        actions.push("delete");
    }
    if publication.truncate {
        actions.push("truncate");
    }
    format!("WITH (publish = '{}')", actions.join(", "))
}

fn render_create(publication: &Publication) -> RenderedSql {
    let mut sql = format!(
        "CREATE PUBLICATION {}",
        quote_ident(&publication.name)
    );
    let target = publication_target_clause(publication);
    if !target.is_empty() {
        sql.push_str(&format!(" {}", target));
    }
    sql.push_str(&format!(" {};", publication_options_clause(publication)));
    RenderedSql::new(sql)
}

/// Publication tables and options can't be altered in a single statement, so
/// emit one `ALTER PUBLICATION` per changed aspect.
fn render_alter(publication: &Publication) -> Vec<RenderedSql> {
    let mut statements = Vec::new();
    let target = publication_target_clause(publication);
    if publication.all_tables {
        // ALL TABLES membership can only be set at creation time; nothing to alter here.
    } else if !target.is_empty() {
        statements.push(RenderedSql::new(format!(
            "ALTER PUBLICATION {} SET TABLE {};",
            quote_ident(&publication.name),
            publication
                .tables
                .iter()
                .map(|t| format!("{}.{}", quote_ident(&t.schema), quote_ident(&t.name)))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }
    statements.push(RenderedSql::new(format!(
        "ALTER PUBLICATION {} SET {};",
        quote_ident(&publication.name),
        publication_options_clause(publication)
    )));
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::publication::PublicationTable;
    use crate::diff::operations::PublicationIdentifier;

    fn publication() -> Publication {
        Publication {
            name: "orders_pub".to_string(),
            all_tables: false,
            tables: vec![PublicationTable {
                schema: "public".to_string(),
                name: "orders".to_string(),
            }],
            insert: true,
            update: true,
            delete: false,
            truncate: false,
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_for_table() {
        let op = PublicationOperation::Create {
            publication: publication(),
        };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.contains("FOR TABLE \"public\".\"orders\""));
        assert!(sql[0].sql.contains("publish = 'insert, update'"));
    }

    #[test]
    fn create_all_tables() {
        let mut p = publication();
        p.all_tables = true;
        let op = PublicationOperation::Create { publication: p };
        assert!(op.to_sql()[0].sql.contains("FOR ALL TABLES"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = PublicationOperation::Drop {
            identifier: PublicationIdentifier {
                name: "orders_pub".to_string(),
            },
        };
        assert!(op.is_destructive());
    }
}
