//! SQL rendering for materialized view operations

use crate::catalog::id::DbObjectId;
use crate::catalog::materialized_view::MaterializedView;
use crate::diff::operations::{CommentOperation, MaterializedViewIdentifier, MaterializedViewOperation};
use crate::render::{RenderedSql, SqlRenderer, quote_ident};

impl SqlRenderer for MaterializedViewOperation {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            MaterializedViewOperation::Create { view } => vec![render_create(view)],
            MaterializedViewOperation::Drop { identifier } => {
                vec![render_drop(identifier)]
            }
            MaterializedViewOperation::Replace { old_view, new_view } => {
                vec![
                    render_drop(&MaterializedViewIdentifier::from_view(old_view)),
                    render_create(new_view),
                ]
            }
            MaterializedViewOperation::Comment(comment_op) => comment_op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            MaterializedViewOperation::Create { view } => DbObjectId::MaterializedView {
                schema: view.schema.clone(),
                name: view.name.clone(),
            },
            MaterializedViewOperation::Drop { identifier } => DbObjectId::MaterializedView {
                schema: identifier.schema.clone(),
                name: identifier.name.clone(),
            },
            MaterializedViewOperation::Replace { new_view, .. } => DbObjectId::MaterializedView {
                schema: new_view.schema.clone(),
                name: new_view.name.clone(),
            },
            MaterializedViewOperation::Comment(comment_op) => match comment_op {
                CommentOperation::Set { target, .. } | CommentOperation::Drop { target } => {
                    DbObjectId::MaterializedView {
                        schema: target.schema.clone(),
                        name: target.name.clone(),
                    }
                }
            },
        }
    }

    fn is_destructive(&self) -> bool {
        matches!(
            self,
            MaterializedViewOperation::Drop { .. } | MaterializedViewOperation::Replace { .. }
        )
    }
}

fn render_create(view: &MaterializedView) -> RenderedSql {
    let with_data = if view.populated {
        ""
    } else {
        " WITH NO DATA"
    };
    RenderedSql::new(format!(
        "CREATE MATERIALIZED VIEW {}.{} AS {}{};",
        quote_ident(&view.schema),
        quote_ident(&view.name),
        view.definition.trim_end_matches(';'),
        with_data
    ))
}

fn render_drop(identifier: &MaterializedViewIdentifier) -> RenderedSql {
    RenderedSql::destructive(format!(
        "DROP MATERIALIZED VIEW {}.{};",
        quote_ident(&identifier.schema),
        quote_ident(&identifier.name)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(populated: bool) -> MaterializedView {
        MaterializedView {
            schema: "public".to_string(),
            name: "totals".to_string(),
            definition: "SELECT count(*) FROM orders".to_string(),
            populated,
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_populated() {
        let op = MaterializedViewOperation::Create {
            view: Box::new(view(true)),
        };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].sql.starts_with("CREATE MATERIALIZED VIEW \"public\".\"totals\""));
        assert!(!sql[0].sql.contains("WITH NO DATA"));
    }

    #[test]
    fn create_unpopulated_has_no_data() {
        let op = MaterializedViewOperation::Create {
            view: Box::new(view(false)),
        };
        assert!(op.to_sql()[0].sql.contains("WITH NO DATA"));
    }

    #[test]
    fn drop_is_destructive() {
        let op = MaterializedViewOperation::Drop {
            identifier: MaterializedViewIdentifier::from_view(&view(true)),
        };
        assert!(op.is_destructive());
    }

    #[test]
    fn replace_drops_then_creates() {
        let op = MaterializedViewOperation::Replace {
            old_view: Box::new(view(true)),
            new_view: Box::new(view(true)),
        };
        let sql = op.to_sql();
        assert_eq!(sql.len(), 2);
        assert!(sql[0].sql.starts_with("DROP MATERIALIZED VIEW"));
        assert!(sql[1].sql.starts_with("CREATE MATERIALIZED VIEW"));
        assert!(op.is_destructive());
    }
}
