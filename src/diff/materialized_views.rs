//! Diff materialized views: CREATE/DROP/replace-on-definition-change

use crate::catalog::materialized_view::MaterializedView;
use crate::diff::comment_utils;
use crate::diff::operations::{MaterializedViewIdentifier, MaterializedViewOperation, MigrationStep};

pub fn diff(
    old: Option<&MaterializedView>,
    new: Option<&MaterializedView>,
) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::MaterializedView(
                MaterializedViewOperation::Create {
                    view: Box::new(n.clone()),
                },
            )];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                MaterializedViewIdentifier::from_view(n),
            ) {
                steps.push(MigrationStep::MaterializedView(
                    MaterializedViewOperation::Comment(comment_op),
                ));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::MaterializedView(
            MaterializedViewOperation::Drop {
                identifier: MaterializedViewIdentifier::from_view(o),
            },
        )],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if o.definition != n.definition {
                steps.push(MigrationStep::MaterializedView(
                    MaterializedViewOperation::Replace {
                        old_view: Box::new(o.clone()),
                        new_view: Box::new(n.clone()),
                    },
                ));
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &n.comment,
                    MaterializedViewIdentifier::from_view(n),
                ) {
                    steps.push(MigrationStep::MaterializedView(
                        MaterializedViewOperation::Comment(comment_op),
                    ));
                }
            } else {
                let comment_ops =
                    comment_utils::handle_comment_diff(Some(o), Some(n), || {
                        MaterializedViewIdentifier::from_view(n)
                    });
                for comment_op in comment_ops {
                    steps.push(MigrationStep::MaterializedView(
                        MaterializedViewOperation::Comment(comment_op),
                    ));
                }
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(name: &str, definition: &str) -> MaterializedView {
        MaterializedView {
            schema: "public".to_string(),
            name: name.to_string(),
            definition: definition.to_string(),
            populated: true,
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn no_changes() {
        let v = mv("totals", "SELECT 1");
        assert!(diff(Some(&v), Some(&v)).is_empty());
    }

    #[test]
    fn create_new() {
        let v = mv("totals", "SELECT 1");
        let steps = diff(None, Some(&v));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::MaterializedView(MaterializedViewOperation::Create { .. })
        ));
    }

    #[test]
    fn drop_missing() {
        let v = mv("totals", "SELECT 1");
        let steps = diff(Some(&v), None);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::MaterializedView(MaterializedViewOperation::Drop { .. })
        ));
    }

    #[test]
    fn definition_change_is_replace() {
        let old_v = mv("totals", "SELECT 1");
        let new_v = mv("totals", "SELECT 2");
        let steps = diff(Some(&old_v), Some(&new_v));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::MaterializedView(MaterializedViewOperation::Replace { .. })
        ));
    }
}
