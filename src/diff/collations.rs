//! Diff collations: CREATE/DROP, comments

use crate::catalog::collation::Collation;
use crate::diff::comment_utils;
use crate::diff::operations::{CollationIdentifier, CollationOperation, MigrationStep};

pub fn diff(old: Option<&Collation>, new: Option<&Collation>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Collation(CollationOperation::Create {
                collation: n.clone(),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                CollationIdentifier::from_collation(n),
            ) {
                steps.push(MigrationStep::Collation(CollationOperation::Comment(
                    comment_op,
                )));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Collation(CollationOperation::Drop {
            identifier: CollationIdentifier::from_collation(o),
        })],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if o.provider != n.provider
                || o.locale != n.locale
                || o.lc_collate != n.lc_collate
                || o.lc_ctype != n.lc_ctype
                || o.deterministic != n.deterministic
            {
                steps.push(MigrationStep::Collation(CollationOperation::Drop {
                    identifier: CollationIdentifier::from_collation(o),
                }));
                steps.push(MigrationStep::Collation(CollationOperation::Create {
                    collation: n.clone(),
                }));
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &n.comment,
                    CollationIdentifier::from_collation(n),
                ) {
                    steps.push(MigrationStep::Collation(CollationOperation::Comment(
                        comment_op,
                    )));
                }
                return steps;
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                CollationIdentifier::from_collation(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Collation(CollationOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}
