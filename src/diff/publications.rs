//! Diff publications: CREATE/DROP/ALTER table membership and options

use crate::catalog::publication::Publication;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, PublicationIdentifier, PublicationOperation};

fn publication_attrs_differ(old: &Publication, new: &Publication) -> bool {
    old.all_tables != new.all_tables
        || old.tables != new.tables
        || old.insert != new.insert
        || old.update != new.update
        || old.delete != new.delete
        || old.truncate != new.truncate
}

pub fn diff(old: Option<&Publication>, new: Option<&Publication>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Publication(PublicationOperation::Create {
                publication: n.clone(),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                PublicationIdentifier::from_publication(n),
            ) {
                steps.push(MigrationStep::Publication(PublicationOperation::Comment(
                    comment_op,
                )));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Publication(PublicationOperation::Drop {
            identifier: PublicationIdentifier::from_publication(o),
        })],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if publication_attrs_differ(o, n) {
                steps.push(MigrationStep::Publication(PublicationOperation::Alter {
                    old_publication: o.clone(),
                    new_publication: n.clone(),
                }));
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                PublicationIdentifier::from_publication(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Publication(PublicationOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}
