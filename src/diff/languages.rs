//! Diff procedural languages: CREATE/DROP, comments

use crate::catalog::language::Language;
use crate::diff::comment_utils;
use crate::diff::operations::{LanguageIdentifier, LanguageOperation, MigrationStep};

pub fn diff(old: Option<&Language>, new: Option<&Language>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Language(LanguageOperation::Create {
                language: n.clone(),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                LanguageIdentifier::from_language(n),
            ) {
                steps.push(MigrationStep::Language(LanguageOperation::Comment(
                    comment_op,
                )));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Language(LanguageOperation::Drop {
            identifier: LanguageIdentifier::from_language(o),
        })],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if o.trusted != n.trusted
                || o.handler != n.handler
                || o.inline_handler != n.inline_handler
                || o.validator != n.validator
            {
                // No ALTER LANGUAGE for these attributes; recreate.
                steps.push(MigrationStep::Language(LanguageOperation::Drop {
                    identifier: LanguageIdentifier::from_language(o),
                }));
                steps.push(MigrationStep::Language(LanguageOperation::Create {
                    language: n.clone(),
                }));
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &n.comment,
                    LanguageIdentifier::from_language(n),
                ) {
                    steps.push(MigrationStep::Language(LanguageOperation::Comment(
                        comment_op,
                    )));
                }
                return steps;
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                LanguageIdentifier::from_language(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Language(LanguageOperation::Comment(
                    comment_op,
                )));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(name: &str) -> Language {
        Language {
            name: name.to_string(),
            trusted: true,
            handler: Some("plpython3_call_handler".to_string()),
            inline_handler: None,
            validator: None,
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_new() {
        let l = lang("plpython3u");
        let steps = diff(None, Some(&l));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Language(LanguageOperation::Create { .. })
        ));
    }

    #[test]
    fn trusted_change_recreates() {
        let old_l = lang("plpython3u");
        let mut new_l = lang("plpython3u");
        new_l.trusted = false;
        let steps = diff(Some(&old_l), Some(&new_l));
        assert_eq!(steps.len(), 2);
    }
}
