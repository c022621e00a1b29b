//! Diff rewrite rules: CREATE/DROP/REPLACE, comments

use crate::catalog::rule::Rule;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, RuleIdentifier, RuleOperation};

pub fn diff(old: Option<&Rule>, new: Option<&Rule>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Rule(RuleOperation::Create {
                rule: Box::new(n.clone()),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                RuleIdentifier::from_rule(n),
            ) {
                steps.push(MigrationStep::Rule(RuleOperation::Comment(comment_op)));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Rule(RuleOperation::Drop {
            identifier: RuleIdentifier::from_rule(o),
        })],
        (Some(o), Some(n)) => {
            if o.definition != n.definition {
                let mut steps = vec![MigrationStep::Rule(RuleOperation::Replace {
                    old_rule: Box::new(o.clone()),
                    new_rule: Box::new(n.clone()),
                })];
                if let Some(comment_op) = comment_utils::handle_comment_creation(
                    &n.comment,
                    RuleIdentifier::from_rule(n),
                ) {
                    steps.push(MigrationStep::Rule(RuleOperation::Comment(comment_op)));
                }
                return steps;
            }

            let mut steps = Vec::new();
            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                RuleIdentifier::from_rule(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Rule(RuleOperation::Comment(comment_op)));
            }
            steps
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> Rule {
        Rule {
            schema: "public".to_string(),
            table_name: "orders".to_string(),
            name: name.to_string(),
            comment: None,
            depends_on: vec![],
            definition: "CREATE RULE log_insert AS ON INSERT TO orders DO INSERT INTO audit_log DEFAULT VALUES;".to_string(),
        }
    }

    #[test]
    fn create_new() {
        let r = rule("log_insert");
        let steps = diff(None, Some(&r));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Rule(RuleOperation::Create { .. })
        ));
    }

    #[test]
    fn definition_change_replaces() {
        let old_r = rule("log_insert");
        let mut new_r = rule("log_insert");
        new_r.definition = "CREATE RULE log_insert AS ON INSERT TO orders DO NOTHING;".to_string();
        let steps = diff(Some(&old_r), Some(&new_r));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Rule(RuleOperation::Replace { .. })
        ));
    }

    #[test]
    fn unchanged_produces_no_steps() {
        let r = rule("log_insert");
        let steps = diff(Some(&r), Some(&r));
        assert!(steps.is_empty());
    }
}
