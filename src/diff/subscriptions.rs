//! Diff subscriptions: CREATE/DROP/ALTER publication set and enabled state

use crate::catalog::subscription::Subscription;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, SubscriptionIdentifier, SubscriptionOperation};

fn subscription_attrs_differ(old: &Subscription, new: &Subscription) -> bool {
    old.publications != new.publications
        || old.enabled != new.enabled
        || old.conninfo != new.conninfo
}

pub fn diff(old: Option<&Subscription>, new: Option<&Subscription>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Subscription(SubscriptionOperation::Create {
                subscription: n.clone(),
            })];
            if let Some(comment_op) = comment_utils::handle_comment_creation(
                &n.comment,
                SubscriptionIdentifier::from_subscription(n),
            ) {
                steps.push(MigrationStep::Subscription(
                    SubscriptionOperation::Comment(comment_op),
                ));
            }
            steps
        }
        (Some(o), None) => vec![MigrationStep::Subscription(SubscriptionOperation::Drop {
            identifier: SubscriptionIdentifier::from_subscription(o),
        })],
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if subscription_attrs_differ(o, n) {
                steps.push(MigrationStep::Subscription(SubscriptionOperation::Alter {
                    old_subscription: o.clone(),
                    new_subscription: n.clone(),
                }));
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                SubscriptionIdentifier::from_subscription(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Subscription(
                    SubscriptionOperation::Comment(comment_op),
                ));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(name: &str) -> Subscription {
        Subscription {
            name: name.to_string(),
            conninfo: "host=upstream dbname=app".to_string(),
            publications: vec!["orders_pub".to_string()],
            enabled: true,
            slot_name: Some(name.to_string()),
            comment: None,
            depends_on: vec![],
        }
    }

    #[test]
    fn create_new() {
        let s = subscription("orders_sub");
        let steps = diff(None, Some(&s));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Subscription(SubscriptionOperation::Create { .. })
        ));
    }

    #[test]
    fn publication_set_change_alters() {
        let old_s = subscription("orders_sub");
        let mut new_s = subscription("orders_sub");
        new_s.publications.push("users_pub".to_string());
        let steps = diff(Some(&old_s), Some(&new_s));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Subscription(SubscriptionOperation::Alter { .. })
        ));
    }
}
