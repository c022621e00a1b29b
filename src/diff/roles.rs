//! Diff roles: CREATE/DROP/ALTER attributes, comments

use crate::catalog::role::Role;
use crate::diff::comment_utils;
use crate::diff::operations::{MigrationStep, RoleIdentifier, RoleOperation};

/// Attributes compared for `ALTER ROLE ... WITH ...`; the role name itself
/// is the identity and is never part of this comparison.
fn attributes_differ(old: &Role, new: &Role) -> bool {
    old.superuser != new.superuser
        || old.createdb != new.createdb
        || old.createrole != new.createrole
        || old.login != new.login
        || old.replication != new.replication
        || old.bypassrls != new.bypassrls
        || old.connection_limit != new.connection_limit
}

pub fn diff(old: Option<&Role>, new: Option<&Role>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(n)) => {
            let mut steps = vec![MigrationStep::Role(RoleOperation::Create {
                role: n.clone(),
            })];
            if let Some(comment_op) =
                comment_utils::handle_comment_creation(&n.comment, RoleIdentifier::from_role(n))
            {
                steps.push(MigrationStep::Role(RoleOperation::Comment(comment_op)));
            }
            steps
        }
        (Some(o), None) => {
            vec![MigrationStep::Role(RoleOperation::Drop {
                identifier: RoleIdentifier::from_role(o),
            })]
        }
        (Some(o), Some(n)) => {
            let mut steps = Vec::new();

            if attributes_differ(o, n) {
                steps.push(MigrationStep::Role(RoleOperation::Alter {
                    old_role: o.clone(),
                    new_role: n.clone(),
                }));
            }

            let comment_ops = comment_utils::handle_comment_diff(Some(o), Some(n), || {
                RoleIdentifier::from_role(n)
            });
            for comment_op in comment_ops {
                steps.push(MigrationStep::Role(RoleOperation::Comment(comment_op)));
            }

            steps
        }
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        Role {
            name: name.to_string(),
            superuser: false,
            createdb: false,
            createrole: false,
            login: true,
            replication: false,
            bypassrls: false,
            connection_limit: -1,
            comment: None,
        }
    }

    #[test]
    fn no_changes() {
        let r = role("app");
        assert!(diff(Some(&r), Some(&r)).is_empty());
    }

    #[test]
    fn create_role() {
        let new_role = role("app");
        let steps = diff(None, Some(&new_role));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Role(RoleOperation::Create { .. })
        ));
    }

    #[test]
    fn drop_role() {
        let old_role = role("app");
        let steps = diff(Some(&old_role), None);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Role(RoleOperation::Drop { .. })
        ));
    }

    #[test]
    fn alter_role_attribute() {
        let old_role = role("app");
        let mut new_role = role("app");
        new_role.createdb = true;

        let steps = diff(Some(&old_role), Some(&new_role));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Role(RoleOperation::Alter { .. })
        ));
    }

    #[test]
    fn comment_only_change() {
        let old_role = role("app");
        let mut new_role = role("app");
        new_role.comment = Some("service account".to_string());

        let steps = diff(Some(&old_role), Some(&new_role));
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::Role(RoleOperation::Comment(_))
        ));
    }
}
