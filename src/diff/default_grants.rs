//! Diff default-privilege entries between catalogs

use crate::catalog::default_grant::DefaultGrant;
use crate::diff::operations::{DefaultGrantOperation, MigrationStep};
use std::collections::BTreeMap;

fn diff(old: Option<&DefaultGrant>, new: Option<&DefaultGrant>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(new)) => vec![MigrationStep::DefaultGrant(DefaultGrantOperation::Grant {
            grant: new.clone(),
        })],
        (Some(old), None) => vec![MigrationStep::DefaultGrant(DefaultGrantOperation::Revoke {
            grant: old.clone(),
        })],
        (Some(old), Some(new)) => {
            if old.privileges != new.privileges {
                vec![
                    MigrationStep::DefaultGrant(DefaultGrantOperation::Revoke {
                        grant: old.clone(),
                    }),
                    MigrationStep::DefaultGrant(DefaultGrantOperation::Grant {
                        grant: new.clone(),
                    }),
                ]
            } else {
                vec![]
            }
        }
        (None, None) => vec![],
    }
}

pub fn diff_default_grants(
    old_grants: &[DefaultGrant],
    new_grants: &[DefaultGrant],
) -> Vec<MigrationStep> {
    let mut old_map = BTreeMap::new();
    let mut new_map = BTreeMap::new();

    for grant in old_grants {
        old_map.insert(grant.id(), grant);
    }
    for grant in new_grants {
        new_map.insert(grant.id(), grant);
    }

    let all_ids: std::collections::BTreeSet<_> =
        old_map.keys().chain(new_map.keys()).cloned().collect();

    all_ids
        .into_iter()
        .flat_map(|id| {
            let old = old_map.get(&id).copied();
            let new = new_map.get(&id).copied();
            diff(old, new)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_grant::DefaultObjectType;
    use crate::catalog::grant::GranteeType;

    fn grant(privileges: &[&str]) -> DefaultGrant {
        DefaultGrant {
            grantor: "app_owner".to_string(),
            grantee: GranteeType::Role("reporting".to_string()),
            schema: Some("public".to_string()),
            object_type: DefaultObjectType::Table,
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
            depends_on: vec![],
        }
    }

    #[test]
    fn new_default_grant_creates_grant() {
        let g = grant(&["SELECT"]);
        let steps = diff_default_grants(&[], &[g]);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::DefaultGrant(DefaultGrantOperation::Grant { .. })
        ));
    }

    #[test]
    fn removed_default_grant_revokes() {
        let g = grant(&["SELECT"]);
        let steps = diff_default_grants(&[g], &[]);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::DefaultGrant(DefaultGrantOperation::Revoke { .. })
        ));
    }

    #[test]
    fn privilege_change_revokes_and_regrants() {
        let old_g = grant(&["SELECT"]);
        let new_g = grant(&["SELECT", "INSERT"]);
        let steps = diff_default_grants(&[old_g], &[new_g]);
        assert_eq!(steps.len(), 2);
    }
}
