//! Diff column-level grants between catalogs

use crate::catalog::column_grant::ColumnGrant;
use crate::diff::operations::{ColumnGrantOperation, MigrationStep};
use std::collections::BTreeMap;

fn diff(old: Option<&ColumnGrant>, new: Option<&ColumnGrant>) -> Vec<MigrationStep> {
    match (old, new) {
        (None, Some(new)) => vec![MigrationStep::ColumnGrant(ColumnGrantOperation::Grant {
            grant: new.clone(),
        })],
        (Some(old), None) => vec![MigrationStep::ColumnGrant(ColumnGrantOperation::Revoke {
            grant: old.clone(),
        })],
        (Some(old), Some(new)) => {
            if old.privileges != new.privileges || old.with_grant_option != new.with_grant_option
            {
                vec![
                    MigrationStep::ColumnGrant(ColumnGrantOperation::Revoke {
                        grant: old.clone(),
                    }),
                    MigrationStep::ColumnGrant(ColumnGrantOperation::Grant {
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

pub fn diff_column_grants(
    old_grants: &[ColumnGrant],
    new_grants: &[ColumnGrant],
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
    use crate::catalog::grant::GranteeType;

    fn grant(column: &str, privileges: &[&str]) -> ColumnGrant {
        ColumnGrant {
            grantee: GranteeType::Role("reporting".to_string()),
            schema: "public".to_string(),
            table: "orders".to_string(),
            column: column.to_string(),
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
            with_grant_option: false,
            depends_on: vec![],
        }
    }

    #[test]
    fn new_column_grant_creates_grant() {
        let g = grant("total", &["SELECT"]);
        let steps = diff_column_grants(&[], &[g]);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::ColumnGrant(ColumnGrantOperation::Grant { .. })
        ));
    }

    #[test]
    fn removed_column_grant_revokes() {
        let g = grant("total", &["SELECT"]);
        let steps = diff_column_grants(&[g], &[]);
        assert_eq!(steps.len(), 1);
        assert!(matches!(
            &steps[0],
            MigrationStep::ColumnGrant(ColumnGrantOperation::Revoke { .. })
        ));
    }

    #[test]
    fn privilege_change_revokes_and_regrants() {
        let old_g = grant("total", &["SELECT"]);
        let new_g = grant("total", &["SELECT", "UPDATE"]);
        let steps = diff_column_grants(&[old_g], &[new_g]);
        assert_eq!(steps.len(), 2);
    }
}
