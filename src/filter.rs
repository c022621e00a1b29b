//! Optional post-filter: drops change entries for ignored schemas or managed
//! roles after the catalog diff but before ordering.
//!
//! This is a trimmed descendant of the old file-project `ObjectFilter`
//! (`config::filter`): that type filtered whole catalogs against
//! user-configurable include/exclude glob patterns for a declarative schema
//! project. A live two-catalog diff has no such project, so there is nothing
//! to include/exclude by glob - the only thing worth filtering here is noise
//! from infrastructure this crate doesn't own: a managed Postgres provider's
//! own schemas (`supabase_%`, `pgmq`, ...) and roles (`rds_superuser`,
//! `cloudsql_admin`, ...). Those prefixes/names are never hard-coded; callers
//! supply them.

use crate::catalog::id::DbObjectId;
use crate::diff::operations::MigrationStep;
use crate::render::SqlRenderer;

/// Configuration for the post-filter.
///
/// `ignored_schema_prefixes` drops any change whose object lives in a schema
/// starting with one of these prefixes, except schema and extension creates
/// themselves (dropping those would make the provider's own schema vanish
/// from the script even when nothing inside it is being managed).
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub ignored_schema_prefixes: Vec<String>,
    pub managed_role_names: Vec<String>,
}

impl FilterOptions {
    pub fn new(ignored_schema_prefixes: Vec<String>, managed_role_names: Vec<String>) -> Self {
        Self {
            ignored_schema_prefixes,
            managed_role_names,
        }
    }

    fn schema_ignored(&self, schema: &str) -> bool {
        self.ignored_schema_prefixes
            .iter()
            .any(|prefix| schema.starts_with(prefix.as_str()))
    }

    fn role_managed(&self, name: &str) -> bool {
        self.managed_role_names.iter().any(|r| r == name)
    }
}

/// Apply the post-filter to an already-ordered-or-unordered change list.
///
/// Per the component contract this sits between the catalog differ (C7) and
/// the dependency resolver (C8); calling it before or after resolver ordering
/// produces the same surviving set as long as the filter is closed under
/// dependencies (the caller is responsible for that - this crate's own CLI
/// runs it pre-resolve).
pub fn filter_steps(steps: Vec<MigrationStep>, opts: &FilterOptions) -> Vec<MigrationStep> {
    if opts.ignored_schema_prefixes.is_empty() && opts.managed_role_names.is_empty() {
        return steps;
    }

    steps.into_iter().filter(|step| keep(step, opts)).collect()
}

fn keep(step: &MigrationStep, opts: &FilterOptions) -> bool {
    if matches!(step, MigrationStep::Schema(_) | MigrationStep::Extension(_)) {
        return true;
    }

    let id = step.db_object_id();

    if let Some(schema) = id.schema()
        && opts.schema_ignored(schema)
    {
        return false;
    }

    match &id {
        DbObjectId::Role { name } if opts.role_managed(name) => return false,
        DbObjectId::RoleMembership { role, member }
            if opts.role_managed(role) || opts.role_managed(member) =>
        {
            return false;
        }
        _ => {}
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::{RoleOperation, SchemaOperation};

    fn sample_steps() -> Vec<MigrationStep> {
        vec![
            MigrationStep::Schema(SchemaOperation::Create {
                name: "supabase_internal".to_string(),
            }),
            MigrationStep::Role(RoleOperation::Create {
                role: crate::catalog::role::Role {
                    name: "rds_superuser".to_string(),
                    superuser: false,
                    createdb: false,
                    createrole: false,
                    login: false,
                    replication: false,
                    bypassrls: false,
                    connection_limit: -1,
                    comment: None,
                },
            }),
            MigrationStep::Role(RoleOperation::Create {
                role: crate::catalog::role::Role {
                    name: "app_user".to_string(),
                    superuser: false,
                    createdb: false,
                    createrole: false,
                    login: true,
                    replication: false,
                    bypassrls: false,
                    connection_limit: -1,
                    comment: None,
                },
            }),
        ]
    }

    #[test]
    fn empty_options_pass_everything_through() {
        let steps = sample_steps();
        let n = steps.len();
        let filtered = filter_steps(steps, &FilterOptions::default());
        assert_eq!(filtered.len(), n);
    }

    #[test]
    fn schema_creates_survive_ignored_prefix() {
        let steps = sample_steps();
        let opts = FilterOptions::new(vec!["supabase_".to_string()], vec![]);
        let filtered = filter_steps(steps, &opts);
        assert!(filtered.iter().any(|s| matches!(
            s,
            MigrationStep::Schema(SchemaOperation::Create { name }) if name == "supabase_internal"
        )));
    }

    #[test]
    fn managed_role_is_dropped() {
        let steps = sample_steps();
        let opts = FilterOptions::new(vec![], vec!["rds_superuser".to_string()]);
        let filtered = filter_steps(steps, &opts);
        assert!(filtered.iter().all(|s| !matches!(
            s,
            MigrationStep::Role(RoleOperation::Create { role }) if role.name == "rds_superuser"
        )));
        assert!(filtered.iter().any(|s| matches!(
            s,
            MigrationStep::Role(RoleOperation::Create { role }) if role.name == "app_user"
        )));
    }
}
