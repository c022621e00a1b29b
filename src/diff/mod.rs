pub mod aggregates;
pub mod cascade;
pub mod collations;
pub mod column_grants;
pub mod columns;
pub mod comment_utils;
pub mod constraints;
pub mod custom_types;
pub mod default_grants;
pub mod domains;
pub mod event_triggers;
pub mod extensions;
pub mod functions;
pub mod grants;
pub mod indexes;
pub mod languages;
pub mod materialized_views;
pub mod operations;
pub mod policies;
pub mod publications;
pub mod role_memberships;
pub mod roles;
pub mod rules;
pub mod schemas;
pub mod sequences;
pub mod subscriptions;
pub mod tables;
pub mod triggers;
pub mod views;

use crate::catalog::id::DbObjectId;
use crate::catalog::{
    Catalog, aggregate::Aggregate, collation::Collation, constraint::Constraint,
    custom_type::CustomType, domain::Domain, event_trigger::EventTrigger, extension::Extension,
    function::Function, index::Index, language::Language, materialized_view::MaterializedView,
    publication::Publication, role::Role, role_membership::RoleMembership, rule::Rule,
    sequence::Sequence, subscription::Subscription, table::Table, view::View,
};
use crate::diff::operations::MigrationStep;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub fn diff_all(old: &Catalog, new: &Catalog) -> Vec<MigrationStep> {
    info!("Diffing catalogs...");
    let mut out = Vec::new();

    out.extend(diff_list(
        &old.schemas,
        &new.schemas,
        |s| DbObjectId::Schema {
            name: s.name.clone(),
        },
        schemas::diff,
    ));

    out.extend(diff_list(&old.roles, &new.roles, Role::id, roles::diff));

    out.extend(diff_list(
        &old.role_memberships,
        &new.role_memberships,
        RoleMembership::id,
        role_memberships::diff,
    ));

    out.extend(diff_list(
        &old.languages,
        &new.languages,
        Language::id,
        languages::diff,
    ));

    out.extend(diff_list(
        &old.collations,
        &new.collations,
        Collation::id,
        collations::diff,
    ));

    out.extend(diff_list(
        &old.extensions,
        &new.extensions,
        Extension::id,
        extensions::diff,
    ));

    out.extend(diff_list(
        &old.types,
        &new.types,
        CustomType::id,
        custom_types::diff,
    ));

    out.extend(diff_list(
        &old.domains,
        &new.domains,
        Domain::id,
        domains::diff,
    ));

    out.extend(diff_list(
        &old.sequences,
        &new.sequences,
        Sequence::id,
        sequences::diff,
    ));

    out.extend(diff_list(&old.tables, &new.tables, Table::id, tables::diff));

    out.extend(diff_list(
        &old.indexes,
        &new.indexes,
        Index::id,
        indexes::diff,
    ));

    out.extend(diff_list(
        &old.constraints,
        &new.constraints,
        Constraint::id,
        constraints::diff,
    ));

    out.extend(diff_list(
        &old.triggers,
        &new.triggers,
        |t| t.id(),
        triggers::diff,
    ));

    out.extend(diff_list(&old.views, &new.views, View::id, views::diff));

    out.extend(diff_list(
        &old.materialized_views,
        &new.materialized_views,
        MaterializedView::id,
        materialized_views::diff,
    ));

    out.extend(diff_list(&old.rules, &new.rules, Rule::id, rules::diff));

    out.extend(diff_list(
        &old.event_triggers,
        &new.event_triggers,
        EventTrigger::id,
        event_triggers::diff,
    ));

    out.extend(diff_list(
        &old.publications,
        &new.publications,
        Publication::id,
        publications::diff,
    ));

    out.extend(diff_list(
        &old.subscriptions,
        &new.subscriptions,
        Subscription::id,
        subscriptions::diff,
    ));

    out.extend(diff_list(
        &old.functions,
        &new.functions,
        Function::id,
        functions::diff,
    ));

    out.extend(diff_list(
        &old.aggregates,
        &new.aggregates,
        Aggregate::id,
        aggregates::diff,
    ));

    out.extend(diff_list(
        &old.policies,
        &new.policies,
        |p| p.id(),
        policies::diff,
    ));

    out.extend(grants::diff_grants(&old.grants, &new.grants));

    out.extend(column_grants::diff_column_grants(
        &old.column_grants,
        &new.column_grants,
    ));

    out.extend(default_grants::diff_default_grants(
        &old.default_grants,
        &new.default_grants,
    ));

    info!("Diff complete");
    out
}

pub fn diff_list<T, I: Eq + Ord + Clone, R>(
    old: &[T],
    new: &[T],
    id_of: impl Fn(&T) -> I,
    diff_fn: impl Fn(Option<&T>, Option<&T>) -> Vec<R>,
) -> Vec<R> {
    let mut old_map = BTreeMap::new();
    let mut new_map = BTreeMap::new();
    for o in old {
        old_map.insert(id_of(o), o);
    }
    for n in new {
        new_map.insert(id_of(n), n);
    }

    let all_ids: BTreeSet<_> = old_map.keys().chain(new_map.keys()).cloned().collect();

    all_ids
        .into_iter()
        .flat_map(|id| diff_fn(old_map.get(&id).cloned(), new_map.get(&id).cloned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::role::Role;
    use crate::catalog::schema::Schema;

    #[test]
    fn diffing_against_an_empty_catalog_only_creates() {
        let mut branch = Catalog::empty();
        branch.schemas.push(Schema {
            name: "app".to_string(),
            comment: None,
        });
        branch.roles.push(Role {
            name: "app_user".to_string(),
            superuser: false,
            createdb: false,
            createrole: false,
            login: true,
            replication: false,
            bypassrls: false,
            connection_limit: -1,
            comment: None,
        });

        let steps = diff_all(&Catalog::empty(), &branch);

        assert!(!steps.is_empty());
        assert!(steps.iter().all(|s| s.is_create()));
    }

    #[test]
    fn diffing_an_empty_catalog_against_itself_produces_nothing() {
        assert!(diff_all(&Catalog::empty(), &Catalog::empty()).is_empty());
    }
}

