//! The JSON wire shape for `diff` output.
//!
//! `MigrationStep` itself is not `Serialize`: its payload types borrow
//! catalog record shapes (full `Table`, `Function`, ...) that were never
//! designed as a public wire format. `ChangeDescriptor` is the deliberate
//! serialization boundary - one flat, stable-shaped record per step.

use crate::diff::operations::{MigrationStep, OperationKind};
use crate::render::SqlRenderer;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Drop,
    Create,
    Alter,
    Replace,
}

impl From<OperationKind> for Operation {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Drop => Operation::Drop,
            OperationKind::Create => Operation::Create,
            OperationKind::Alter => Operation::Alter,
            OperationKind::Replace => Operation::Replace,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Object,
    Comment,
    Privilege,
    Membership,
    Column,
    Constraint,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptor {
    pub operation: Operation,
    pub scope: Scope,
    pub object_type: &'static str,
    pub stable_id: String,
    pub sql: Vec<String>,
}

fn object_type(step: &MigrationStep) -> &'static str {
    match step {
        MigrationStep::Schema(_) => "schema",
        MigrationStep::Role(_) => "role",
        MigrationStep::RoleMembership(_) => "roleMembership",
        MigrationStep::Table(_) => "table",
        MigrationStep::View(_) => "view",
        MigrationStep::MaterializedView(_) => "materializedView",
        MigrationStep::Type(_) => "type",
        MigrationStep::Domain(_) => "domain",
        MigrationStep::Sequence(_) => "sequence",
        MigrationStep::Function(_) => "function",
        MigrationStep::Aggregate(_) => "aggregate",
        MigrationStep::Index(_) => "index",
        MigrationStep::Constraint(_) => "constraint",
        MigrationStep::Trigger(_) => "trigger",
        MigrationStep::EventTrigger(_) => "eventTrigger",
        MigrationStep::Rule(_) => "rule",
        MigrationStep::Extension(_) => "extension",
        MigrationStep::Language(_) => "language",
        MigrationStep::Collation(_) => "collation",
        MigrationStep::Publication(_) => "publication",
        MigrationStep::Subscription(_) => "subscription",
        MigrationStep::Grant(_) => "grant",
        MigrationStep::ColumnGrant(_) => "columnGrant",
        MigrationStep::DefaultGrant(_) => "defaultGrant",
        MigrationStep::Policy(_) => "rlsPolicy",
    }
}

fn scope(step: &MigrationStep) -> Scope {
    match step {
        MigrationStep::RoleMembership(_) => Scope::Membership,
        MigrationStep::Grant(_) | MigrationStep::ColumnGrant(_) | MigrationStep::DefaultGrant(_) => {
            Scope::Privilege
        }
        MigrationStep::Constraint(_) => Scope::Constraint,
        _ => Scope::Object,
    }
}

impl From<&MigrationStep> for ChangeDescriptor {
    fn from(step: &MigrationStep) -> Self {
        let id = step.db_object_id();
        ChangeDescriptor {
            operation: step.operation_kind().into(),
            scope: scope(step),
            object_type: object_type(step),
            stable_id: id.stable_id(),
            sql: step.to_sql().into_iter().map(|r| r.sql).collect(),
        }
    }
}

pub fn describe_all(steps: &[MigrationStep]) -> Vec<ChangeDescriptor> {
    steps.iter().map(ChangeDescriptor::from).collect()
}
