//! Hierarchical and scalable migration operations
//!
//! This module provides a more maintainable approach to migration steps
//! using hierarchical enums and trait-based rendering.

use crate::catalog::id::DbObjectId;

// Re-export SqlRenderer from render module
pub use crate::render::SqlRenderer;

pub use aggregate::*;
pub use collation::*;
pub use column_grant::*;
pub use comments::*;
pub use constraint::*;
pub use default_grant::*;
pub use domain::*;
pub use event_trigger::*;
pub use extension::*;
pub use function::*;
pub use grant::*;
pub use index::*;
pub use language::*;
pub use materialized_view::*;
pub use policy::*;
pub use publication::*;
pub use role::*;
pub use role_membership::*;
pub use rule::*;
pub use schema::*;
pub use sequence::*;
pub use subscription::*;
pub use table::*;
pub use trigger::*;
pub use types::*;
pub use view::*;

pub mod aggregate;
pub mod collation;
pub mod column_grant;
pub mod comments;
pub mod constraint;
pub mod default_grant;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod function;
pub mod grant;
pub mod index;
pub mod language;
pub mod materialized_view;
pub mod policy;
pub mod publication;
pub mod role;
pub mod role_membership;
pub mod rule;
pub mod schema;
pub mod sequence;
pub mod subscription;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

/// Classifies a per-kind operation for same-object ordering.
///
/// When multiple changes target the same stable ID (e.g. a constraint is
/// dropped and a differently-shaped one with the same name is created, or a
/// view is replaced and then commented on), they must run in priority order:
/// drop, then create, then alter, then replace. `Replace` only appears for
/// kinds that support `CREATE OR REPLACE` directly (view, function/procedure,
/// rule); other kinds decompose a replace into a drop+create pair at
/// diff time and never construct this variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OperationKind {
    Drop,
    Create,
    Alter,
    Replace,
}

/// Main migration step - hierarchical structure for scalability
#[derive(Debug, Clone)]
pub enum MigrationStep {
    Schema(SchemaOperation),
    Role(RoleOperation),
    RoleMembership(RoleMembershipOperation),
    Table(TableOperation),
    View(ViewOperation),
    MaterializedView(MaterializedViewOperation),
    Type(TypeOperation),
    Domain(DomainOperation),
    Sequence(SequenceOperation),
    Function(FunctionOperation),
    Aggregate(AggregateOperation),
    Index(IndexOperation),
    Constraint(ConstraintOperation),
    Trigger(TriggerOperation),
    EventTrigger(EventTriggerOperation),
    Rule(RuleOperation),
    Extension(ExtensionOperation),
    Language(LanguageOperation),
    Collation(CollationOperation),
    Publication(PublicationOperation),
    Subscription(SubscriptionOperation),
    Grant(GrantOperation),
    ColumnGrant(ColumnGrantOperation),
    DefaultGrant(DefaultGrantOperation),
    Policy(PolicyOperation),
}

impl MigrationStep {
    /// Returns the database object ID for this migration step
    pub fn id(&self) -> DbObjectId {
        self.db_object_id()
    }

    /// Returns true if this step is a destructive operation (drop)
    pub fn is_drop(&self) -> bool {
        self.is_destructive()
    }

    /// Returns true if this step is a create operation
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            MigrationStep::Schema(SchemaOperation::Create { .. })
                | MigrationStep::Extension(ExtensionOperation::Create { .. })
                | MigrationStep::Table(TableOperation::Create { .. })
                | MigrationStep::View(ViewOperation::Create { .. })
                | MigrationStep::MaterializedView(MaterializedViewOperation::Create { .. })
                | MigrationStep::Type(TypeOperation::Create { .. })
                | MigrationStep::Domain(DomainOperation::Create { .. })
                | MigrationStep::Sequence(SequenceOperation::Create { .. })
                | MigrationStep::Function(FunctionOperation::Create { .. })
                | MigrationStep::Aggregate(AggregateOperation::Create { .. })
                | MigrationStep::Index(IndexOperation::Create { .. })
                | MigrationStep::Constraint(ConstraintOperation::Create(_))
                | MigrationStep::Trigger(TriggerOperation::Create { .. })
                | MigrationStep::EventTrigger(EventTriggerOperation::Create { .. })
                | MigrationStep::Rule(RuleOperation::Create { .. })
                | MigrationStep::Role(RoleOperation::Create { .. })
                | MigrationStep::RoleMembership(RoleMembershipOperation::Grant { .. })
                | MigrationStep::Language(LanguageOperation::Create { .. })
                | MigrationStep::Collation(CollationOperation::Create { .. })
                | MigrationStep::Publication(PublicationOperation::Create { .. })
                | MigrationStep::Subscription(SubscriptionOperation::Create { .. })
                | MigrationStep::Grant(GrantOperation::Grant { .. })
                | MigrationStep::ColumnGrant(ColumnGrantOperation::Grant { .. })
                | MigrationStep::DefaultGrant(DefaultGrantOperation::Grant { .. })
                | MigrationStep::Policy(PolicyOperation::Create { .. })
        )
    }

    /// Returns true if this step is a "relationship" step that creates circular dependencies
    /// These steps should be executed in a second phase after all primary object creation
    pub fn is_relationship(&self) -> bool {
        match self {
            MigrationStep::Sequence(SequenceOperation::AlterOwnership { .. }) => true,
            MigrationStep::Constraint(ConstraintOperation::Create(constraint)) => {
                matches!(
                    constraint.constraint_type,
                    crate::catalog::constraint::ConstraintType::ForeignKey { .. }
                )
            }
            _ => false,
        }
    }

    /// Classifies this step for same-object priority ordering (drop < create
    /// < alter < replace). Comment-only changes count as `Alter`.
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            MigrationStep::Schema(op) => op.operation_kind(),
            MigrationStep::Table(op) => op.operation_kind(),
            MigrationStep::View(op) => op.operation_kind(),
            MigrationStep::Type(op) => op.operation_kind(),
            MigrationStep::Domain(op) => op.operation_kind(),
            MigrationStep::Sequence(op) => op.operation_kind(),
            MigrationStep::Function(op) => match op {
                FunctionOperation::Create { .. } => OperationKind::Create,
                FunctionOperation::Drop { .. } => OperationKind::Drop,
                FunctionOperation::Replace { .. } => OperationKind::Replace,
                FunctionOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Aggregate(op) => match op {
                AggregateOperation::Create { .. } => OperationKind::Create,
                AggregateOperation::Drop { .. } => OperationKind::Drop,
                AggregateOperation::Replace { .. } => OperationKind::Replace,
                AggregateOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Index(op) => match op {
                IndexOperation::Create(_) => OperationKind::Create,
                IndexOperation::Drop { .. } => OperationKind::Drop,
                IndexOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Constraint(op) => op.operation_kind(),
            MigrationStep::Trigger(op) => match op {
                TriggerOperation::Create { .. } => OperationKind::Create,
                TriggerOperation::Drop { .. } => OperationKind::Drop,
                TriggerOperation::Replace { .. } => OperationKind::Replace,
                TriggerOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Extension(op) => match op {
                ExtensionOperation::Create { .. } => OperationKind::Create,
                ExtensionOperation::Drop { .. } => OperationKind::Drop,
                ExtensionOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Grant(op) => match op {
                GrantOperation::Grant { .. } => OperationKind::Create,
                GrantOperation::Revoke { .. } => OperationKind::Drop,
            },
            MigrationStep::ColumnGrant(op) => match op {
                ColumnGrantOperation::Grant { .. } => OperationKind::Create,
                ColumnGrantOperation::Revoke { .. } => OperationKind::Drop,
            },
            MigrationStep::DefaultGrant(op) => match op {
                DefaultGrantOperation::Grant { .. } => OperationKind::Create,
                DefaultGrantOperation::Revoke { .. } => OperationKind::Drop,
            },
            MigrationStep::Policy(op) => op.operation_kind(),
            MigrationStep::Role(op) => match op {
                RoleOperation::Create { .. } => OperationKind::Create,
                RoleOperation::Drop { .. } => OperationKind::Drop,
                RoleOperation::Alter { .. } => OperationKind::Alter,
                RoleOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::RoleMembership(op) => match op {
                RoleMembershipOperation::Grant { .. } => OperationKind::Create,
                RoleMembershipOperation::Revoke { .. } => OperationKind::Drop,
                RoleMembershipOperation::SetAdminOption { .. } => OperationKind::Alter,
            },
            MigrationStep::MaterializedView(op) => op.operation_kind(),
            MigrationStep::EventTrigger(op) => match op {
                EventTriggerOperation::Create { .. } => OperationKind::Create,
                EventTriggerOperation::Drop { .. } => OperationKind::Drop,
                EventTriggerOperation::SetEnabled { .. } => OperationKind::Alter,
                EventTriggerOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Rule(op) => op.operation_kind(),
            MigrationStep::Language(op) => match op {
                LanguageOperation::Create { .. } => OperationKind::Create,
                LanguageOperation::Drop { .. } => OperationKind::Drop,
                LanguageOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Collation(op) => match op {
                CollationOperation::Create { .. } => OperationKind::Create,
                CollationOperation::Drop { .. } => OperationKind::Drop,
                CollationOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Publication(op) => match op {
                PublicationOperation::Create { .. } => OperationKind::Create,
                PublicationOperation::Drop { .. } => OperationKind::Drop,
                PublicationOperation::Alter { .. } => OperationKind::Alter,
                PublicationOperation::Comment(_) => OperationKind::Alter,
            },
            MigrationStep::Subscription(op) => match op {
                SubscriptionOperation::Create { .. } => OperationKind::Create,
                SubscriptionOperation::Drop { .. } => OperationKind::Drop,
                SubscriptionOperation::Alter { .. } => OperationKind::Alter,
                SubscriptionOperation::Comment(_) => OperationKind::Alter,
            },
        }
    }

    /// Returns step-level dependencies that may not be in the catalog's forward_deps.
    /// This is used for dynamically generated steps (like REVOKE for missing defaults)
    /// that aren't part of the catalog but still need proper ordering.
    pub fn dependencies(&self) -> Vec<DbObjectId> {
        match self {
            MigrationStep::Grant(GrantOperation::Grant { grant }) => grant.depends_on.clone(),
            MigrationStep::Grant(GrantOperation::Revoke { grant }) => grant.depends_on.clone(),
            // Other operations use catalog.forward_deps exclusively
            _ => vec![],
        }
    }
}
