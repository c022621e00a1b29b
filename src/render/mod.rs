pub mod aggregate;
pub mod collation;
pub mod column_grant;
pub mod comment;
pub mod constraint;
pub mod default_grant;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod function;
pub mod grant;
pub mod language;
pub mod materialized_view;
pub mod policy;
pub mod publication;
pub mod role;
pub mod role_membership;
pub mod rule;
pub mod schema;
pub mod sequence;
pub mod sql;
pub mod subscription;
pub mod table;
pub mod trigger;
pub mod types;
pub mod view;

use crate::catalog::id::DbObjectId;
use crate::diff::operations::MigrationStep;

/// Trait for rendering SQL from operations
pub trait SqlRenderer {
    fn to_sql(&self) -> Vec<RenderedSql>;
    fn db_object_id(&self) -> DbObjectId;
    fn is_destructive(&self) -> bool {
        false
    }
    /// Whether this step's statements may be wrapped in `BEGIN;`/`COMMIT;`
    /// alongside other steps. `CREATE INDEX CONCURRENTLY` and
    /// `REINDEX CONCURRENTLY` cannot run inside a transaction block.
    fn allows_transaction(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

#[derive(Debug, Clone)]
pub struct RenderedSql {
    pub safety: Safety,
    pub sql: String,
}

impl RenderedSql {
    pub fn new(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: String) -> Self {
        Self {
            sql,
            safety: Safety::Destructive,
        }
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Generic helper for rendering comment SQL
pub fn render_comment_sql(
    object_type: &str,
    identifier: &str,
    comment: Option<&str>,
) -> RenderedSql {
    let sql = match comment {
        Some(comment_text) => format!(
            "COMMENT ON {} {} IS {};",
            object_type,
            identifier,
            escape_string(comment_text)
        ),
        None => format!("COMMENT ON {} {} IS NULL;", object_type, identifier),
    };

    RenderedSql {
        sql,
        safety: Safety::Safe,
    }
}

impl SqlRenderer for MigrationStep {
    fn to_sql(&self) -> Vec<RenderedSql> {
        match self {
            MigrationStep::Schema(op) => op.to_sql(),
            MigrationStep::Role(op) => op.to_sql(),
            MigrationStep::RoleMembership(op) => op.to_sql(),
            MigrationStep::Table(op) => op.to_sql(),
            MigrationStep::View(op) => op.to_sql(),
            MigrationStep::MaterializedView(op) => op.to_sql(),
            MigrationStep::Type(op) => op.to_sql(),
            MigrationStep::Domain(op) => op.to_sql(),
            MigrationStep::Sequence(op) => op.to_sql(),
            MigrationStep::Function(op) => op.to_sql(),
            MigrationStep::Aggregate(op) => op.to_sql(),
            MigrationStep::Index(op) => op.to_sql(),
            MigrationStep::Constraint(op) => op.to_sql(),
            MigrationStep::Trigger(op) => op.to_sql(),
            MigrationStep::EventTrigger(op) => op.to_sql(),
            MigrationStep::Rule(op) => op.to_sql(),
            MigrationStep::Extension(op) => op.to_sql(),
            MigrationStep::Language(op) => op.to_sql(),
            MigrationStep::Collation(op) => op.to_sql(),
            MigrationStep::Publication(op) => op.to_sql(),
            MigrationStep::Subscription(op) => op.to_sql(),
            MigrationStep::Grant(op) => op.to_sql(),
            MigrationStep::ColumnGrant(op) => op.to_sql(),
            MigrationStep::DefaultGrant(op) => op.to_sql(),
            MigrationStep::Policy(op) => op.to_sql(),
        }
    }

    fn db_object_id(&self) -> DbObjectId {
        match self {
            MigrationStep::Schema(op) => op.db_object_id(),
            MigrationStep::Role(op) => op.db_object_id(),
            MigrationStep::RoleMembership(op) => op.db_object_id(),
            MigrationStep::Table(op) => op.db_object_id(),
            MigrationStep::View(op) => op.db_object_id(),
            MigrationStep::MaterializedView(op) => op.db_object_id(),
            MigrationStep::Type(op) => op.db_object_id(),
            MigrationStep::Domain(op) => op.db_object_id(),
            MigrationStep::Sequence(op) => op.db_object_id(),
            MigrationStep::Function(op) => op.db_object_id(),
            MigrationStep::Aggregate(op) => op.db_object_id(),
            MigrationStep::Index(op) => op.db_object_id(),
            MigrationStep::Constraint(op) => op.db_object_id(),
            MigrationStep::Trigger(op) => op.db_object_id(),
            MigrationStep::EventTrigger(op) => op.db_object_id(),
            MigrationStep::Rule(op) => op.db_object_id(),
            MigrationStep::Extension(op) => op.db_object_id(),
            MigrationStep::Language(op) => op.db_object_id(),
            MigrationStep::Collation(op) => op.db_object_id(),
            MigrationStep::Publication(op) => op.db_object_id(),
            MigrationStep::Subscription(op) => op.db_object_id(),
            MigrationStep::Grant(op) => op.db_object_id(),
            MigrationStep::ColumnGrant(op) => op.db_object_id(),
            MigrationStep::DefaultGrant(op) => op.db_object_id(),
            MigrationStep::Policy(op) => op.db_object_id(),
        }
    }

    fn is_destructive(&self) -> bool {
        match self {
            MigrationStep::Schema(op) => op.is_destructive(),
            MigrationStep::Role(op) => op.is_destructive(),
            MigrationStep::RoleMembership(op) => op.is_destructive(),
            MigrationStep::Table(op) => op.is_destructive(),
            MigrationStep::View(op) => op.is_destructive(),
            MigrationStep::MaterializedView(op) => op.is_destructive(),
            MigrationStep::Type(op) => op.is_destructive(),
            MigrationStep::Domain(op) => op.is_destructive(),
            MigrationStep::Sequence(op) => op.is_destructive(),
            MigrationStep::Function(op) => op.is_destructive(),
            MigrationStep::Aggregate(op) => op.is_destructive(),
            MigrationStep::Index(op) => op.is_destructive(),
            MigrationStep::Constraint(op) => op.is_destructive(),
            MigrationStep::Trigger(op) => op.is_destructive(),
            MigrationStep::EventTrigger(op) => op.is_destructive(),
            MigrationStep::Rule(op) => op.is_destructive(),
            MigrationStep::Extension(op) => op.is_destructive(),
            MigrationStep::Language(op) => op.is_destructive(),
            MigrationStep::Collation(op) => op.is_destructive(),
            MigrationStep::Publication(op) => op.is_destructive(),
            MigrationStep::Subscription(op) => op.is_destructive(),
            MigrationStep::Grant(op) => op.is_destructive(),
            MigrationStep::ColumnGrant(op) => op.is_destructive(),
            MigrationStep::DefaultGrant(op) => op.is_destructive(),
            MigrationStep::Policy(op) => op.is_destructive(),
        }
    }

    fn allows_transaction(&self) -> bool {
        match self {
            MigrationStep::Schema(op) => op.allows_transaction(),
            MigrationStep::Role(op) => op.allows_transaction(),
            MigrationStep::RoleMembership(op) => op.allows_transaction(),
            MigrationStep::Table(op) => op.allows_transaction(),
            MigrationStep::View(op) => op.allows_transaction(),
            MigrationStep::MaterializedView(op) => op.allows_transaction(),
            MigrationStep::Type(op) => op.allows_transaction(),
            MigrationStep::Domain(op) => op.allows_transaction(),
            MigrationStep::Sequence(op) => op.allows_transaction(),
            MigrationStep::Function(op) => op.allows_transaction(),
            MigrationStep::Aggregate(op) => op.allows_transaction(),
            MigrationStep::Index(op) => op.allows_transaction(),
            MigrationStep::Constraint(op) => op.allows_transaction(),
            MigrationStep::Trigger(op) => op.allows_transaction(),
            MigrationStep::EventTrigger(op) => op.allows_transaction(),
            MigrationStep::Rule(op) => op.allows_transaction(),
            MigrationStep::Extension(op) => op.allows_transaction(),
            MigrationStep::Language(op) => op.allows_transaction(),
            MigrationStep::Collation(op) => op.allows_transaction(),
            MigrationStep::Publication(op) => op.allows_transaction(),
            MigrationStep::Subscription(op) => op.allows_transaction(),
            MigrationStep::Grant(op) => op.allows_transaction(),
            MigrationStep::ColumnGrant(op) => op.allows_transaction(),
            MigrationStep::DefaultGrant(op) => op.allows_transaction(),
            MigrationStep::Policy(op) => op.allows_transaction(),
        }
    }
}
