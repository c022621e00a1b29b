use crate::render::quote_ident;

/// A globally unique identifier for any database object this crate tracks.
///
/// One variant per object kind in the closed universe (see module docs on
/// `crate::catalog`). Identity fields live directly on the variant so that
/// pattern matches stay exhaustive as kinds are added — the compiler is the
/// enforcement mechanism for "every kind is handled everywhere".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DbObjectId {
    Schema {
        name: String,
    },
    Role {
        name: String,
    },
    RoleMembership {
        role: String,
        member: String,
    },
    Extension {
        name: String,
    },
    Language {
        name: String,
    },
    Collation {
        schema: String,
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    /// A single column of a table or materialized view, used only as a
    /// dependency-edge target (views/policies/triggers that reference a
    /// specific column depend on this, not the whole table) — never stands
    /// alone as a change subject.
    Column {
        schema: String,
        table: String,
        column: String,
    },
    View {
        schema: String,
        name: String,
    },
    MaterializedView {
        schema: String,
        name: String,
    },
    Type {
        schema: String,
        name: String,
    },
    Domain {
        schema: String,
        name: String,
    },
    CompositeType {
        schema: String,
        name: String,
    },
    Range {
        schema: String,
        name: String,
    },
    Function {
        schema: String,
        name: String,
        arguments: String,
    },
    Sequence {
        schema: String,
        name: String,
    },
    Index {
        schema: String,
        name: String,
    },
    Constraint {
        schema: String,
        table: String,
        name: String,
    },
    Trigger {
        schema: String,
        table: String,
        name: String,
    },
    EventTrigger {
        name: String,
    },
    Rule {
        schema: String,
        table: String,
        name: String,
    },
    RlsPolicy {
        schema: String,
        table: String,
        name: String,
    },
    Publication {
        name: String,
    },
    Subscription {
        name: String,
    },
    Aggregate {
        schema: String,
        name: String,
        arguments: String,
    },
    /// Object-level privilege grant. `id` is the composite identifier
    /// `"<grantee>@<object_type>:<object_name>"` produced by `Grant::id`.
    Grant {
        id: String,
    },
    /// Column-level privilege grant. `id` is
    /// `"<grantee>@column:<schema>.<table>.<column>"`.
    ColumnGrant {
        id: String,
    },
    /// Default-privilege entry (`ALTER DEFAULT PRIVILEGES ...`). `id` is
    /// `"<grantor>@<grantee>@default:<schema-or-'*'>.<object_type>"`.
    DefaultGrant {
        id: String,
    },
    Comment {
        object_id: Box<DbObjectId>,
    },
}

impl DbObjectId {
    /// Get the schema name for this object, if applicable.
    ///
    /// Returns `None` for database-wide objects (Schema itself, Role,
    /// RoleMembership, Extension, Language, EventTrigger, Publication,
    /// Subscription), composite-identifier objects (Grant, ColumnGrant,
    /// DefaultGrant), and delegates through Comment.
    pub fn schema(&self) -> Option<&str> {
        match self {
            DbObjectId::Schema { name } => Some(name.as_str()),
            DbObjectId::Table { schema, .. }
            | DbObjectId::Column { schema, .. }
            | DbObjectId::View { schema, .. }
            | DbObjectId::MaterializedView { schema, .. }
            | DbObjectId::Type { schema, .. }
            | DbObjectId::Domain { schema, .. }
            | DbObjectId::CompositeType { schema, .. }
            | DbObjectId::Range { schema, .. }
            | DbObjectId::Collation { schema, .. }
            | DbObjectId::Function { schema, .. }
            | DbObjectId::Sequence { schema, .. }
            | DbObjectId::Index { schema, .. }
            | DbObjectId::Constraint { schema, .. }
            | DbObjectId::Trigger { schema, .. }
            | DbObjectId::Rule { schema, .. }
            | DbObjectId::RlsPolicy { schema, .. }
            | DbObjectId::Aggregate { schema, .. } => Some(schema.as_str()),
            DbObjectId::Role { .. }
            | DbObjectId::RoleMembership { .. }
            | DbObjectId::Extension { .. }
            | DbObjectId::Language { .. }
            | DbObjectId::EventTrigger { .. }
            | DbObjectId::Publication { .. }
            | DbObjectId::Subscription { .. }
            | DbObjectId::Grant { .. }
            | DbObjectId::ColumnGrant { .. }
            | DbObjectId::DefaultGrant { .. } => None,
            DbObjectId::Comment { object_id } => object_id.schema(),
        }
    }

    /// The object kind name used as the prefix of a stable ID, matching the
    /// closed universe's kind names.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DbObjectId::Schema { .. } => "schema",
            DbObjectId::Role { .. } => "role",
            DbObjectId::RoleMembership { .. } => "rolemembership",
            DbObjectId::Extension { .. } => "extension",
            DbObjectId::Language { .. } => "language",
            DbObjectId::Collation { .. } => "collation",
            DbObjectId::Table { .. } => "table",
            DbObjectId::Column { .. } => "column",
            DbObjectId::View { .. } => "view",
            DbObjectId::MaterializedView { .. } => "materializedView",
            DbObjectId::Type { .. } => "enum",
            DbObjectId::Domain { .. } => "domain",
            DbObjectId::CompositeType { .. } => "compositeType",
            DbObjectId::Range { .. } => "range",
            DbObjectId::Function { .. } => "procedure",
            DbObjectId::Sequence { .. } => "sequence",
            DbObjectId::Index { .. } => "index",
            DbObjectId::Constraint { .. } => "constraint",
            DbObjectId::Trigger { .. } => "trigger",
            DbObjectId::EventTrigger { .. } => "eventTrigger",
            DbObjectId::Rule { .. } => "rule",
            DbObjectId::RlsPolicy { .. } => "rlsPolicy",
            DbObjectId::Publication { .. } => "publication",
            DbObjectId::Subscription { .. } => "subscription",
            DbObjectId::Aggregate { .. } => "aggregate",
            DbObjectId::Grant { .. } => "objectPrivilegeSet",
            DbObjectId::ColumnGrant { .. } => "columnPrivilegeSet",
            DbObjectId::DefaultGrant { .. } => "defaultPrivilegeSet",
            DbObjectId::Comment { .. } => "comment",
        }
    }

    /// Render the canonical `"<kind>:<identity>"` stable-ID string.
    ///
    /// This is the cross-catalog currency used for display, JSON output,
    /// and string-keyed dependency bookkeeping; the enum itself remains the
    /// primary in-process representation.
    pub fn stable_id(&self) -> String {
        let kind = self.kind_name();
        match self {
            DbObjectId::Schema { name } | DbObjectId::Extension { name } => {
                format!("{kind}:{name}")
            }
            DbObjectId::Role { name }
            | DbObjectId::Language { name }
            | DbObjectId::EventTrigger { name }
            | DbObjectId::Publication { name }
            | DbObjectId::Subscription { name } => {
                format!("{kind}:{name}")
            }
            DbObjectId::RoleMembership { role, member } => {
                format!("{kind}:{member}@{role}")
            }
            DbObjectId::Table { schema, name }
            | DbObjectId::View { schema, name }
            | DbObjectId::MaterializedView { schema, name }
            | DbObjectId::Type { schema, name }
            | DbObjectId::Domain { schema, name }
            | DbObjectId::CompositeType { schema, name }
            | DbObjectId::Range { schema, name }
            | DbObjectId::Collation { schema, name }
            | DbObjectId::Sequence { schema, name }
            | DbObjectId::Index { schema, name } => {
                format!("{kind}:{schema}.{name}")
            }
            DbObjectId::Constraint { schema, table, name }
            | DbObjectId::Trigger { schema, table, name }
            | DbObjectId::Rule { schema, table, name }
            | DbObjectId::RlsPolicy { schema, table, name } => {
                format!("{kind}:{schema}.{table}.{name}")
            }
            DbObjectId::Column { schema, table, column } => {
                format!("{kind}:{schema}.{table}.{column}")
            }
            DbObjectId::Function { schema, name, arguments }
            | DbObjectId::Aggregate { schema, name, arguments } => {
                format!("{kind}:{schema}.{name}({arguments})")
            }
            DbObjectId::Grant { id } | DbObjectId::ColumnGrant { id } | DbObjectId::DefaultGrant { id } => {
                format!("{kind}:{id}")
            }
            DbObjectId::Comment { object_id } => {
                format!("comment:{}", object_id.stable_id())
            }
        }
    }

    /// Render a double-quoted, schema-qualified SQL identifier for this
    /// object, where that's meaningful (schema-scoped kinds only).
    pub fn qualified_sql_name(&self) -> Option<String> {
        match self {
            DbObjectId::Table { schema, name }
            | DbObjectId::View { schema, name }
            | DbObjectId::MaterializedView { schema, name }
            | DbObjectId::Type { schema, name }
            | DbObjectId::Domain { schema, name }
            | DbObjectId::CompositeType { schema, name }
            | DbObjectId::Range { schema, name }
            | DbObjectId::Collation { schema, name }
            | DbObjectId::Sequence { schema, name }
            | DbObjectId::Index { schema, name } => {
                Some(format!("{}.{}", quote_ident(schema), quote_ident(name)))
            }
            _ => None,
        }
    }
}

pub trait DependsOn {
    fn id(&self) -> DbObjectId;
    fn depends_on(&self) -> &[DbObjectId];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_method() {
        assert_eq!(
            DbObjectId::Schema {
                name: "public".to_string()
            }
            .schema(),
            Some("public")
        );

        assert_eq!(
            DbObjectId::Table {
                schema: "app".to_string(),
                name: "users".to_string()
            }
            .schema(),
            Some("app")
        );

        assert_eq!(
            DbObjectId::Function {
                schema: "utils".to_string(),
                name: "calculate".to_string(),
                arguments: "integer".to_string()
            }
            .schema(),
            Some("utils")
        );

        assert_eq!(
            DbObjectId::Grant {
                id: "user@table:public.users".to_string()
            }
            .schema(),
            None
        );

        assert_eq!(
            DbObjectId::Extension {
                name: "pgcrypto".to_string()
            }
            .schema(),
            None
        );

        assert_eq!(
            DbObjectId::RoleMembership {
                role: "admins".to_string(),
                member: "alice".to_string()
            }
            .schema(),
            None
        );

        assert_eq!(
            DbObjectId::Comment {
                object_id: Box::new(DbObjectId::Table {
                    schema: "test".to_string(),
                    name: "items".to_string()
                })
            }
            .schema(),
            Some("test")
        );
    }

    #[test]
    fn test_stable_id_format() {
        assert_eq!(
            DbObjectId::Table {
                schema: "public".to_string(),
                name: "users".to_string()
            }
            .stable_id(),
            "table:public.users"
        );

        assert_eq!(
            DbObjectId::RlsPolicy {
                schema: "public".to_string(),
                table: "users".to_string(),
                name: "owner_only".to_string()
            }
            .stable_id(),
            "rlsPolicy:public.users.owner_only"
        );

        assert_eq!(
            DbObjectId::Function {
                schema: "public".to_string(),
                name: "calc".to_string(),
                arguments: "integer, integer".to_string()
            }
            .stable_id(),
            "procedure:public.calc(integer, integer)"
        );

        assert_eq!(
            DbObjectId::RoleMembership {
                role: "admins".to_string(),
                member: "alice".to_string()
            }
            .stable_id(),
            "rolemembership:alice@admins"
        );

        assert_eq!(
            DbObjectId::Comment {
                object_id: Box::new(DbObjectId::Schema {
                    name: "public".to_string()
                })
            }
            .stable_id(),
            "comment:schema:public"
        );
    }

    #[test]
    fn test_stable_id_is_injective_across_kinds() {
        // Same identity fields, different kinds, must not collide.
        let table = DbObjectId::Table {
            schema: "public".to_string(),
            name: "widgets".to_string(),
        };
        let view = DbObjectId::View {
            schema: "public".to_string(),
            name: "widgets".to_string(),
        };
        assert_ne!(table.stable_id(), view.stable_id());
    }
}
