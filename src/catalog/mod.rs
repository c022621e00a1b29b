use crate::catalog::id::{DbObjectId, DependsOn};
use crate::diff::functions::{format_attributes, format_parameter_list, format_return_clause};
use crate::diff::operations::{
    ConstraintIdentifier, ConstraintOperation, FunctionOperation, MigrationStep, PolicyIdentifier,
    PolicyOperation, TableOperation, TriggerIdentifier, TriggerOperation, ViewOperation,
};
use sqlx::PgPool;
use std::collections::BTreeMap;

pub mod aggregate;
pub mod collation;
pub mod column_grant;
pub mod comments;
pub mod constraint;
pub mod custom_type;
pub mod default_grant;
pub mod domain;
pub mod event_trigger;
pub mod extension;
pub mod function;
pub mod grant;
pub mod id;
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
pub mod triggers;
pub mod utils;
pub mod view;

/// Connection-scoped facts about the server a catalog was extracted from.
///
/// Not itself a catalog object - carried alongside the object lists so the
/// serializer (`crate::serialize`) can stamp a script header without a
/// second round trip to the server.
#[derive(Debug, Clone)]
pub struct CatalogContext {
    pub server_version: i32,
    pub current_user: String,
}

impl Default for CatalogContext {
    fn default() -> Self {
        Self {
            server_version: 0,
            current_user: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub context: CatalogContext,
    pub schemas: Vec<schema::Schema>,
    pub roles: Vec<role::Role>,
    pub role_memberships: Vec<role_membership::RoleMembership>,
    pub tables: Vec<table::Table>,
    pub views: Vec<view::View>,
    pub materialized_views: Vec<materialized_view::MaterializedView>,
    pub types: Vec<custom_type::CustomType>,
    pub domains: Vec<domain::Domain>,
    pub functions: Vec<function::Function>,
    pub aggregates: Vec<aggregate::Aggregate>,
    pub sequences: Vec<sequence::Sequence>,
    pub indexes: Vec<index::Index>,
    pub constraints: Vec<constraint::Constraint>,
    pub triggers: Vec<triggers::Trigger>,
    pub event_triggers: Vec<event_trigger::EventTrigger>,
    pub rules: Vec<rule::Rule>,
    pub policies: Vec<policy::Policy>,
    pub extensions: Vec<extension::Extension>,
    pub languages: Vec<language::Language>,
    pub collations: Vec<collation::Collation>,
    pub publications: Vec<publication::Publication>,
    pub subscriptions: Vec<subscription::Subscription>,
    pub grants: Vec<grant::Grant>,
    pub column_grants: Vec<column_grant::ColumnGrant>,
    pub default_grants: Vec<default_grant::DefaultGrant>,

    pub forward_deps: BTreeMap<DbObjectId, Vec<DbObjectId>>,
    pub reverse_deps: BTreeMap<DbObjectId, Vec<DbObjectId>>,
}

impl Catalog {
    /// Load a full catalog snapshot from a live connection pool.
    ///
    /// Extraction fans every per-kind `fetch` out concurrently (they are all
    /// I/O-bound `SELECT`s against `pg_catalog`) while still serializing
    /// through a single acquired connection: `pg_get_function_identity_arguments()`
    /// and related deparse functions depend on the connection's `search_path`,
    /// so every fetch must observe the same one. A `tokio::sync::Mutex` around
    /// the connection gives us that without a connection-per-fetch checkout,
    /// trading fetch-level parallelism for a guarantee that matters more here
    /// than raw throughput.
    pub async fn load(pool: &PgPool) -> anyhow::Result<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query("SET search_path = public, pg_catalog")
            .execute(&mut *conn)
            .await?;

        let version_row = sqlx::query!("SHOW server_version_num")
            .fetch_one(&mut *conn)
            .await?;
        let server_version: i32 = version_row
            .server_version_num
            .unwrap_or_default()
            .parse()
            .unwrap_or(0);
        let user_row = sqlx::query!("SELECT current_user AS \"current_user!\"")
            .fetch_one(&mut *conn)
            .await?;
        let context = CatalogContext {
            server_version,
            current_user: user_row.current_user,
        };

        let conn = tokio::sync::Mutex::new(conn);

        let (schemas, roles, role_memberships, tables, views, materialized_views) = tokio::try_join!(
            async { schema::fetch(&mut *conn.lock().await).await },
            async { role::fetch(&mut *conn.lock().await).await },
            async { role_membership::fetch(&mut *conn.lock().await).await },
            async { table::fetch(&mut *conn.lock().await).await },
            async { view::fetch(&mut *conn.lock().await).await },
            async { materialized_view::fetch(&mut *conn.lock().await).await },
        )?;

        let (types, domains, functions, aggregates, sequences, indexes) = tokio::try_join!(
            async { custom_type::fetch(&mut *conn.lock().await).await },
            async { domain::fetch(&mut *conn.lock().await).await },
            async { function::fetch(&mut *conn.lock().await).await },
            async { aggregate::fetch(&mut *conn.lock().await).await },
            async { sequence::fetch(&mut *conn.lock().await).await },
            async { index::fetch(&mut *conn.lock().await).await },
        )?;

        let (constraints, triggers, event_triggers, rules, policies, extensions) = tokio::try_join!(
            async { constraint::fetch(&mut *conn.lock().await).await },
            async { triggers::fetch(&mut *conn.lock().await).await },
            async { event_trigger::fetch(&mut *conn.lock().await).await },
            async { rule::fetch(&mut *conn.lock().await).await },
            async { policy::fetch(&mut *conn.lock().await).await },
            async { extension::fetch(&mut *conn.lock().await).await },
        )?;

        let (languages, collations, publications, subscriptions, grants, column_grants, default_grants) = tokio::try_join!(
            async { language::fetch(&mut *conn.lock().await).await },
            async { collation::fetch(&mut *conn.lock().await).await },
            async { publication::fetch(&mut *conn.lock().await).await },
            async { subscription::fetch(&mut *conn.lock().await).await },
            async { grant::fetch(&mut *conn.lock().await).await },
            async { column_grant::fetch(&mut *conn.lock().await).await },
            async { default_grant::fetch(&mut *conn.lock().await).await },
        )?;

        let mut forward = BTreeMap::new();
        let mut reverse = BTreeMap::new();

        fn insert_deps<T: DependsOn>(
            items: &[T],
            fwd: &mut BTreeMap<DbObjectId, Vec<DbObjectId>>,
            rev: &mut BTreeMap<DbObjectId, Vec<DbObjectId>>,
        ) {
            for item in items {
                let id = item.id();
                let deps = item.depends_on();
                fwd.insert(id.clone(), deps.to_vec());

                for dep in deps {
                    rev.entry(dep.clone()).or_default().push(id.clone());
                }
            }
        }

        insert_deps(&roles, &mut forward, &mut reverse);
        insert_deps(&role_memberships, &mut forward, &mut reverse);
        insert_deps(&tables, &mut forward, &mut reverse);
        insert_deps(&views, &mut forward, &mut reverse);
        insert_deps(&materialized_views, &mut forward, &mut reverse);
        insert_deps(&types, &mut forward, &mut reverse);
        insert_deps(&domains, &mut forward, &mut reverse);
        insert_deps(&functions, &mut forward, &mut reverse);
        insert_deps(&aggregates, &mut forward, &mut reverse);
        insert_deps(&sequences, &mut forward, &mut reverse);
        insert_deps(&indexes, &mut forward, &mut reverse);
        insert_deps(&constraints, &mut forward, &mut reverse);
        insert_deps(&triggers, &mut forward, &mut reverse);
        insert_deps(&event_triggers, &mut forward, &mut reverse);
        insert_deps(&rules, &mut forward, &mut reverse);
        insert_deps(&policies, &mut forward, &mut reverse);
        insert_deps(&extensions, &mut forward, &mut reverse);
        insert_deps(&languages, &mut forward, &mut reverse);
        insert_deps(&collations, &mut forward, &mut reverse);
        insert_deps(&publications, &mut forward, &mut reverse);
        insert_deps(&subscriptions, &mut forward, &mut reverse);
        insert_deps(&grants, &mut forward, &mut reverse);
        insert_deps(&column_grants, &mut forward, &mut reverse);
        insert_deps(&default_grants, &mut forward, &mut reverse);

        let catalog = Self {
            context,
            schemas,
            roles,
            role_memberships,
            tables,
            views,
            materialized_views,
            types,
            domains,
            functions,
            aggregates,
            sequences,
            indexes,
            constraints,
            triggers,
            event_triggers,
            rules,
            policies,
            extensions,
            languages,
            collations,
            publications,
            subscriptions,
            grants,
            column_grants,
            default_grants,
            forward_deps: forward,
            reverse_deps: reverse,
        };

        Ok(catalog)
    }

    /// The degenerate "nothing exists yet" catalog, used to diff a branch
    /// against a main that hasn't been created, or vice versa.
    pub fn empty() -> Self {
        Self {
            context: CatalogContext::default(),
            schemas: Vec::new(),
            roles: Vec::new(),
            role_memberships: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
            materialized_views: Vec::new(),
            types: Vec::new(),
            domains: Vec::new(),
            functions: Vec::new(),
            aggregates: Vec::new(),
            sequences: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            triggers: Vec::new(),
            event_triggers: Vec::new(),
            rules: Vec::new(),
            policies: Vec::new(),
            extensions: Vec::new(),
            languages: Vec::new(),
            collations: Vec::new(),
            publications: Vec::new(),
            subscriptions: Vec::new(),
            grants: Vec::new(),
            column_grants: Vec::new(),
            default_grants: Vec::new(),
            forward_deps: BTreeMap::new(),
            reverse_deps: BTreeMap::new(),
        }
    }

    pub fn find_view(&self, schema: &str, name: &str) -> Option<&view::View> {
        self.views
            .iter()
            .find(|v| v.schema == schema && v.name == name)
    }

    pub fn find_table(&self, schema: &str, name: &str) -> Option<&table::Table> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == name)
    }

    pub fn find_policy(&self, schema: &str, table: &str, name: &str) -> Option<&policy::Policy> {
        self.policies
            .iter()
            .find(|p| p.schema == schema && p.table_name == table && p.name == name)
    }

    pub fn find_constraint(
        &self,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Option<&constraint::Constraint> {
        self.constraints
            .iter()
            .find(|c| c.schema == schema && c.table == table && c.name == name)
    }

    pub fn find_function(
        &self,
        schema: &str,
        name: &str,
        arguments: &str,
    ) -> Option<&function::Function> {
        self.functions
            .iter()
            .find(|f| f.schema == schema && f.name == name && f.arguments == arguments)
    }

    pub fn find_trigger(
        &self,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Option<&triggers::Trigger> {
        self.triggers
            .iter()
            .find(|t| t.schema == schema && t.table_name == table && t.name == name)
    }

    /// Synthesize DROP and CREATE operations for cascading an object.
    ///
    /// This method is used when column type changes require dependent objects to be
    /// dropped and recreated. Returns None if the object type doesn't support cascading
    /// or if the object doesn't exist in the new catalog.
    ///
    /// When adding a new database object type to pgcatdiff, add a match arm here if the object
    /// can depend on table columns (e.g., views, functions, triggers, policies).
    pub fn synthesize_drop_create(
        &self,
        id: &DbObjectId,
        new_catalog: &Catalog,
    ) -> Option<(MigrationStep, MigrationStep)> {
        match id {
            DbObjectId::View { schema, name } => {
                let drop = MigrationStep::View(ViewOperation::Drop {
                    schema: schema.clone(),
                    name: name.clone(),
                });

                let view = new_catalog.find_view(schema, name)?;
                let create = MigrationStep::View(ViewOperation::Create {
                    schema: view.schema.clone(),
                    name: view.name.clone(),
                    definition: view.definition.clone(),
                    security_invoker: view.security_invoker,
                    security_barrier: view.security_barrier,
                });

                Some((drop, create))
            }

            DbObjectId::Table { schema, name } => {
                let drop = MigrationStep::Table(TableOperation::Drop {
                    schema: schema.clone(),
                    name: name.clone(),
                });

                let table = new_catalog.find_table(schema, name)?;
                let create = MigrationStep::Table(TableOperation::Create {
                    schema: table.schema.clone(),
                    name: table.name.clone(),
                    columns: table.columns.clone(),
                    primary_key: table.primary_key.clone(),
                });

                Some((drop, create))
            }

            DbObjectId::RlsPolicy {
                schema,
                table,
                name,
            } => {
                let drop = MigrationStep::Policy(PolicyOperation::Drop {
                    identifier: PolicyIdentifier {
                        schema: schema.clone(),
                        table: table.clone(),
                        name: name.clone(),
                    },
                });

                let policy = new_catalog.find_policy(schema, table, name)?;
                let create = MigrationStep::Policy(PolicyOperation::Create {
                    policy: Box::new(policy.clone()),
                });

                Some((drop, create))
            }

            DbObjectId::Constraint {
                schema,
                table,
                name,
            } => {
                let drop =
                    MigrationStep::Constraint(ConstraintOperation::Drop(ConstraintIdentifier {
                        schema: schema.clone(),
                        table: table.clone(),
                        name: name.clone(),
                    }));

                let constraint = new_catalog.find_constraint(schema, table, name)?;
                let create =
                    MigrationStep::Constraint(ConstraintOperation::Create(constraint.clone()));

                Some((drop, create))
            }

            DbObjectId::Function {
                schema,
                name,
                arguments,
            } => {
                let func = self.find_function(schema, name, arguments)?;
                let new_func = new_catalog.find_function(schema, name, arguments)?;

                let kind_str = match func.kind {
                    function::FunctionKind::Function => "FUNCTION",
                    function::FunctionKind::Procedure => "PROCEDURE",
                    function::FunctionKind::Aggregate => "AGGREGATE FUNCTION",
                };

                let param_types: Vec<String> = func
                    .parameters
                    .iter()
                    .map(|p| p.data_type.clone())
                    .collect();

                let drop = MigrationStep::Function(FunctionOperation::Drop {
                    schema: schema.clone(),
                    name: name.clone(),
                    arguments: arguments.clone(),
                    kind: kind_str.to_string(),
                    parameter_types: param_types.join(", "),
                });

                let create = MigrationStep::Function(FunctionOperation::Create {
                    schema: new_func.schema.clone(),
                    name: new_func.name.clone(),
                    arguments: new_func.arguments.clone(),
                    kind: kind_str.to_string(),
                    parameters: format_parameter_list(&new_func.parameters),
                    returns: format_return_clause(new_func),
                    attributes: format_attributes(new_func),
                    definition: new_func.definition.clone(),
                });

                Some((drop, create))
            }

            DbObjectId::Trigger {
                schema,
                table,
                name,
            } => {
                let drop = MigrationStep::Trigger(TriggerOperation::Drop {
                    identifier: TriggerIdentifier {
                        schema: schema.clone(),
                        table: table.clone(),
                        name: name.clone(),
                    },
                });

                let trigger = new_catalog.find_trigger(schema, table, name)?;
                let create = MigrationStep::Trigger(TriggerOperation::Create {
                    trigger: Box::new(trigger.clone()),
                });

                Some((drop, create))
            }

            // Other types don't need cascade support - they either don't depend on
            // table columns or are handled by regular diff logic
            _ => None,
        }
    }

    pub fn find_role(&self, name: &str) -> Option<&role::Role> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn find_materialized_view(
        &self,
        schema: &str,
        name: &str,
    ) -> Option<&materialized_view::MaterializedView> {
        self.materialized_views
            .iter()
            .find(|v| v.schema == schema && v.name == name)
    }

    pub fn find_rule(&self, schema: &str, table: &str, name: &str) -> Option<&rule::Rule> {
        self.rules
            .iter()
            .find(|r| r.schema == schema && r.table_name == table && r.name == name)
    }

    /// Check if the catalog contains an object with the given ID
    pub fn contains_id(&self, id: &DbObjectId) -> bool {
        match id {
            DbObjectId::Schema { name } => self.schemas.iter().any(|s| &s.name == name),
            DbObjectId::Table { schema, name } => self
                .tables
                .iter()
                .any(|t| &t.schema == schema && &t.name == name),
            DbObjectId::View { schema, name } => self
                .views
                .iter()
                .any(|v| &v.schema == schema && &v.name == name),
            DbObjectId::Type { schema, name } => self
                .types
                .iter()
                .any(|t| &t.schema == schema && &t.name == name),
            DbObjectId::Domain { schema, name } => self
                .domains
                .iter()
                .any(|d| &d.schema == schema && &d.name == name),
            DbObjectId::Function {
                schema,
                name,
                arguments,
            } => self
                .functions
                .iter()
                .any(|f| &f.schema == schema && &f.name == name && &f.arguments == arguments),
            DbObjectId::Aggregate {
                schema,
                name,
                arguments,
            } => self
                .aggregates
                .iter()
                .any(|a| &a.schema == schema && &a.name == name && &a.arguments == arguments),
            DbObjectId::Sequence { schema, name } => self
                .sequences
                .iter()
                .any(|s| &s.schema == schema && &s.name == name),
            DbObjectId::Index { schema, name } => self
                .indexes
                .iter()
                .any(|i| &i.schema == schema && &i.name == name),
            DbObjectId::Constraint {
                schema,
                table,
                name,
            } => self
                .constraints
                .iter()
                .any(|c| &c.schema == schema && &c.table == table && &c.name == name),
            DbObjectId::Trigger {
                schema,
                table,
                name,
            } => self
                .triggers
                .iter()
                .any(|t| &t.schema == schema && &t.table_name == table && &t.name == name),
            DbObjectId::RlsPolicy {
                schema,
                table,
                name,
            } => self
                .policies
                .iter()
                .any(|p| &p.schema == schema && &p.table_name == table && &p.name == name),
            DbObjectId::Extension { name } => self.extensions.iter().any(|e| &e.name == name),
            DbObjectId::Grant { id } => self.grants.iter().any(|g| &g.id() == id),
            DbObjectId::Role { name } => self.roles.iter().any(|r| &r.name == name),
            DbObjectId::RoleMembership { role, member } => self
                .role_memberships
                .iter()
                .any(|rm| &rm.role == role && &rm.member == member),
            DbObjectId::Language { name } => self.languages.iter().any(|l| &l.name == name),
            DbObjectId::Collation { schema, name } => self
                .collations
                .iter()
                .any(|c| &c.schema == schema && &c.name == name),
            DbObjectId::MaterializedView { schema, name } => self
                .materialized_views
                .iter()
                .any(|v| &v.schema == schema && &v.name == name),
            DbObjectId::CompositeType { schema, name } | DbObjectId::Range { schema, name } => {
                self.types
                    .iter()
                    .any(|t| &t.schema == schema && &t.name == name)
            }
            DbObjectId::EventTrigger { name } => {
                self.event_triggers.iter().any(|t| &t.name == name)
            }
            DbObjectId::Rule {
                schema,
                table,
                name,
            } => self
                .rules
                .iter()
                .any(|r| &r.schema == schema && &r.table_name == table && &r.name == name),
            DbObjectId::Publication { name } => self.publications.iter().any(|p| &p.name == name),
            DbObjectId::Subscription { name } => {
                self.subscriptions.iter().any(|s| &s.name == name)
            }
            DbObjectId::ColumnGrant { id } => self.column_grants.iter().any(|g| &g.id() == id),
            DbObjectId::DefaultGrant { id } => self.default_grants.iter().any(|g| &g.id() == id),
            // Sub-entity dependency-edge targets only; never a change subject on their own.
            DbObjectId::Column { .. } => false,
            DbObjectId::Comment { object_id } => self.contains_id(object_id),
        }
    }
}
