//! Fetch materialized views and their dependencies via pg_depend.

use anyhow::Result;
use sqlx::postgres::PgConnection;
use sqlx::postgres::types::Oid;
use tracing::info;

use crate::catalog::utils::is_system_schema;
use crate::catalog::{DependsOn, comments::Commentable, id::DbObjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedView {
    pub schema: String,
    pub name: String,
    pub definition: String,
    /// Whether the view currently holds data (`relispopulated`); a freshly
    /// created materialized view starts out unpopulated until `REFRESH
    /// MATERIALIZED VIEW` or `CREATE ... WITH DATA` runs.
    pub populated: bool,
    pub comment: Option<String>,
    pub depends_on: Vec<DbObjectId>,
}

impl DependsOn for MaterializedView {
    fn id(&self) -> DbObjectId {
        DbObjectId::MaterializedView {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    fn depends_on(&self) -> &[DbObjectId] {
        &self.depends_on
    }
}

impl Commentable for MaterializedView {
    fn comment(&self) -> &Option<String> {
        &self.comment
    }
}

#[derive(sqlx::FromRow)]
struct RawMaterializedView {
    oid: Oid,
    schema: String,
    name: String,
    definition: String,
    populated: bool,
    comment: Option<String>,
}

/// Fetch all materialized views, then populate `depends_on` via pg_depend
/// (same strategy as regular views: tables, columns, types, and functions
/// referenced by the defining query).
pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<MaterializedView>> {
    info!("Fetching materialized views...");
    let raw: Vec<RawMaterializedView> = sqlx::query_as!(
        RawMaterializedView,
        r#"
        SELECT
            c.oid AS "oid!",
            n.nspname AS "schema!",
            c.relname AS "name!",
            pg_catalog.pg_get_viewdef(c.oid, true) AS "definition!",
            c.relispopulated AS "populated!",
            d.description AS "comment?"
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_description d ON d.objoid = c.oid AND d.objsubid = 0
        WHERE c.relkind = 'm'
        ORDER BY n.nspname, c.relname
        "#
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut result = Vec::new();
    for row in raw {
        if is_system_schema(&row.schema) {
            continue;
        }

        let deps = sqlx::query!(
            r#"
            SELECT DISTINCT
                refclass.relname AS "refclass!",
                cls.relkind::text AS "cls_relkind?",
                cls_n.nspname AS "cls_schema?",
                cls.relname AS "cls_name?",
                proc.proname AS "proc_name?",
                proc_n.nspname AS "proc_schema?",
                (
                    SELECT string_agg(pg_catalog.format_type(argtype.type_oid, NULL), ',' ORDER BY argtype.ord)
                    FROM unnest(proc.proargtypes) WITH ORDINALITY AS argtype(type_oid, ord)
                ) AS "proc_args?"
            FROM pg_depend dep
            JOIN pg_class refclass ON dep.refclassid = refclass.oid
            LEFT JOIN pg_class cls ON refclass.relname = 'pg_class' AND dep.refobjid = cls.oid
            LEFT JOIN pg_namespace cls_n ON cls.relnamespace = cls_n.oid
            LEFT JOIN pg_proc proc ON refclass.relname = 'pg_proc' AND dep.refobjid = proc.oid
            LEFT JOIN pg_namespace proc_n ON proc.pronamespace = proc_n.oid
            WHERE dep.objid = $1 AND dep.classid = 'pg_rewrite'::regclass
            "#,
            row.oid
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut depends_on = Vec::new();
        for dep in deps {
            if let (Some(cls_schema), Some(cls_name), Some(cls_relkind)) =
                (dep.cls_schema, dep.cls_name, dep.cls_relkind)
            {
                if is_system_schema(&cls_schema) || cls_schema == row.schema && cls_name == row.name
                {
                    continue;
                }
                let dep_id = match cls_relkind.as_str() {
                    "m" => DbObjectId::MaterializedView {
                        schema: cls_schema,
                        name: cls_name,
                    },
                    "v" => DbObjectId::View {
                        schema: cls_schema,
                        name: cls_name,
                    },
                    _ => DbObjectId::Table {
                        schema: cls_schema,
                        name: cls_name,
                    },
                };
                if !depends_on.contains(&dep_id) {
                    depends_on.push(dep_id);
                }
            }

            if let (Some(proc_schema), Some(proc_name)) = (dep.proc_schema, dep.proc_name) {
                if !is_system_schema(&proc_schema) {
                    let dep_id = DbObjectId::Function {
                        schema: proc_schema,
                        name: proc_name,
                        arguments: dep.proc_args.clone().unwrap_or_default(),
                    };
                    if !depends_on.contains(&dep_id) {
                        depends_on.push(dep_id);
                    }
                }
            }
        }

        depends_on.push(DbObjectId::Schema {
            name: row.schema.clone(),
        });

        result.push(MaterializedView {
            schema: row.schema,
            name: row.name,
            definition: row.definition,
            populated: row.populated,
            comment: row.comment,
            depends_on,
        });
    }

    Ok(result)
}
