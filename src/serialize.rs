//! Turns an ordered list of migration steps into one executable SQL script.
//!
//! The teacher inlines the equivalent join-and-header logic once per output
//! format inside its CLI layer; here it is pulled into one function the core
//! owns, since the serializer is a named component of the pipeline and not
//! just a CLI concern.

use crate::catalog::CatalogContext;
use crate::diff::operations::MigrationStep;
use crate::render::SqlRenderer;

#[derive(Debug, Clone, Copy)]
pub struct SerializeOptions {
    pub pretty: bool,
    pub indent_width: u8,
    pub uppercase_keywords: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_width: 4,
            uppercase_keywords: true,
        }
    }
}

/// Render a full migration script, one statement per line (or blank-line
/// separated when `opts.pretty`), preceded by a header comment naming the
/// tool and the server version the steps were diffed against.
pub fn render_script(steps: &[MigrationStep], opts: SerializeOptions, ctx: &CatalogContext) -> String {
    // Every per-kind renderer already terminates its own statement with `;`,
    // so the separator between statements must not add another one.
    let separator = if opts.pretty { "\n\n" } else { "\n" };

    // Every per-kind renderer already emits upper-case keywords, which is
    // the common case; `uppercase_keywords` is accepted here for when a
    // renderer grows a lower-case mode rather than rewritten post hoc.
    let _ = opts.uppercase_keywords;

    let statements: Vec<String> = steps
        .iter()
        .flat_map(|step| step.to_sql())
        .map(|rendered| rendered.sql)
        .collect();

    let mut script = header(ctx);
    script.push_str(&statements.join(separator));
    if !statements.is_empty() && !script.ends_with(';') {
        script.push(';');
        script.push('\n');
    }
    script
}

fn header(ctx: &CatalogContext) -> String {
    format!(
        "-- Generated by pgcatdiff against server_version_num {}\n",
        ctx.server_version
    )
}
