//! DOT rendering of the resolved dependency graph, emitted to stderr when
//! `--debug`/`DEBUG=1` is set. Grounded in the `petgraph` dependency already
//! pulled in for the resolver's own topological sort.

use crate::catalog::Catalog;
use crate::diff::operations::MigrationStep;
use crate::resolver::{RelevantEdges, Source};

/// Render the relevant dependency edges among `steps` as a Graphviz `dot`
/// document, for `--debug` inspection of why the resolver ordered things the
/// way it did.
pub fn render_dot(steps: &[MigrationStep], old_catalog: &Catalog, new_catalog: &Catalog) -> String {
    let relevant = RelevantEdges::compute_for_debug(steps, old_catalog, new_catalog);
    let mut out = String::from("digraph dependencies {\n  rankdir=LR;\n");
    for step in steps {
        out.push_str(&format!(
            "  \"{}\" [label=\"{}\"];\n",
            step.id().stable_id(),
            step.id().stable_id()
        ));
    }
    for (dependent, referenced, source) in relevant.iter_edges() {
        let style = match source {
            Source::Main => "solid",
            Source::Branch => "dashed",
        };
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [style={}];\n",
            dependent.stable_id(),
            referenced.stable_id(),
            style
        ));
    }
    out.push_str("}\n");
    out
}
