use std::fmt::Write;

use crate::render::{escape_html, href_for, label_for};
use crate::{LinkEdge, LinkGraph, NodeId, Tree, VaultConfig};

/// Renders the "connected notes" block for `doc`: one list of outgoing and
/// one of incoming references. Broken outgoing links are not listed.
///
/// Takes the graph by shared reference, so it can only run once the first
/// pass has finished and released it.
pub fn render_backlinks(tree: &Tree, cfg: &VaultConfig, graph: &LinkGraph, doc: NodeId) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"connected-notes\">\n");
    push_list(&mut out, "Outgoing Links", tree, cfg, graph.outgoing(doc));
    push_list(&mut out, "Incoming Links", tree, cfg, graph.incoming(doc));
    out.push_str("</div>\n");
    out
}

pub fn append_backlinks(
    body: &str,
    tree: &Tree,
    cfg: &VaultConfig,
    graph: &LinkGraph,
    doc: NodeId,
) -> String {
    let mut out = body.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&render_backlinks(tree, cfg, graph, doc));
    out
}

fn push_list<'g>(
    out: &mut String,
    title: &str,
    tree: &Tree,
    cfg: &VaultConfig,
    edges: impl Iterator<Item = &'g LinkEdge>,
) {
    let _ = writeln!(out, "<h3>{title}</h3>");
    out.push_str("<div class=\"connected-notes-list\">\n");
    for id in edges.filter_map(LinkEdge::node) {
        let label = label_for(cfg, tree.node(id).name());
        let _ = writeln!(
            out,
            "<div class=\"connected-note\"><a href=\"{}\">{}</a></div>",
            escape_html(&href_for(tree, cfg, id, None)),
            escape_html(label)
        );
    }
    out.push_str("</div>\n");
}
