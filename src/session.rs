use tracing::{debug, info};

use crate::links::{Fences, find_wikilinks};
use crate::render::{broken_markup, href_for, link_markup};
use crate::tags::extract_tags;
use crate::{
    Error, LinkGraph, LinkResolver, LinkToken, NodeId, Resolution, Result, TagIndex, Tree, Vault,
    VaultConfig,
};

/// State for one run over a vault.
///
/// Owns the link graph and tag index while documents are rewritten (pass 1).
/// [`Session::finish`] hands both out as a [`RunIndex`] for the backlink pass.
pub struct Session<'a> {
    tree: &'a Tree,
    cfg: &'a VaultConfig,
    resolver: LinkResolver<'a>,
    graph: LinkGraph,
    tags: TagIndex,
    documents: usize,
}

/// Link graph and tag index of a completed first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIndex {
    pub graph: LinkGraph,
    pub tags: TagIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenDocument {
    pub node: NodeId,
    pub body: String,
}

impl<'a> Session<'a> {
    pub fn new(tree: &'a Tree, cfg: &'a VaultConfig) -> Self {
        Self {
            tree,
            cfg,
            resolver: LinkResolver::new(tree, cfg),
            graph: LinkGraph::new(),
            tags: TagIndex::new(cfg.tag_palette_size),
            documents: 0,
        }
    }

    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// Resolves one token written in `source` and records the outcome.
    ///
    /// Only links that land on a document enter the graph; a broken link is
    /// recorded as an outgoing edge against its raw target. References into
    /// the source itself (`[[#heading]]`) are not edges.
    pub fn resolve(&mut self, token: &LinkToken, source: NodeId) -> Result<Resolution> {
        let resolution = self.resolver.resolve(token, source)?;
        match &resolution {
            Resolution::Resolved(_) if token.is_self_reference() => {}
            Resolution::Resolved(target) => {
                if self.cfg.is_document(self.tree.node(*target).name()) {
                    self.graph.record_link(source, *target);
                }
            }
            Resolution::Broken { target } => self.graph.record_broken(source, target.clone()),
        }
        Ok(resolution)
    }

    /// Replaces every `[[...]]` token in `body` with rendered output.
    /// Fenced code blocks are copied unchanged.
    pub fn rewrite_links(&mut self, doc: NodeId, body: &str) -> Result<String> {
        let mut out = String::with_capacity(body.len());
        let mut fences = Fences::default();
        for line in body.split_inclusive('\n') {
            if fences.in_code(line) {
                out.push_str(line);
                continue;
            }

            let mut last = 0usize;
            for (range, token) in find_wikilinks(line) {
                out.push_str(&line[last..range.start]);
                let rendered = match self.resolve(&token, doc)? {
                    Resolution::Resolved(target) => link_markup(
                        &token.display,
                        &href_for(self.tree, self.cfg, target, token.subpath.as_ref()),
                        token.embed,
                    ),
                    Resolution::Broken { .. } => broken_markup(&token.display),
                };
                out.push_str(&rendered);
                last = range.end;
            }
            out.push_str(&line[last..]);
        }
        Ok(out)
    }

    /// Adds every tag found in `content` to the tag index.
    pub fn index_tags(&mut self, doc: NodeId, content: &str) {
        for tag in extract_tags(content) {
            self.tags.insert(&tag, doc);
        }
    }

    /// First-pass rule set for one document: tag extraction, then link substitution.
    pub fn rewrite_document(&mut self, doc: NodeId, content: &str) -> Result<String> {
        if !self.tree.node(doc).is_file() {
            return Err(Error::InvalidInvocation(format!(
                "{:?} is not a document",
                self.tree.vault_path(doc)
            )));
        }
        debug!(doc = %self.tree.vault_path(doc), "rewriting document");
        self.index_tags(doc, content);
        let body = self.rewrite_links(doc, content)?;
        self.documents += 1;
        Ok(body)
    }

    pub fn finish(self) -> RunIndex {
        info!(
            documents = self.documents,
            edges = self.graph.edge_count(),
            broken = self.graph.broken().count(),
            tags = self.tags.len(),
            "first pass complete"
        );
        RunIndex {
            graph: self.graph,
            tags: self.tags,
        }
    }
}

/// Documents of the tree in traversal order.
pub fn documents<'t>(tree: &'t Tree, cfg: &'t VaultConfig) -> impl Iterator<Item = NodeId> + 't {
    tree.files()
        .filter(move |id| cfg.is_document(tree.node(*id).name()))
}

/// Reads and rewrites every document of the vault, in tree order.
pub fn first_pass(vault: &Vault, tree: &Tree) -> Result<(RunIndex, Vec<RewrittenDocument>)> {
    let cfg = vault.config();
    let mut session = Session::new(tree, cfg);
    let mut out = Vec::new();
    for doc in documents(tree, cfg) {
        let content = vault.read_document(tree, doc)?;
        let body = session.rewrite_document(doc, &content)?;
        out.push(RewrittenDocument { node: doc, body });
    }
    Ok((session.finish(), out))
}

/// Appends a backlink section to every document using the finished graph.
pub fn second_pass(
    tree: &Tree,
    cfg: &VaultConfig,
    index: &RunIndex,
    docs: Vec<RewrittenDocument>,
) -> Vec<RewrittenDocument> {
    docs.into_iter()
        .map(|d| RewrittenDocument {
            body: crate::backlinks::append_backlinks(&d.body, tree, cfg, &index.graph, d.node),
            node: d.node,
        })
        .collect()
}
