//! In-memory mirror of the vault hierarchy.
//!
//! Nodes live in an arena owned by [`Tree`]; a parent owns its children by
//! index and children point back at their parent with a plain [`NodeId`].

mod build;
mod snapshot;

pub use build::build_tree;
pub use snapshot::{Snapshot, read_snapshot, write_snapshot};

use serde::{Deserialize, Serialize};

use crate::{Error, LookupError, Result};

/// Outcome of a path lookup: the node, or the reason nothing matched.
pub type Lookup = std::result::Result<NodeId, LookupError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    /// Vault-root-relative path of the containing directory ("" for the root level).
    directory: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn directory_path(&self) -> &str {
        &self.directory
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Name with its last extension removed ("a.tar.gz" -> "a.tar").
    pub fn stem(&self) -> &str {
        strip_extension(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree holding only a root directory.
    pub fn new() -> Self {
        Self::with_root("", "")
    }

    pub(crate) fn with_root(name: &str, directory: &str) -> Self {
        Self {
            nodes: vec![Node {
                name: name.to_string(),
                kind: NodeKind::Directory,
                directory: directory.to_string(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Panics if `id` was not minted by this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn add_dir(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.attach(parent, name.into(), NodeKind::Directory)
    }

    pub fn add_file(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.attach(parent, name.into(), NodeKind::File)
    }

    fn attach(&mut self, parent: NodeId, name: String, kind: NodeKind) -> Result<NodeId> {
        let Some(p) = self.get(parent) else {
            return Err(Error::InvalidInvocation(format!(
                "parent node {} does not exist",
                parent.0
            )));
        };
        if p.is_file() {
            return Err(Error::InvalidInvocation(format!(
                "cannot add {name:?} under file {:?}",
                p.name
            )));
        }
        let directory = self.vault_path(parent);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            kind,
            directory,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Full vault-root-relative path of a node, e.g. "/A/B/c.md" ("" for the root).
    pub fn vault_path(&self, id: NodeId) -> String {
        let n = self.node(id);
        join_path(&n.directory, &n.name)
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            depth += 1;
            cur = p;
        }
        depth
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    /// Depth-first, pre-order traversal starting at (and including) `from`.
    pub fn walk(&self, from: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![from],
        }
    }

    pub fn files(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.walk(self.root()).filter(|id| self.node(*id).is_file())
    }

    /// Looks a node up by its full vault path ("/A/b.md").
    pub fn find_by_vault_path(&self, path: &str) -> Option<NodeId> {
        let path = path.replace('\\', "/");
        match self.resolve_absolute(self.root(), &path) {
            Ok(Ok(id)) => Some(id),
            _ => None,
        }
    }

    /// Like [`Tree::find_by_vault_path`], but a missing node is an error.
    /// A missing leading `/` is tolerated ("notes/a.md").
    pub fn require_path(&self, path: &str) -> Result<NodeId> {
        let path = path.trim();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self.find_by_vault_path(&path)
            .ok_or(Error::UnknownNode(path))
    }

    /// Walks strictly downward from directory `from`, matching one segment per level.
    pub fn resolve_absolute(&self, from: NodeId, path: &str) -> Result<Lookup> {
        let start = self.node(from);
        if start.is_file() {
            return Err(Error::InvalidInvocation(format!(
                "cannot resolve absolute path {path:?} from file {:?}",
                self.vault_path(from)
            )));
        }

        let mut cur = from;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let next = self
                .children(cur)
                .iter()
                .copied()
                .find(|c| self.node(*c).name == part);
            match next {
                Some(n) => cur = n,
                None => {
                    return Ok(Err(LookupError::NotFound {
                        segment: part.to_string(),
                    }));
                }
            }
        }
        Ok(Ok(cur))
    }

    /// Resolves `./`, `../` and bare paths against `from`.
    pub fn resolve_relative(&self, from: NodeId, path: &str) -> Result<Lookup> {
        if path.starts_with('/') {
            return self.resolve_absolute(from, path);
        }
        if let Some(rest) = path.strip_prefix("./") {
            return self.resolve_relative(from, rest);
        }
        if let Some(rest) = path.strip_prefix("../") {
            return match self.parent(from) {
                Some(parent) => self.resolve_relative(parent, rest),
                None => Ok(Err(LookupError::NoParent)),
            };
        }
        self.resolve_absolute(from, &format!("/{path}"))
    }

    /// Every file in the tree containing `from` whose name is `name`, with or
    /// without its extension. Results are in traversal order.
    pub fn find_file_in_vault(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        let root = self.root_of(from);
        self.walk(root)
            .filter(|id| {
                let n = self.node(*id);
                n.is_file() && (n.name == name || n.stem() == name)
            })
            .collect()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

pub(crate) fn join_path(directory: &str, name: &str) -> String {
    if name.is_empty() {
        directory.to_string()
    } else {
        format!("{directory}/{name}")
    }
}

pub(crate) fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // /A/B/c.txt, /A/sib.txt, /Notes.md, /D/Notes, /D/Notes.txt, /D/Other.md
    fn sample() -> (Tree, Vec<NodeId>) {
        let mut t = Tree::new();
        let root = t.root();
        let a = t.add_dir(root, "A").unwrap();
        let b = t.add_dir(a, "B").unwrap();
        let c = t.add_file(b, "c.txt").unwrap();
        let sib = t.add_file(a, "sib.txt").unwrap();
        let notes_md = t.add_file(root, "Notes.md").unwrap();
        let d = t.add_dir(root, "D").unwrap();
        let notes = t.add_file(d, "Notes").unwrap();
        let notes_txt = t.add_file(d, "Notes.txt").unwrap();
        t.add_file(d, "Other.md").unwrap();
        (t, vec![a, b, c, sib, notes_md, d, notes, notes_txt])
    }

    #[test]
    fn directory_paths_follow_tree_position() {
        let (t, ids) = sample();
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        assert_eq!(t.node(t.root()).directory_path(), "");
        assert_eq!(t.node(a).directory_path(), "");
        assert_eq!(t.node(b).directory_path(), "/A");
        assert_eq!(t.node(c).directory_path(), "/A/B");
        assert_eq!(t.vault_path(c), "/A/B/c.txt");
        assert_eq!(t.depth(c), 3);
        assert_eq!(t.parent(c), Some(b));
    }

    #[test]
    fn absolute_resolution_is_exact() {
        let (t, ids) = sample();
        let root = t.root();
        assert_eq!(t.resolve_absolute(root, "/A/B/c.txt").unwrap(), Ok(ids[2]));
        assert_eq!(t.resolve_absolute(root, "A//B/c.txt").unwrap(), Ok(ids[2]));

        for (path, seg) in [("/X/B/c.txt", "X"), ("/A/X/c.txt", "X"), ("/A/B/x.txt", "x.txt")] {
            assert_eq!(
                t.resolve_absolute(root, path).unwrap(),
                Err(LookupError::NotFound {
                    segment: seg.into()
                })
            );
        }
        // Never walks sideways: B is not a child of the root.
        assert!(t.resolve_absolute(root, "/B/c.txt").unwrap().is_err());
    }

    #[test]
    fn absolute_resolution_from_file_is_invalid() {
        let (t, ids) = sample();
        let err = t.resolve_absolute(ids[2], "/x").unwrap_err();
        assert!(matches!(err, Error::InvalidInvocation(_)));
    }

    #[test]
    fn relative_resolution_goes_up_then_down() {
        let (t, ids) = sample();
        let (a, b, c, sib) = (ids[0], ids[1], ids[2], ids[3]);
        // From directory B: parent is A.
        assert_eq!(t.resolve_relative(b, "../sib.txt").unwrap(), Ok(sib));
        // From file c: parent is B.
        assert_eq!(t.resolve_relative(c, "../c.txt").unwrap(), Ok(c));
        assert_eq!(t.resolve_relative(c, "../../sib.txt").unwrap(), Ok(sib));
        assert_eq!(t.resolve_relative(a, "./B/c.txt").unwrap(), Ok(c));
        assert_eq!(t.resolve_relative(a, "B/c.txt").unwrap(), Ok(c));
        assert_eq!(t.resolve_relative(t.root(), "/A/sib.txt").unwrap(), Ok(sib));
    }

    #[test]
    fn relative_resolution_above_root_fails() {
        let (t, _) = sample();
        assert_eq!(
            t.resolve_relative(t.root(), "../A").unwrap(),
            Err(LookupError::NoParent)
        );
    }

    #[test]
    fn vault_search_matches_with_and_without_extension() {
        let (t, ids) = sample();
        let found = t.find_file_in_vault(ids[2], "Notes");
        assert_eq!(found, vec![ids[4], ids[6], ids[7]]);
        assert_eq!(t.find_file_in_vault(t.root(), "Notes.txt"), vec![ids[7]]);
        assert!(t.find_file_in_vault(t.root(), "Missing").is_empty());
        // Directories never match.
        assert!(t.find_file_in_vault(t.root(), "A").is_empty());
    }

    #[test]
    fn files_cannot_have_children() {
        let (mut t, ids) = sample();
        assert!(matches!(
            t.add_file(ids[2], "x"),
            Err(Error::InvalidInvocation(_))
        ));
    }

    #[test]
    fn walk_is_preorder() {
        let (t, _) = sample();
        let names: Vec<_> = t.walk(t.root()).map(|id| t.vault_path(id)).collect();
        assert_eq!(
            names,
            vec![
                "",
                "/A",
                "/A/B",
                "/A/B/c.txt",
                "/A/sib.txt",
                "/Notes.md",
                "/D",
                "/D/Notes",
                "/D/Notes.txt",
                "/D/Other.md",
            ]
        );
    }

    #[test]
    fn require_path_reports_unknown_nodes() {
        let (t, ids) = sample();
        assert_eq!(t.require_path("A/B/c.txt").unwrap(), ids[2]);
        assert_eq!(t.require_path(" /A/sib.txt ").unwrap(), ids[3]);
        match t.require_path("A/missing.md") {
            Err(Error::UnknownNode(path)) => assert_eq!(path, "/A/missing.md"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
