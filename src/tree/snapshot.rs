use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Node, NodeId, NodeKind, Tree, join_path};
use crate::{Error, Result};

/// Plain nested record of a (sub)tree, independent of the filesystem.
///
/// Files carry `children: null`; directories always carry an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub directory: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub children: Option<Vec<Snapshot>>,
}

impl Tree {
    pub fn to_snapshot(&self, id: NodeId) -> Snapshot {
        let n: &Node = self.node(id);
        Snapshot {
            name: n.name.clone(),
            directory: n.directory.clone(),
            kind: n.kind,
            children: n.is_dir().then(|| {
                n.children
                    .iter()
                    .map(|c| self.to_snapshot(*c))
                    .collect()
            }),
        }
    }

    /// Rebuilds a tree from a snapshot; the snapshot's top record becomes the root.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        check_record(snapshot)?;
        let mut tree = Tree::with_root(&snapshot.name, &snapshot.directory);
        tree.nodes[0].kind = snapshot.kind;
        let root = tree.root();
        for child in snapshot.children.iter().flatten() {
            attach_record(&mut tree, root, child)?;
        }
        Ok(tree)
    }
}

fn attach_record(tree: &mut Tree, parent: NodeId, rec: &Snapshot) -> Result<()> {
    check_record(rec)?;
    let expected = tree.vault_path(parent);
    if rec.directory != expected {
        return Err(Error::InvalidSnapshot(format!(
            "{:?} claims directory {:?} but sits under {:?}",
            rec.name, rec.directory, expected
        )));
    }
    match rec.kind {
        NodeKind::File => {
            tree.add_file(parent, rec.name.clone())?;
        }
        NodeKind::Directory => {
            let id = tree.add_dir(parent, rec.name.clone())?;
            for child in rec.children.iter().flatten() {
                attach_record(tree, id, child)?;
            }
        }
    }
    Ok(())
}

fn check_record(rec: &Snapshot) -> Result<()> {
    if rec.kind == NodeKind::File && rec.children.is_some() {
        return Err(Error::InvalidSnapshot(format!(
            "file {:?} has children",
            join_path(&rec.directory, &rec.name)
        )));
    }
    if rec.name.contains('/') {
        return Err(Error::InvalidSnapshot(format!(
            "node name {:?} contains a path separator",
            rec.name
        )));
    }
    Ok(())
}

pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json).map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), "tree snapshot written");
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut t = Tree::new();
        let root = t.root();
        let a = t.add_dir(root, "A").unwrap();
        t.add_file(a, "x.md").unwrap();
        t.add_dir(a, "empty").unwrap();
        let b = t.add_dir(root, "B").unwrap();
        t.add_file(b, "x.md").unwrap();
        t.add_file(root, "readme.md").unwrap();
        t
    }

    #[test]
    fn round_trip_reproduces_the_tree() {
        let tree = sample();
        let snap = tree.to_snapshot(tree.root());
        let back = Tree::from_snapshot(&snap).unwrap();
        assert_eq!(back, tree);
        assert_eq!(back.to_snapshot(back.root()), snap);
    }

    #[test]
    fn subtree_round_trip_keeps_directory_paths() {
        let tree = sample();
        let a = tree.find_by_vault_path("/A").unwrap();
        let snap = tree.to_snapshot(a);
        let back = Tree::from_snapshot(&snap).unwrap();
        assert_eq!(back.to_snapshot(back.root()), snap);
        let x = back.find_by_vault_path("/x.md").unwrap();
        assert_eq!(back.node(x).directory_path(), "/A");
    }

    #[test]
    fn json_shape_uses_null_children_for_files() {
        let tree = sample();
        let value = serde_json::to_value(tree.to_snapshot(tree.root())).unwrap();
        assert_eq!(value["type"], "directory");
        assert_eq!(value["children"][0]["name"], "A");
        assert_eq!(value["children"][0]["children"][0]["directory"], "/A");
        assert_eq!(value["children"][0]["children"][0]["type"], "file");
        assert!(value["children"][0]["children"][0]["children"].is_null());
        assert_eq!(value["children"][0]["children"][1]["children"], serde_json::json!([]));
    }

    #[test]
    fn inconsistent_directory_is_rejected() {
        let tree = sample();
        let mut snap = tree.to_snapshot(tree.root());
        snap.children.as_mut().unwrap()[0].directory = "/elsewhere".into();
        assert!(matches!(
            Tree::from_snapshot(&snap),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn file_with_children_is_rejected() {
        let snap = Snapshot {
            name: "a.md".into(),
            directory: String::new(),
            kind: NodeKind::File,
            children: Some(Vec::new()),
        };
        assert!(matches!(
            Tree::from_snapshot(&snap),
            Err(Error::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn snapshot_file_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("dir_tree.json");
        let tree = sample();
        write_snapshot(&path, &tree.to_snapshot(tree.root())).unwrap();
        let back = Tree::from_snapshot(&read_snapshot(&path).unwrap()).unwrap();
        assert_eq!(back, tree);
    }
}
