use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{Error, NodeId, Result, Tree, Vault, VaultConfig};

/// Scans the whole vault into a fresh [`Tree`].
///
/// The root node has an empty name so every `directory_path` stays
/// vault-root-relative. Entries are enumerated sorted by file name, and
/// hidden entries (per [`VaultConfig::hidden_prefix`]) are skipped together
/// with everything below them.
pub fn build_tree(vault: &Vault) -> Result<Tree> {
    let root = vault.root();
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut tree = Tree::new();
    let top = tree.root();
    scan_dir(&mut tree, top, root, vault.config())?;
    info!(
        root = %root.display(),
        nodes = tree.len(),
        files = tree.files().count(),
        "vault tree built"
    );
    Ok(tree)
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn scan_dir(tree: &mut Tree, id: NodeId, abs: &Path, cfg: &VaultConfig) -> Result<()> {
    debug!(dir = %tree.vault_path(id), "scanning directory");

    // Enumerate the whole directory before attaching anything.
    let mut entries = Vec::new();
    for entry in WalkDir::new(abs)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if cfg.is_hidden(&name) {
            debug!(entry = %entry.path().display(), "skipping hidden entry");
            continue;
        }
        entries.push(Entry {
            name,
            path: entry.path().to_path_buf(),
            is_dir: entry.file_type().is_dir(),
        });
    }

    for e in entries {
        if e.is_dir {
            let child = tree.add_dir(id, e.name)?;
            scan_dir(tree, child, &e.path, cfg)?;
        } else {
            tree.add_file(id, e.name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sorted_tree_and_skips_hidden_entries() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("B/inner")).unwrap();
        std::fs::create_dir_all(root.join("A")).unwrap();
        std::fs::create_dir_all(root.join(".obsidian")).unwrap();
        std::fs::write(root.join(".obsidian/app.json"), "{}").unwrap();
        std::fs::write(root.join(".hidden.md"), "").unwrap();
        std::fs::write(root.join("B/inner/deep.md"), "").unwrap();
        std::fs::write(root.join("A/x.md"), "").unwrap();
        std::fs::write(root.join("top.md"), "").unwrap();

        let vault = Vault::open(root).unwrap();
        let tree = build_tree(&vault).unwrap();
        let paths: Vec<_> = tree.walk(tree.root()).map(|id| tree.vault_path(id)).collect();
        assert_eq!(
            paths,
            vec!["", "/A", "/A/x.md", "/B", "/B/inner", "/B/inner/deep.md", "/top.md"]
        );

        let deep = tree.find_by_vault_path("/B/inner/deep.md").unwrap();
        assert_eq!(tree.node(deep).directory_path(), "/B/inner");
    }

    #[test]
    fn empty_directories_are_kept() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("empty")).unwrap();

        let vault = Vault::open(temp.path()).unwrap();
        let tree = build_tree(&vault).unwrap();
        let empty = tree.find_by_vault_path("/empty").unwrap();
        assert!(tree.node(empty).is_dir());
        assert!(tree.children(empty).is_empty());
    }
}
