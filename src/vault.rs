use std::path::{Path, PathBuf};

use tracing::warn;

use crate::{Error, NodeId, Result, Tree, VaultConfig};

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    cfg: VaultConfig,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(root, VaultConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, cfg: VaultConfig) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(Error::VaultNotFound(root));
        }
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }
        let root = std::fs::canonicalize(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self { root, cfg })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &VaultConfig {
        &self.cfg
    }

    /// Filesystem location of a tree node.
    pub fn to_abs(&self, tree: &Tree, id: NodeId) -> PathBuf {
        let rel = tree.vault_path(id);
        let mut abs = self.root.clone();
        for part in rel.split('/').filter(|p| !p.is_empty()) {
            abs.push(part);
        }
        abs
    }

    /// Reads a document as text. Invalid UTF-8 is replaced, not rejected.
    pub fn read_document(&self, tree: &Tree, id: NodeId) -> Result<String> {
        let abs = self.to_abs(tree, id);
        let bytes = std::fs::read(&abs).map_err(|e| Error::io(&abs, e))?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(path = %abs.display(), "document is not valid UTF-8; decoding lossily");
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }
}
