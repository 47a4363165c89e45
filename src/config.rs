use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Entries whose name starts with this marker are skipped during the scan.
    pub hidden_prefix: String,
    /// File extensions (without dot) that are considered documents.
    pub document_extensions: Vec<String>,
    /// Prefix prepended to every rendered href (e.g. "/vault").
    pub link_base: String,
    /// Number of tag colour classes; tags map onto `1..=tag_palette_size`.
    pub tag_palette_size: usize,
    /// Where the tree snapshot is written (relative paths resolve against the cwd).
    pub snapshot_file: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            hidden_prefix: ".".into(),
            document_extensions: vec!["md".into()],
            link_base: String::new(),
            tag_palette_size: 4,
            snapshot_file: PathBuf::from("dir_tree.json"),
        }
    }
}

impl VaultConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(input).map_err(|err| Error::ConfigToml(err.to_string()))?;
        if cfg.tag_palette_size == 0 {
            return Err(Error::ConfigToml(
                "tag_palette_size must be at least 1".into(),
            ));
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let cfg = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(cfg)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        !self.hidden_prefix.is_empty() && name.starts_with(&self.hidden_prefix)
    }

    /// Returns the extension of `name` if it is one of the document extensions.
    pub fn document_extension<'a>(&self, name: &'a str) -> Option<&'a str> {
        let (_, ext) = name.rsplit_once('.')?;
        self.document_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
            .then_some(ext)
    }

    pub fn is_document(&self, name: &str) -> bool {
        self.document_extension(name).is_some()
    }
}
