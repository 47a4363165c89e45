use tracing::{debug, trace};

use crate::tree::strip_extension;
use crate::{Error, LinkToken, NodeId, Result, Tree, VaultConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(NodeId),
    /// Nothing in the vault matched; carries the target as written.
    Broken { target: String },
}

impl Resolution {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            Resolution::Broken { .. } => None,
        }
    }
}

/// Resolves wiki-link targets against a fully built tree.
///
/// Strategies run in order and fall through on failure:
/// 1. explicit paths (`/abs`, `./rel`, `../rel`), also trying each document
///    extension when the last segment has none;
/// 2. vault-wide search for the last path segment, then for the whole target;
/// 3. among several matches, the one whose directory path length is closest
///    to the source's (first in traversal order on ties).
#[derive(Debug, Clone, Copy)]
pub struct LinkResolver<'a> {
    tree: &'a Tree,
    cfg: &'a VaultConfig,
}

impl<'a> LinkResolver<'a> {
    pub fn new(tree: &'a Tree, cfg: &'a VaultConfig) -> Self {
        Self { tree, cfg }
    }

    pub fn resolve(&self, token: &LinkToken, source: NodeId) -> Result<Resolution> {
        if token.target.is_empty() {
            return Ok(if token.is_self_reference() {
                Resolution::Resolved(source)
            } else {
                Resolution::Broken {
                    target: token.raw.trim().to_string(),
                }
            });
        }

        if let Some(id) = self.by_path(token, source)? {
            trace!(link = %token.target, resolved = %self.tree.vault_path(id), "resolved by path");
            return Ok(Resolution::Resolved(id));
        }

        let mut matches = self.tree.find_file_in_vault(source, token.file_name());
        // Only helps targets the last-segment heuristic would mangle.
        if matches.is_empty() && token.file_name() != token.target {
            matches = self.tree.find_file_in_vault(source, &token.target);
        }

        match pick_nearest(self.tree, &matches, source) {
            Some(id) => {
                if matches.len() > 1 {
                    debug!(
                        link = %token.target,
                        candidates = matches.len(),
                        picked = %self.tree.vault_path(id),
                        "ambiguous link target; picked nearest by directory path length"
                    );
                }
                Ok(Resolution::Resolved(id))
            }
            None => {
                debug!(
                    source = %self.tree.vault_path(source),
                    link = %token.target,
                    "broken link"
                );
                Ok(Resolution::Broken {
                    target: token.target.clone(),
                })
            }
        }
    }

    /// Parses and resolves the inner text of a `[[...]]` token.
    pub fn resolve_str(&self, raw: &str, source: NodeId) -> Result<Option<(LinkToken, Resolution)>> {
        let Some(token) = LinkToken::parse(raw) else {
            return Ok(None);
        };
        let resolution = self.resolve(&token, source)?;
        Ok(Some((token, resolution)))
    }

    fn by_path(&self, token: &LinkToken, source: NodeId) -> Result<Option<NodeId>> {
        let target = token.target.as_str();
        // "/" is vault-root-relative; "./" and "../" start at the directory
        // holding the source, since a file has no children of its own.
        let base = if target.starts_with('/') {
            self.tree.root_of(source)
        } else if target.starts_with("./") || target.starts_with("../") {
            self.tree.parent(source).ok_or_else(|| {
                Error::InvalidInvocation(format!(
                    "cannot resolve relative link {target:?} from the vault root"
                ))
            })?
        } else {
            return Ok(None);
        };

        for candidate in self.path_candidates(token) {
            match self.tree.resolve_relative(base, &candidate)? {
                Ok(id) if self.tree.node(id).is_file() => return Ok(Some(id)),
                Ok(_) => trace!(path = %candidate, "path names a directory"),
                Err(reason) => trace!(path = %candidate, %reason, "path lookup failed"),
            }
        }
        Ok(None)
    }

    fn path_candidates(&self, token: &LinkToken) -> Vec<String> {
        let mut out = vec![token.target.clone()];
        let name = token.file_name();
        if strip_extension(name) == name {
            out.extend(
                self.cfg
                    .document_extensions
                    .iter()
                    .map(|ext| format!("{}.{ext}", token.target)),
            );
        }
        out
    }
}

/// Picks the candidate whose directory path length is closest to the
/// source's. This is a string-length proxy for hierarchy distance, not a
/// real path metric; ties keep the first candidate.
pub fn pick_nearest(tree: &Tree, candidates: &[NodeId], source: NodeId) -> Option<NodeId> {
    let want = path_len(tree, source);
    candidates
        .iter()
        .copied()
        .min_by_key(|c| path_len(tree, *c).abs_diff(want))
}

fn path_len(tree: &Tree, id: NodeId) -> usize {
    tree.node(id).directory_path().chars().count()
}
