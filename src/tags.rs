use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use crate::links::{Fences, wikilink_regex};
use crate::render::href_for;
use crate::{NodeId, Tree, VaultConfig};

/// Tag name -> documents containing it, deduplicated per tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIndex {
    palette_size: usize,
    tags: BTreeMap<String, BTreeSet<NodeId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagListing {
    pub tag: String,
    /// Palette class in `1..=palette_size`.
    pub class: usize,
    /// `(href, label)` per document, in tree order.
    pub entries: Vec<(String, String)>,
}

impl TagIndex {
    pub fn new(palette_size: usize) -> Self {
        Self {
            palette_size: palette_size.max(1),
            tags: BTreeMap::new(),
        }
    }

    /// Returns false if `doc` was already recorded for `tag`.
    pub fn insert(&mut self, tag: &str, doc: NodeId) -> bool {
        self.tags.entry(tag.to_string()).or_default().insert(doc)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn documents(&self, tag: &str) -> impl Iterator<Item = NodeId> + '_ {
        self.tags.get(tag).into_iter().flatten().copied()
    }

    pub fn tags_of(&self, doc: NodeId) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|(_, docs)| docs.contains(&doc))
            .map(|(tag, _)| tag.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn class_for(&self, tag: &str) -> usize {
        tag_class(tag, self.palette_size)
    }

    /// One listing per tag, sorted by tag name.
    pub fn listings(&self, tree: &Tree, cfg: &VaultConfig) -> Vec<TagListing> {
        self.tags
            .iter()
            .map(|(tag, docs)| TagListing {
                tag: tag.clone(),
                class: self.class_for(tag),
                entries: docs
                    .iter()
                    .map(|d| (href_for(tree, cfg, *d, None), tree.node(*d).name().to_string()))
                    .collect(),
            })
            .collect()
    }
}

/// Stable colour class for a tag, derived from a SHA-256 of its name.
pub fn tag_class(tag: &str, palette_size: usize) -> usize {
    let digest = Sha256::digest(tag.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % palette_size.max(1) as u64) as usize + 1
}

/// Tags from YAML frontmatter (`tags:` / `tag:`) followed by inline `#tags`
/// in the body. Fenced code is ignored. Order is first occurrence.
pub fn extract_tags(content: &str) -> Vec<String> {
    let (frontmatter, body) = split_frontmatter(content);
    let mut out: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !out.contains(&tag) {
            out.push(tag);
        }
    };

    if let Some(fm) = &frontmatter {
        for tag in frontmatter_tags(fm) {
            push(tag);
        }
    }

    let mut fences = Fences::default();
    for line in body.lines() {
        if fences.in_code(line) {
            continue;
        }
        for tag in inline_tags(&blank_wikilinks(line)) {
            push(tag);
        }
    }
    out
}

/// `line` with every `[[...]]` span replaced by spaces of the same length,
/// so `[[Note#Heading]]` never reads as a tag.
fn blank_wikilinks(line: &str) -> String {
    let mut out = line.to_string();
    for m in wikilink_regex().find_iter(line) {
        out.replace_range(m.range(), &" ".repeat(m.len()));
    }
    out
}

fn split_frontmatter(content: &str) -> (Option<serde_yaml::Value>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut idx = 0usize;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let fm_text = &rest[..idx];
            let body = &rest[idx + line.len()..];
            // Broken frontmatter contributes no tags but still counts as frontmatter.
            return (serde_yaml::from_str(fm_text).ok(), body);
        }
        idx += line.len();
    }
    (None, content)
}

fn frontmatter_tags(fm: &serde_yaml::Value) -> Vec<String> {
    let mut out = Vec::new();
    let Some(map) = fm.as_mapping() else {
        return out;
    };

    for key in ["tags", "tag"] {
        let Some(v) = map.get(key) else {
            continue;
        };
        match v {
            serde_yaml::Value::Sequence(seq) => {
                out.extend(seq.iter().filter_map(|i| i.as_str()).filter_map(normalize_tag));
            }
            serde_yaml::Value::String(s) => {
                out.extend(
                    s.split(|c: char| c.is_whitespace() || c == ',')
                        .filter_map(normalize_tag),
                );
            }
            _ => {}
        }
    }
    out
}

fn inline_tags(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let bytes = line.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'#' {
            i += 1;
            continue;
        }

        // Heading markers ("# Title", "## Sub") are not tags.
        if i + 1 < bytes.len() && matches!(bytes[i + 1], b' ' | b'#') {
            i += 1;
            while i < bytes.len() && bytes[i] == b'#' {
                i += 1;
            }
            continue;
        }

        if i > 0 {
            let prev = bytes[i - 1] as char;
            if prev.is_alphanumeric() || prev == '/' || prev == '&' {
                i += 1;
                continue;
            }
        }

        let mut j = i + 1;
        while j < bytes.len() && is_tag_char(bytes[j] as char) {
            j += 1;
        }
        if let Some(tag) = normalize_tag(&line[i + 1..j]) {
            out.push(tag);
        }
        i = j.max(i + 1);
    }
    out
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/')
}

fn normalize_tag(raw: &str) -> Option<String> {
    let s = raw.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    let s = s.trim_matches('/').trim();
    // Pure numbers ("#1") are issue references, not tags.
    if s.is_empty() || s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(s.to_string())
}
