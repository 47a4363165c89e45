use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subpath {
    Heading(String),
    Block(String),
}

/// A parsed `[[target#sub|display]]` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkToken {
    /// Inner text between the brackets, as written.
    pub raw: String,
    /// Path-like target with `\` converted to `/` and the subpath removed.
    pub target: String,
    pub subpath: Option<Subpath>,
    /// Explicit label after `|`, otherwise the target as written.
    pub display: String,
    /// Written as `![[...]]`.
    pub embed: bool,
}

impl LinkToken {
    /// Parses the inner text of a wiki-link. Returns `None` only for blank tokens.
    ///
    /// The target may come out empty: `[[#Setup]]` points into the linking
    /// document itself, while `[[|label]]` points nowhere.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let (before_alias, label) = match s.split_once('|') {
            Some((left, right)) => (left, Some(right.trim()).filter(|v| !v.is_empty())),
            None => (s, None),
        };

        let written = before_alias
            .trim()
            .replace('\\', "/")
            .trim_end_matches('/')
            .to_string();
        if written.is_empty() && label.is_none() {
            return None;
        }

        // Prefer a block reference if present, else a heading.
        let (target, subpath) = if let Some((left, right)) = written.split_once('^') {
            (
                left.trim(),
                Some(right.trim())
                    .filter(|b| !b.is_empty())
                    .map(|b| Subpath::Block(b.to_string())),
            )
        } else if let Some((left, right)) = written.split_once('#') {
            (
                left.trim(),
                Some(right.trim())
                    .filter(|h| !h.is_empty())
                    .map(|h| Subpath::Heading(h.to_string())),
            )
        } else {
            (written.as_str(), None)
        };
        let target = target.trim_end_matches('/');

        Some(Self {
            raw: raw.to_string(),
            target: target.to_string(),
            subpath,
            display: label.map(str::to_string).unwrap_or_else(|| written.clone()),
            embed: false,
        })
    }

    /// Last path segment of the target ("a/b/c.md" -> "c.md").
    pub fn file_name(&self) -> &str {
        self.target.rsplit('/').next().unwrap_or(&self.target)
    }

    /// `[[#heading]]` or `[[^block]]`: a reference into the linking document.
    pub fn is_self_reference(&self) -> bool {
        self.target.is_empty() && self.subpath.is_some()
    }
}

pub(crate) fn wikilink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!?)\[\[([^\[\]]+)\]\]").expect("wikilink pattern is valid"))
}

/// Every wiki-link on a single line, in order, with byte ranges into the line.
pub(crate) fn find_wikilinks(line: &str) -> Vec<(std::ops::Range<usize>, LinkToken)> {
    wikilink_regex()
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(2)?.as_str();
            let mut token = LinkToken::parse(inner)?;
            token.embed = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            Some((whole.range(), token))
        })
        .collect()
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    ["```", "~~~"].into_iter().find(|m| line.starts_with(m))
}

/// Tracks fenced code blocks across lines. A block opened with backticks is
/// only closed by backticks, likewise for tildes.
#[derive(Debug, Default)]
pub(crate) struct Fences {
    open: Option<&'static str>,
}

impl Fences {
    /// True if `line` is a fence line or lies inside a fenced block.
    pub(crate) fn in_code(&mut self, line: &str) -> bool {
        let Some(marker) = fence_marker(line) else {
            return self.open.is_some();
        };
        match self.open {
            None => self.open = Some(marker),
            Some(open) if open == marker => self.open = None,
            Some(_) => {}
        }
        true
    }
}
