use crate::tree::strip_extension;
use crate::{NodeId, Subpath, Tree, VaultConfig};

/// Navigable href for a node: `link_base` + directory + name, with the
/// document extension dropped and every segment percent-encoded.
pub fn href_for(tree: &Tree, cfg: &VaultConfig, id: NodeId, subpath: Option<&Subpath>) -> String {
    let node = tree.node(id);
    let mut href = cfg.link_base.trim_end_matches('/').to_string();
    for part in node.directory_path().split('/').filter(|p| !p.is_empty()) {
        href.push('/');
        href.push_str(&urlencoding::encode(part));
    }
    href.push('/');
    href.push_str(&urlencoding::encode(&label_for(cfg, node.name())));

    match subpath {
        Some(Subpath::Heading(h)) => {
            href.push('#');
            href.push_str(&urlencoding::encode(h));
        }
        Some(Subpath::Block(b)) => {
            href.push_str("#^");
            href.push_str(&urlencoding::encode(b));
        }
        None => {}
    }
    href
}

/// File name with a document extension removed; other names are unchanged.
pub fn label_for<'a>(cfg: &VaultConfig, name: &'a str) -> &'a str {
    if cfg.is_document(name) {
        strip_extension(name)
    } else {
        name
    }
}

pub fn link_markup(display: &str, href: &str, embed: bool) -> String {
    let bang = if embed { "!" } else { "" };
    format!("{bang}[{display}]({href})")
}

/// Inert markup for a link whose target does not exist.
pub fn broken_markup(display: &str) -> String {
    format!("<span class=\"broken-link\">{}</span>", escape_html(display))
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
