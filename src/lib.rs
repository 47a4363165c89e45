mod backlinks;
mod config;
mod error;
mod graph;
mod links;
mod render;
mod resolve;
mod session;
mod tags;
mod tree;
mod vault;

pub use crate::backlinks::{append_backlinks, render_backlinks};
pub use crate::config::VaultConfig;
pub use crate::error::{Error, LookupError, Result};
pub use crate::graph::{Direction, EdgeTarget, LinkEdge, LinkGraph};
pub use crate::links::{LinkToken, Subpath};
pub use crate::render::{broken_markup, href_for, label_for};
pub use crate::resolve::{LinkResolver, Resolution, pick_nearest};
pub use crate::session::{RewrittenDocument, RunIndex, Session, documents, first_pass, second_pass};
pub use crate::tags::{TagIndex, TagListing, extract_tags, tag_class};
pub use crate::tree::{
    Lookup, Node, NodeId, NodeKind, Snapshot, Tree, Walk, build_tree, read_snapshot,
    write_snapshot,
};
pub use crate::vault::Vault;
