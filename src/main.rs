use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vaultlink::{
    EdgeTarget, LinkResolver, LinkToken, NodeId, Resolution, RewrittenDocument, Tree, Vault,
    VaultConfig, build_tree, first_pass, render_backlinks, second_pass, write_snapshot,
};

#[derive(Debug, Parser)]
#[command(
    name = "vlink",
    version,
    about = "Vault tree, wiki-link resolution and backlink graph"
)]
struct Cli {
    /// Path to the vault.
    #[arg(long, env = "VAULT_PATH", global = true)]
    vault: Option<PathBuf>,

    /// Optional TOML config file.
    #[arg(long, env = "VAULT_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the directory tree snapshot as JSON.
    Tree {
        /// Write the snapshot to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the snapshot to the configured `snapshot_file`.
        #[arg(long, conflicts_with = "out")]
        save: bool,
    },
    /// List resolved and broken outgoing links per document.
    Links {
        /// Only print broken links.
        #[arg(long)]
        broken: bool,
    },
    /// Show outgoing and incoming links of one document.
    Backlinks {
        /// Document path relative to the vault (e.g. notes/a.md).
        #[arg(long)]
        note: String,

        /// Print the rendered HTML section instead of plain lists.
        #[arg(long)]
        html: bool,
    },
    /// List tags with their colour class and documents.
    Tags,
    /// Resolve a single link token as if written in a document.
    Resolve {
        /// Document the token is written in.
        #[arg(long)]
        from: String,

        /// Link token, with or without the surrounding brackets.
        token: String,
    },
    /// Print one document after link rewriting with its backlink section.
    Render {
        /// Document path relative to the vault.
        #[arg(long)]
        note: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let cfg = match &cli.config {
        Some(path) => VaultConfig::load(path)?,
        None => VaultConfig::default(),
    };
    let vault = Vault::with_config(require_vault(cli.vault)?, cfg)?;
    let tree = build_tree(&vault)?;

    match cli.command {
        Command::Tree { out, save } => {
            let out = out.or_else(|| save.then(|| vault.config().snapshot_file.clone()));
            handle_tree(&tree, out)?
        }
        Command::Links { broken } => handle_links(&vault, &tree, broken)?,
        Command::Backlinks { note, html } => handle_backlinks(&vault, &tree, &note, html)?,
        Command::Tags => handle_tags(&vault, &tree)?,
        Command::Resolve { from, token } => handle_resolve(&vault, &tree, &from, &token)?,
        Command::Render { note } => handle_render(&vault, &tree, &note)?,
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn handle_tree(tree: &Tree, out: Option<PathBuf>) -> anyhow::Result<()> {
    let snapshot = tree.to_snapshot(tree.root());
    match out {
        Some(path) => {
            write_snapshot(&path, &snapshot)?;
            println!("snapshot written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }
    Ok(())
}

fn handle_links(vault: &Vault, tree: &Tree, broken_only: bool) -> anyhow::Result<()> {
    let (index, _) = first_pass(vault, tree)?;

    if broken_only {
        let mut count = 0usize;
        for (source, target) in index.graph.broken() {
            println!("{}\t{target}", tree.vault_path(source));
            count += 1;
        }
        eprintln!("broken links: {count}");
        return Ok(());
    }

    for doc in index.graph.documents() {
        let mut outgoing = index.graph.outgoing(doc).peekable();
        if outgoing.peek().is_none() {
            continue;
        }
        println!("{}", tree.vault_path(doc));
        for edge in outgoing {
            match &edge.peer {
                EdgeTarget::Node(id) => println!("  -> {}", tree.vault_path(*id)),
                EdgeTarget::Missing(raw) => println!("  -> {raw}\t(missing)"),
            }
        }
    }
    Ok(())
}

fn handle_backlinks(vault: &Vault, tree: &Tree, note: &str, html: bool) -> anyhow::Result<()> {
    let doc = require_node(tree, note)?;
    let (index, _) = first_pass(vault, tree)?;

    if html {
        print!("{}", render_backlinks(tree, vault.config(), &index.graph, doc));
        return Ok(());
    }

    println!("document: {}", tree.vault_path(doc));
    println!("outgoing:");
    for edge in index.graph.outgoing(doc) {
        match &edge.peer {
            EdgeTarget::Node(id) => println!("  {}", tree.vault_path(*id)),
            EdgeTarget::Missing(raw) => println!("  {raw}\t(missing)"),
        }
    }
    println!("incoming:");
    for id in index.graph.incoming(doc).filter_map(|e| e.node()) {
        println!("  {}", tree.vault_path(id));
    }
    Ok(())
}

fn handle_tags(vault: &Vault, tree: &Tree) -> anyhow::Result<()> {
    let (index, _) = first_pass(vault, tree)?;
    for listing in index.tags.listings(tree, vault.config()) {
        println!("#{}\ttag-{}\t{}", listing.tag, listing.class, listing.entries.len());
        for (href, label) in listing.entries {
            println!("  {label}\t{href}");
        }
    }
    Ok(())
}

fn handle_resolve(vault: &Vault, tree: &Tree, from: &str, token: &str) -> anyhow::Result<()> {
    let source = require_node(tree, from)?;
    let inner = token
        .trim()
        .trim_start_matches('!')
        .trim_start_matches("[[")
        .trim_end_matches("]]");
    let token = LinkToken::parse(inner).ok_or_else(|| anyhow::anyhow!("empty link token"))?;

    let resolver = LinkResolver::new(tree, vault.config());
    match resolver.resolve(&token, source)? {
        Resolution::Resolved(id) => println!("{}", tree.vault_path(id)),
        Resolution::Broken { target } => {
            println!("broken\t{target}");
        }
    }
    Ok(())
}

fn handle_render(vault: &Vault, tree: &Tree, note: &str) -> anyhow::Result<()> {
    let doc = require_node(tree, note)?;
    if !vault.config().is_document(tree.node(doc).name()) {
        anyhow::bail!("not a document: {}", tree.vault_path(doc));
    }

    let (index, docs) = first_pass(vault, tree)?;
    let docs: Vec<RewrittenDocument> = docs.into_iter().filter(|d| d.node == doc).collect();
    for rendered in second_pass(tree, vault.config(), &index, docs) {
        print!("{}", rendered.body);
    }
    Ok(())
}

fn require_vault(vault: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    vault.ok_or_else(|| anyhow::anyhow!("--vault is required (or set VAULT_PATH)"))
}

fn require_node(tree: &Tree, path: &str) -> anyhow::Result<NodeId> {
    Ok(tree.require_path(path)?)
}
