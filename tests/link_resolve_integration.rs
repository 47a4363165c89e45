use vaultlink::{Resolution, Session, Vault, VaultConfig, build_tree};

fn txt_config() -> VaultConfig {
    let mut cfg = VaultConfig::default();
    cfg.document_extensions = vec!["txt".into()];
    cfg
}

#[test]
fn same_named_files_resolve_to_the_nearer_one() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let vault_root = temp.path().join("vault");
    std::fs::create_dir_all(vault_root.join("A"))?;
    std::fs::create_dir_all(vault_root.join("B"))?;
    std::fs::write(vault_root.join("A/x.txt"), "x in A\n")?;
    std::fs::write(vault_root.join("B/x.txt"), "x in B\n")?;
    std::fs::write(vault_root.join("A/y.txt"), "[[x]]\n")?;

    let vault = Vault::with_config(&vault_root, txt_config())?;
    let tree = build_tree(&vault)?;
    let y = tree.find_by_vault_path("/A/y.txt").expect("y present");
    let ax = tree.find_by_vault_path("/A/x.txt").expect("A/x present");

    let mut session = Session::new(&tree, vault.config());
    let body = session.rewrite_document(y, &vault.read_document(&tree, y)?)?;
    assert_eq!(body, "[x](/A/x)\n");

    let index = session.finish();
    let out: Vec<_> = index.graph.outgoing(y).collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].node(), Some(ax));
    assert!(out[0].exists());
    Ok(())
}

#[test]
fn missing_target_renders_inert_text_and_records_broken_edge() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let vault_root = temp.path().join("vault");
    std::fs::create_dir_all(&vault_root)?;
    std::fs::write(vault_root.join("doc.md"), "Go to [[nope]] now.\n")?;

    let vault = Vault::open(&vault_root)?;
    let tree = build_tree(&vault)?;
    let doc = tree.find_by_vault_path("/doc.md").expect("doc present");

    let mut session = Session::new(&tree, vault.config());
    let body = session.rewrite_document(doc, &vault.read_document(&tree, doc)?)?;
    assert!(body.contains("nope"));
    assert!(!body.contains("[[nope]]"));
    assert!(!body.contains("](")); // not navigable

    let index = session.finish();
    let out: Vec<_> = index.graph.outgoing(doc).collect();
    assert_eq!(out.len(), 1);
    assert!(!out[0].exists());
    assert_eq!(index.graph.broken().collect::<Vec<_>>(), vec![(doc, "nope")]);
    Ok(())
}

#[test]
fn path_links_and_extensionless_links_resolve() -> anyhow::Result<()> {
    let temp = tempfile::tempdir()?;
    let vault_root = temp.path().join("vault");
    std::fs::create_dir_all(vault_root.join("notes/sub"))?;
    std::fs::create_dir_all(vault_root.join("other/notes/sub"))?;
    std::fs::write(vault_root.join("notes/sub/Target.md"), "# T\n")?;
    std::fs::write(vault_root.join("other/notes/sub/Target.md"), "# T2\n")?;
    std::fs::write(vault_root.join("notes/sub/Local.md"), "# L\n")?;
    std::fs::write(vault_root.join("other/source.md"), "")?;
    std::fs::write(vault_root.join("notes/sub/here.md"), "")?;

    let vault = Vault::open(&vault_root)?;
    let tree = build_tree(&vault)?;
    let resolver = vaultlink::LinkResolver::new(&tree, vault.config());

    let source = tree.find_by_vault_path("/other/source.md").expect("source");
    let (_, res) = resolver
        .resolve_str("/notes/sub/Target", source)?
        .expect("token parses");
    assert_eq!(
        res,
        Resolution::Resolved(tree.find_by_vault_path("/notes/sub/Target.md").expect("t"))
    );

    let (_, res) = resolver
        .resolve_str("./notes/sub/Target.md", source)?
        .expect("token parses");
    assert_eq!(
        res,
        Resolution::Resolved(
            tree.find_by_vault_path("/other/notes/sub/Target.md")
                .expect("t2")
        )
    );

    let here = tree.find_by_vault_path("/notes/sub/here.md").expect("here");
    let (_, res) = resolver.resolve_str(r".\Local|local", here)?.expect("token parses");
    assert_eq!(
        res,
        Resolution::Resolved(tree.find_by_vault_path("/notes/sub/Local.md").expect("l"))
    );
    Ok(())
}
