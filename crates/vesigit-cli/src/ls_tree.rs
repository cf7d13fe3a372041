use anyhow::{Context, Result};
use vesigit_core::objects::ObjectKind;
use vesigit_core::resolve;

use crate::repo;

pub fn run(name_only: bool, tree_ish: &str) -> Result<()> {
    let opened = repo::discover()?;
    let hash = resolve::resolve_unique(&opened.store, &opened.refs, tree_ish).context("resolving tree-ish")?;
    let tree_hash = resolve::follow_to_kind(&opened.store, &hash, ObjectKind::Tree).context("following to a tree")?;

    let object = opened.store.read(&tree_hash).context("reading tree")?;
    let tree = object.as_tree().expect("follow_to_kind guarantees a tree object");

    for entry in &tree.entries {
        if name_only {
            println!("{}", entry.name);
        } else {
            let kind = if entry.is_subtree() {
                "tree"
            } else if entry.mode == "160000" {
                "commit"
            } else {
                "blob"
            };
            println!("{:0>6} {} {}    {}", entry.mode, kind, hex::encode(entry.hash), entry.name);
        }
    }
    Ok(())
}
