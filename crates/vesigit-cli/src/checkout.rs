use std::path::Path;

use anyhow::{Context, Result};
use vesigit_core::checkout::checkout;
use vesigit_core::objects::ObjectKind;
use vesigit_core::resolve;

use crate::repo;

pub fn run(tree_ish: &str, destination: &Path) -> Result<()> {
    let opened = repo::discover()?;
    let hash = resolve::resolve_unique(&opened.store, &opened.refs, tree_ish).context("resolving tree-ish")?;
    let tree_hash = resolve::follow_to_kind(&opened.store, &hash, ObjectKind::Tree).context("following to a tree")?;

    checkout(&opened.store, &tree_hash, destination).context("checking out tree")?;
    println!("checked out {tree_hash} into {}", destination.display());
    Ok(())
}
