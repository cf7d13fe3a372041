use anyhow::{Context, Result};
use vesigit_core::treebuilder::build_tree;

use crate::repo;

pub fn run() -> Result<()> {
    let opened = repo::discover()?;
    let index = repo::read_index(&opened.repo)?;
    let tree_hash = build_tree(&opened.store, &index.entries).context("building tree from index")?;
    println!("{tree_hash}");
    Ok(())
}
