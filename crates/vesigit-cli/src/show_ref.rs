use anyhow::{Context, Result};
use vesigit_core::refs::RefTree;

use crate::repo;

pub fn run() -> Result<()> {
    let opened = repo::discover()?;
    let tree = opened.refs.list().context("listing refs")?;
    print_ref_tree("refs", &tree);
    Ok(())
}

/// Print every leaf under `tree` as `"{hash} {prefix}/{name}"`, walking
/// subdirectories in the lexicographic order `RefStore::list` already
/// produced.
pub fn print_ref_tree(prefix: &str, tree: &RefTree) {
    match tree {
        RefTree::Leaf(hash) => println!("{hash} {prefix}"),
        RefTree::Dir(children) => {
            for (name, child) in children {
                let next_prefix = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}/{name}")
                };
                print_ref_tree(&next_prefix, child);
            }
        }
    }
}
