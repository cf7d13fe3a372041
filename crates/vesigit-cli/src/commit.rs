use anyhow::{Context, Result};
use vesigit_core::treebuilder::build_tree;
use vesigit_core::writer;

use crate::commit_tree::now_and_offset;
use crate::repo;

pub fn run(message: &str) -> Result<()> {
    let opened = repo::discover()?;
    let index = repo::read_index(&opened.repo)?;
    let tree_hash = build_tree(&opened.store, &index.entries).context("building tree from index")?;

    let parents = match opened.refs.resolve("HEAD")? {
        Some(hash) => vec![hash],
        None => vec![],
    };

    let (timestamp, tz_offset) = now_and_offset();
    let signature = writer::signature_from_identity(opened.repo.identity(), timestamp, tz_offset).context("resolving commit identity")?;

    let hash = writer::write_commit(
        &opened.store,
        &opened.refs,
        tree_hash,
        parents,
        signature.clone(),
        signature,
        format!("{message}\n").into_bytes(),
    )
    .context("writing commit")?;

    tracing::debug!(hash, "wrote commit");
    println!("{hash}");
    Ok(())
}
