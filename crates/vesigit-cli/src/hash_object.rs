use std::path::Path;

use anyhow::{Context, Result};
use vesigit_core::objects::{Blob, GitObject};

use crate::repo;

pub fn run(write: bool, file: &Path) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let object = GitObject::Blob(Blob::new(data));

    let id = if write {
        let opened = repo::discover()?;
        let id = opened.store.write(&object).context("writing blob")?;
        tracing::debug!(id, "wrote blob object");
        id
    } else {
        vesigit_core::objects::hash_payload(object.kind(), &object.serialize_payload())
    };

    println!("{id}");
    Ok(())
}
