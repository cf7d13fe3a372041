use anyhow::{Context, Result};
use vesigit_core::resolve;

use crate::repo;

pub fn run(token: &str) -> Result<()> {
    let opened = repo::discover()?;
    let hash = resolve::resolve_unique(&opened.store, &opened.refs, token).context("resolving token")?;
    println!("{hash}");
    Ok(())
}
