use std::path::Path;

use anyhow::{Context, Result};
use vesigit_core::config::NullIdentity;
use vesigit_core::repository::Repository;

use crate::repo::GIT_DIR_NAME;

pub fn run(path: &Path) -> Result<()> {
    let git_dir = path.join(GIT_DIR_NAME);
    let repo = Repository::create(&git_dir, Box::new(NullIdentity))
        .with_context(|| format!("initializing repository at {}", git_dir.display()))?;
    tracing::info!(git_dir = %repo.git_dir().display(), "initialized repository");
    println!("Initialized empty vesigit repository in {}", repo.git_dir().display());
    Ok(())
}
