use anyhow::{Context, Result};
use chrono::Local;
use vesigit_core::writer;

use crate::repo;

pub fn run(tree: &str, parents: &[String], message: &str) -> Result<()> {
    let opened = repo::discover()?;
    let (timestamp, tz_offset) = now_and_offset();
    let signature = writer::signature_from_identity(opened.repo.identity(), timestamp, tz_offset).context("resolving commit identity")?;

    let hash = writer::compose_commit(
        &opened.store,
        tree.to_string(),
        parents.to_vec(),
        signature.clone(),
        signature,
        format!("{message}\n").into_bytes(),
    )
    .context("writing commit object")?;

    println!("{hash}");
    Ok(())
}

pub fn now_and_offset() -> (i64, String) {
    let now = Local::now();
    let offset_seconds = now.offset().local_minus_utc();
    let hours = offset_seconds / 3600;
    let minutes = offset_seconds.abs() % 3600 / 60;
    (now.timestamp(), format!("{:+03}{:02}", hours, minutes))
}
