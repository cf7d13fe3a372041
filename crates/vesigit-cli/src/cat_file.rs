use std::io::Write;

use anyhow::{bail, Context, Result};
use vesigit_core::objects::GitObject;
use vesigit_core::resolve;

use crate::repo;

pub fn run(pretty_print: bool, object: &str) -> Result<()> {
    if !pretty_print {
        bail!("only -p (pretty-print) is supported");
    }

    let opened = repo::discover()?;
    let hash = resolve::resolve_unique(&opened.store, &opened.refs, object).context("resolving object")?;
    let found = opened.store.read(&hash).context("reading object")?;

    let mut stdout = std::io::stdout().lock();
    match &found {
        GitObject::Blob(blob) => stdout.write_all(&blob.data)?,
        GitObject::Tree(tree) => {
            for entry in &tree.entries {
                writeln!(stdout, "{:0>6} {}    {}", entry.mode, hex::encode(entry.hash), entry.name)?;
            }
        }
        GitObject::Commit(commit) => {
            writeln!(stdout, "tree {}", commit.tree)?;
            for parent in &commit.parents {
                writeln!(stdout, "parent {parent}")?;
            }
            writeln!(stdout, "author {}", commit.author.format())?;
            writeln!(stdout, "committer {}", commit.committer.format())?;
            writeln!(stdout)?;
            stdout.write_all(&commit.message)?;
        }
        GitObject::Tag(tag) => {
            writeln!(stdout, "object {}", tag.object)?;
            writeln!(stdout, "type {}", tag.object_type.as_str())?;
            writeln!(stdout, "tag {}", tag.tag)?;
            writeln!(stdout, "tagger {}", tag.tagger.format())?;
            writeln!(stdout)?;
            stdout.write_all(&tag.message)?;
        }
    }
    Ok(())
}
