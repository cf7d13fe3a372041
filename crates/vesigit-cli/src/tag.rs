use anyhow::{bail, Context, Result};
use vesigit_core::objects::GitObject;
use vesigit_core::resolve;
use vesigit_core::writer;

use crate::commit_tree::now_and_offset;
use crate::repo;
use crate::show_ref::print_ref_tree;

pub fn run(annotate: bool, message: Option<&str>, name: Option<&str>, object: &str) -> Result<()> {
    let opened = repo::discover()?;

    let Some(name) = name else {
        // `vesigit tag` with no name lists existing tags, mirroring
        // real git's bare `git tag`.
        let tags = opened.refs.list().context("listing refs")?;
        if let vesigit_core::refs::RefTree::Dir(map) = &tags {
            if let Some(tags_dir) = map.get("tags") {
                print_ref_tree("", tags_dir);
            }
        }
        return Ok(());
    };

    let target = resolve::resolve_unique(&opened.store, &opened.refs, object).context("resolving tag target")?;

    if annotate {
        let message = message.ok_or_else(|| anyhow::anyhow!("an annotated tag requires -m <message>"))?;
        let target_object = opened.store.read(&target).context("reading tag target")?;
        let (timestamp, tz_offset) = now_and_offset();
        let tagger = writer::signature_from_identity(opened.repo.identity(), timestamp, tz_offset).context("resolving tagger identity")?;

        let hash = writer::write_annotated_tag(
            &opened.store,
            &opened.refs,
            target,
            object_kind(&target_object),
            name.to_string(),
            tagger,
            format!("{message}\n").into_bytes(),
        )
        .context("writing annotated tag")?;
        tracing::debug!(hash, tag = name, "wrote annotated tag");
        println!("{hash}");
    } else {
        if message.is_some() {
            bail!("-m requires -a (a lightweight tag carries no message)");
        }
        writer::write_lightweight_tag(&opened.refs, name, &target).context("writing lightweight tag")?;
        tracing::debug!(tag = name, target, "wrote lightweight tag");
    }
    Ok(())
}

fn object_kind(object: &GitObject) -> vesigit_core::objects::ObjectKind {
    object.kind()
}
