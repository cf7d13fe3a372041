use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Identity;
use crate::error::{Error, Result};

/// The directories and files that make up the skeleton of a repository's
/// metadata directory (conventionally named `.git` on disk, but the core
/// never hard-codes that name beyond the default used by `create`).
const SKELETON_DIRS: &[&str] = &["objects", "refs/heads", "refs/tags", "branches"];

/// A handle onto an on-disk repository. Owns the metadata directory path and
/// an injected identity capability; carries no other mutable state.
pub struct Repository {
    /// The repository's metadata directory (e.g. `/path/to/work/.git`).
    git_dir: PathBuf,
    /// The working tree root (the metadata directory's parent).
    worktree: PathBuf,
    identity: Box<dyn Identity>,
}

impl Repository {
    /// Create the on-disk skeleton at `git_dir`. `git_dir`'s parent is the
    /// worktree. The target must be empty or not yet exist.
    pub fn create(git_dir: impl AsRef<Path>, identity: Box<dyn Identity>) -> Result<Repository> {
        let git_dir = git_dir.as_ref().to_path_buf();

        if git_dir.exists() {
            let mut entries = fs::read_dir(&git_dir)?;
            if entries.next().is_some() {
                return Err(Error::DestinationNotEmpty(git_dir));
            }
        } else {
            fs::create_dir_all(&git_dir)?;
        }

        for dir in SKELETON_DIRS {
            fs::create_dir_all(git_dir.join(dir))?;
        }

        fs::write(
            git_dir.join("description"),
            "Unnamed repository: edit this file 'description' to name the repository.\n",
        )?;
        fs::write(git_dir.join("HEAD"), "ref: refs/heads/master\n")?;
        fs::write(
            git_dir.join("config"),
            "[core]\n\trepositoryformatversion = 0\n\tfilemode = false\n\tbare = false\n",
        )?;

        let worktree = git_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Repository {
            git_dir,
            worktree,
            identity,
        })
    }

    /// Open an existing repository rooted at `git_dir`, validating
    /// `core.repositoryformatversion`.
    pub fn open(git_dir: impl AsRef<Path>, identity: Box<dyn Identity>) -> Result<Repository> {
        let git_dir = git_dir.as_ref().to_path_buf();
        let version = read_repository_format_version(&git_dir.join("config"))?;
        if version != 0 {
            return Err(Error::UnsupportedFormat(version));
        }

        let worktree = git_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Repository {
            git_dir,
            worktree,
            identity,
        })
    }

    /// Ascend from `start` looking for a directory whose metadata dir name
    /// (`dir_name`, conventionally `.git`) contains the skeleton. Returns
    /// the metadata directory path.
    pub fn find(start: impl AsRef<Path>, dir_name: &str) -> Result<PathBuf> {
        let mut current = start.as_ref().to_path_buf();
        if let Ok(canon) = current.canonicalize() {
            current = canon;
        }

        loop {
            let candidate = current.join(dir_name);
            if candidate.join("objects").is_dir() && candidate.join("refs").is_dir() {
                return Ok(candidate);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(Error::NotARepository(start.as_ref().to_path_buf())),
            }
        }
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn identity(&self) -> &dyn Identity {
        self.identity.as_ref()
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    pub fn refs_dir(&self) -> PathBuf {
        self.git_dir.join("refs")
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.git_dir.join(relative)
    }

    /// Resolve a worktree-relative path to an absolute path.
    pub fn worktree_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.worktree.join(relative)
    }
}

/// Write `contents` to `path` atomically: write to a sibling temp file in
/// the same directory, then rename onto the target. Used by every mutating
/// writer in the core (objects, refs, index).
pub fn atomic_write(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Read `core.repositoryformatversion` out of a repository's `config` file.
/// This is a narrow, purpose-built reader for the one key the core itself
/// must validate on open — general configuration syntax is an external
/// collaborator's concern (see `config::Identity`).
fn read_repository_format_version(config_path: &Path) -> Result<u32> {
    let text = fs::read_to_string(config_path)?;
    let mut in_core_section = false;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_core_section = line.trim_start_matches('[').starts_with("core");
            continue;
        }
        if !in_core_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "repositoryformatversion" {
                return value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| Error::MalformedIndex("bad repositoryformatversion".into()));
            }
        }
    }
    // A config file with no explicit repositoryformatversion is treated as
    // version 0, matching a freshly created repository.
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NullIdentity;
    use tempfile::tempdir;

    #[test]
    fn create_writes_skeleton() {
        let dir = tempdir().unwrap();
        let git_dir = dir.path().join(".git");
        let repo = Repository::create(&git_dir, Box::new(NullIdentity)).unwrap();

        assert!(repo.objects_dir().is_dir());
        assert!(repo.refs_dir().join("heads").is_dir());
        assert!(repo.refs_dir().join("tags").is_dir());
        assert!(repo.path("branches").is_dir());
        assert_eq!(
            fs::read_to_string(repo.head_path()).unwrap(),
            "ref: refs/heads/master\n"
        );
    }

    #[test]
    fn create_rejects_nonempty_dir() {
        let dir = tempdir().unwrap();
        let git_dir = dir.path().join(".git");
        Repository::create(&git_dir, Box::new(NullIdentity)).unwrap();

        let err = Repository::create(&git_dir, Box::new(NullIdentity)).unwrap_err();
        assert!(matches!(err, Error::DestinationNotEmpty(_)));
    }

    #[test]
    fn open_rejects_unsupported_format() {
        let dir = tempdir().unwrap();
        let git_dir = dir.path().join(".git");
        Repository::create(&git_dir, Box::new(NullIdentity)).unwrap();
        fs::write(
            git_dir.join("config"),
            "[core]\n\trepositoryformatversion = 1\n",
        )
        .unwrap();

        let err = Repository::open(&git_dir, Box::new(NullIdentity)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(1)));
    }

    #[test]
    fn find_ascends_to_skeleton() {
        let dir = tempdir().unwrap();
        let git_dir = dir.path().join(".git");
        Repository::create(&git_dir, Box::new(NullIdentity)).unwrap();

        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = Repository::find(&nested, ".git").unwrap();
        assert_eq!(found.canonicalize().unwrap(), git_dir.canonicalize().unwrap());
    }

    #[test]
    fn find_fails_outside_repository() {
        let dir = tempdir().unwrap();
        let err = Repository::find(dir.path(), ".git").unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }
}
