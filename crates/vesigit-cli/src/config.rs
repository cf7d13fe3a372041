//! Reads `user.name` / `user.email` out of `~/.gitconfig` and the
//! repository-local `config` file: simple section-aware `[user]` line
//! parsing, generalized to both files and to a typed [`Identity`] the core
//! consumes.

use std::fs;
use std::path::{Path, PathBuf};

use vesigit_core::config::Identity;

#[derive(Debug, Default, Clone)]
pub struct GitConfigFile {
    name: Option<String>,
    email: Option<String>,
}

impl GitConfigFile {
    /// Load `~/.gitconfig` first, then let the repository-local `config`
    /// file (lower precedence files are overridden by higher ones, same
    /// direction as the ignore engine's layering) take priority.
    pub fn load(git_dir: &Path) -> GitConfigFile {
        let mut config = GitConfigFile::default();
        if let Some(home) = home_dir() {
            config.merge_file(&home.join(".gitconfig"));
        }
        config.merge_file(&git_dir.join("config"));
        config
    }

    fn merge_file(&mut self, path: &Path) {
        let Ok(text) = fs::read_to_string(path) else {
            return;
        };
        let mut in_user_section = false;
        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                in_user_section = line.trim_start_matches('[').starts_with("user");
                continue;
            }
            if !in_user_section {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().to_string();
                match key.trim() {
                    "name" => self.name = Some(value),
                    "email" => self.email = Some(value),
                    _ => {}
                }
            }
        }
    }
}

impl Identity for GitConfigFile {
    fn user_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn user_email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
