use std::path::{Path, PathBuf};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use super::render::RenderedFile;

/// How a set of rendered files compares with what is on disk
#[derive(Debug, Clone, Default)]
pub struct ContentDiff {
    pub has_changes: bool,
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl ContentDiff {
    pub fn changed_count(&self) -> usize {
        self.added.len() + self.modified.len()
    }

    pub fn is_changed(&self, path: &Path) -> bool {
        self.added.iter().chain(&self.modified).any(|p| p == path)
    }
}

pub struct ContentDiffer;

impl ContentDiffer {
    pub fn new() -> Self {
        Self
    }

    /// Hash of the content without its front matter, so timestamps never count as a change
    pub fn content_hash(&self, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(strip_front_matter(content).as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn has_content_changed(&self, existing: &str, rendered: &str) -> bool {
        self.content_hash(existing) != self.content_hash(rendered)
    }

    /// Compare rendered files with the files already present under `output_dir`
    pub fn diff_outputs(&self, output_dir: &Path, files: &[RenderedFile]) -> Result<ContentDiff> {
        let mut diff = ContentDiff::default();

        for file in files {
            let target = output_dir.join(&file.path);
            if !target.exists() {
                diff.added.push(file.path.clone());
                continue;
            }

            let existing = std::fs::read_to_string(&target)?;
            if self.has_content_changed(&existing, &file.content) {
                debug!("Content changed: {}", target.display());
                diff.modified.push(file.path.clone());
            } else {
                diff.unchanged.push(file.path.clone());
            }
        }

        diff.has_changes = diff.changed_count() > 0;
        Ok(diff)
    }
}

fn strip_front_matter(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---\n") else {
        return content;
    };
    match rest.find("\n---\n") {
        Some(end) => rest[end + 5..].trim_start_matches('\n'),
        None => content,
    }
}
