use std::path::{Path, PathBuf};
use sha2::{Sha256, Digest};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use tracing::{debug, warn};

use crate::config::ParsingConfig;
use crate::error::{JdocError, Result};
use super::languages::{JavaFrontEnd, SourceFrontEnd};
use super::psi::JavaFile;

/// A parsed source file with its program structure tree
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// File path as found while walking the source root
    pub path: PathBuf,

    /// Language of the front end that parsed the file
    pub language: String,

    /// Content hash for change detection
    pub content_hash: String,

    pub tree: JavaFile,
}

/// Walks source roots and hands each source file to the front end that handles it
pub struct CodeParser {
    config: ParsingConfig,
    ignore_patterns: Vec<String>,
    front_ends: Vec<Box<dyn SourceFrontEnd>>,
}

impl CodeParser {
    pub fn new(config: &ParsingConfig, ignore_patterns: &[String]) -> Result<Self> {
        let front_ends: Vec<Box<dyn SourceFrontEnd>> = vec![Box::new(JavaFrontEnd::new()?)];

        Ok(Self {
            config: config.clone(),
            ignore_patterns: ignore_patterns.to_vec(),
            front_ends,
        })
    }

    /// Parse all source files below a directory, sorted by path
    pub async fn parse_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<Vec<ParsedFile>> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(JdocError::FileSystem(format!("Source root {} does not exist", dir.display())));
        }

        let mut overrides = OverrideBuilder::new(dir);
        for pattern in &self.ignore_patterns {
            overrides.add(&format!("!{}", pattern))
                .map_err(|e| JdocError::Config(format!("Invalid ignore pattern '{}': {}", pattern, e)))?;
        }
        let overrides = overrides.build()
            .map_err(|e| JdocError::Config(e.to_string()))?;

        // Use ignore crate to respect .gitignore and custom patterns
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut parsed_files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| JdocError::FileSystem(e.to_string()))?;
            let path = entry.path();

            if path.is_file() && self.should_parse_file(path) {
                match self.parse_file(path).await {
                    Ok(parsed) => {
                        debug!("Parsed {} as {}", parsed.path.display(), parsed.language);
                        parsed_files.push(parsed);
                    }
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }
        }

        parsed_files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Parsed {} file(s) under {}", parsed_files.len(), dir.display());
        Ok(parsed_files)
    }

    /// Parse a single source file
    pub async fn parse_file<P: AsRef<Path>>(&mut self, file_path: P) -> Result<ParsedFile> {
        let path = file_path.as_ref();

        let source_content = std::fs::read_to_string(path)?;
        if source_content.len() > self.config.max_file_size {
            return Err(JdocError::Parser(
                format!("File {} exceeds maximum size limit", path.display())
            ));
        }

        let content_hash = calculate_hash(&source_content);

        let front_end = self.front_end_for(path)
            .ok_or_else(|| JdocError::Parser(
                format!("No front end handles file: {}", path.display())
            ))?;
        let tree = front_end.parse(&source_content, path)?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            language: front_end.language_name().to_string(),
            content_hash,
            tree,
        })
    }

    /// Determine if a file is handled by one of the front ends
    pub fn should_parse_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.front_ends.iter().any(|f| f.file_extensions().contains(&extension))
    }

    fn front_end_for(&mut self, path: &Path) -> Option<&mut Box<dyn SourceFrontEnd>> {
        let extension = path.extension().and_then(|ext| ext.to_str())?;
        self.front_ends.iter_mut().find(|f| f.file_extensions().contains(&extension))
    }
}

/// Calculate SHA256 hash of content
pub fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
