use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::{Platform, PlatformData};
use crate::error::{JdocError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Analysis passes, one per platform
    pub passes: Vec<PassConfig>,

    /// Source code parsing configuration
    pub parsing: ParsingConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Name of the documentation module
    pub name: String,

    /// Patterns to skip while walking source roots (gitignore syntax)
    pub ignore_patterns: Vec<String>,

    /// Documentation output directory
    pub docs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    /// Directories holding the sources of this pass
    pub source_roots: Vec<PathBuf>,

    /// Analysis platform (jvm, js, native, common)
    pub platform: String,

    /// Targets this pass documents
    pub targets: Vec<String>,
}

impl PassConfig {
    pub fn platform_data(&self) -> Result<PlatformData> {
        let platform: Platform = self.platform.parse()
            .map_err(|e: String| JdocError::Config(e))?;
        Ok(PlatformData::new(platform, self.targets.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Maximum file size to parse (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output formats to render (json, markdown)
    pub formats: Vec<String>,

    /// Include front matter in markdown pages
    pub include_metadata: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "root".to_string(),
                ignore_patterns: vec![
                    "target/".to_string(),
                    "build/".to_string(),
                    ".git/".to_string(),
                ],
                docs_dir: PathBuf::from("docs"),
            },
            passes: vec![PassConfig {
                source_roots: vec![PathBuf::from("src")],
                platform: "jvm".to_string(),
                targets: vec!["jvm".to_string()],
            }],
            parsing: ParsingConfig {
                max_file_size: 1024 * 1024, // 1MB
            },
            output: OutputConfig {
                formats: vec!["json".to_string(), "markdown".to_string()],
                include_metadata: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| JdocError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| JdocError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Jdoc.toml", "jdoc.toml", ".jdoc.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    fn check(&self) -> Result<()> {
        if self.passes.is_empty() {
            return Err(JdocError::Config("at least one [[passes]] entry is required".to_string()));
        }
        for pass in &self.passes {
            pass.platform_data()?;
        }
        for format in &self.output.formats {
            if format != "json" && format != "markdown" {
                return Err(JdocError::Config(format!("Unsupported output format: {}", format)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jdoc.toml");

        Config::default().save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.project.name, "root");
        assert_eq!(loaded.passes.len(), 1);
        assert_eq!(loaded.passes[0].platform, "jvm");
    }

    #[test]
    fn test_multiple_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jdoc.toml");
        std::fs::write(&path, r#"
[project]
name = "lib"
ignore_patterns = []
docs_dir = "out"

[[passes]]
source_roots = ["jvm/src"]
platform = "jvm"
targets = ["jvm"]

[[passes]]
source_roots = ["android/src"]
platform = "jvm"
targets = ["android"]

[parsing]
max_file_size = 4096

[output]
formats = ["json"]
include_metadata = false
"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.passes.len(), 2);
        assert_eq!(config.passes[1].platform_data().unwrap().to_string(), "jvm[android]");
        assert_eq!(config.parsing.max_file_size, 4096);
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let pass = PassConfig {
            source_roots: vec![],
            platform: "wasm".to_string(),
            targets: vec![],
        };
        assert!(matches!(pass.platform_data(), Err(JdocError::Config(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = Config::load_or_default(Some("does/not/exist.toml")).unwrap();
        assert_eq!(config.output.formats, vec!["json", "markdown"]);
    }
}
