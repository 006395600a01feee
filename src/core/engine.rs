use std::path::{Path, PathBuf};
use anyhow::Result;
use sha2::{Digest, Sha256};
use tracing::{info, warn, debug};

use crate::config::Config;
use crate::error::JdocError;
use super::{
    create_renderer, merge_modules, ClassIndex, CodeParser, ContentDiff, ContentDiffer,
    DefaultDocumentationTranslator, DocumentationTranslator, Module, ParsedFile, RenderOptions,
    RenderedFile, Resolver,
};

/// Main orchestration engine: parse, resolve, translate, merge, render
pub struct Engine {
    config: Config,
    translator: Box<dyn DocumentationTranslator>,
    differ: ContentDiffer,
}

impl Engine {
    /// Create a new engine instance
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        debug!("Loaded configuration: {:?}", config);
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            translator: Box::new(DefaultDocumentationTranslator),
            differ: ContentDiffer::new(),
        }
    }

    /// Write the default configuration file
    pub async fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        std::fs::create_dir_all(&target_dir)?;

        let config_path = target_dir.join("jdoc.toml");
        if config_path.exists() {
            warn!("{} already exists, leaving it untouched", config_path.display());
            return Ok(());
        }

        Config::default().save(&config_path)?;
        info!("Initialized jdoc in: {}", target_dir.display());
        Ok(())
    }

    /// Generate documentation, writing only files whose content changed unless forced
    pub async fn generate(&mut self, source: Option<PathBuf>, output: Option<PathBuf>, force: bool) -> Result<()> {
        let output_dir = output.unwrap_or_else(|| self.config.project.docs_dir.clone());
        info!("Output: {}", output_dir.display());

        let (module, source_hash) = self.build_module(source.as_deref()).await?;
        let files = self.render(&module, source_hash)?;
        let diff = self.differ.diff_outputs(&output_dir, &files)?;

        let written = write_outputs(&output_dir, &files, &diff, force)?;
        info!(
            "Wrote {} file(s) ({} added, {} modified, {} unchanged)",
            written, diff.added.len(), diff.modified.len(), diff.unchanged.len()
        );
        Ok(())
    }

    /// Bring the output directory up to date with the sources
    pub async fn sync(&mut self, dry_run: bool, fail_on_changes: bool) -> Result<()> {
        let output_dir = self.config.project.docs_dir.clone();
        let (module, source_hash) = self.build_module(None).await?;
        let files = self.render(&module, source_hash)?;
        let diff = self.differ.diff_outputs(&output_dir, &files)?;

        if !diff.has_changes {
            info!("Documentation in {} is up to date", output_dir.display());
            return Ok(());
        }

        for path in &diff.added {
            info!("  + {}", path.display());
        }
        for path in &diff.modified {
            info!("  ~ {}", path.display());
        }

        if fail_on_changes {
            return Err(JdocError::StaleOutput { count: diff.changed_count() }.into());
        }
        if dry_run {
            info!("Dry run: {} file(s) would be updated", diff.changed_count());
            return Ok(());
        }

        let written = write_outputs(&output_dir, &files, &diff, false)?;
        info!("Updated {} file(s)", written);
        Ok(())
    }

    /// Print the documentation model of a single source file as JSON
    pub async fn dump(&self, file: PathBuf) -> Result<()> {
        let pass = self.config.passes.first()
            .ok_or_else(|| JdocError::Config("no analysis pass configured".to_string()))?;
        let platform = pass.platform_data()?;

        let mut parser = CodeParser::new(&self.config.parsing, &self.config.project.ignore_patterns)?;
        let mut parsed = parser.parse_file(&file).await?;

        let index = ClassIndex::from_files(std::slice::from_ref(&parsed.tree));
        Resolver::new(&index).resolve_file(&mut parsed.tree);

        let module = self.translator.translate(&self.config.project.name, &[parsed.tree], &platform)?;
        let module = merge_modules(&self.config.project.name, vec![module]);
        println!("{}", serde_json::to_string_pretty(&module)?);
        Ok(())
    }

    /// Run every configured pass and fold the results into one module
    async fn build_module(&self, source_override: Option<&Path>) -> Result<(Module, String)> {
        let mut parser = CodeParser::new(&self.config.parsing, &self.config.project.ignore_patterns)?;
        let mut modules = Vec::new();
        let mut hashes = Vec::new();

        for pass in &self.config.passes {
            let platform = pass.platform_data()?;
            let roots: Vec<PathBuf> = match source_override {
                Some(source) => vec![source.to_path_buf()],
                None => pass.source_roots.clone(),
            };

            let mut parsed: Vec<ParsedFile> = Vec::new();
            for root in &roots {
                info!("Parsing {} for {}", root.display(), platform);
                parsed.extend(parser.parse_directory(root).await?);
            }
            hashes.extend(parsed.iter().map(|f| f.content_hash.clone()));

            let mut trees: Vec<_> = parsed.into_iter().map(|f| f.tree).collect();
            let index = ClassIndex::from_files(&trees);
            debug!("Class index holds {} class(es)", index.len());
            let resolver = Resolver::new(&index);
            for tree in &mut trees {
                resolver.resolve_file(tree);
            }

            modules.push(self.translator.translate(&self.config.project.name, &trees, &platform)?);
        }

        let module = merge_modules(&self.config.project.name, modules);
        Ok((module, combined_hash(&hashes)))
    }

    fn render(&self, module: &Module, source_hash: String) -> Result<Vec<RenderedFile>> {
        let options = RenderOptions {
            include_metadata: self.config.output.include_metadata,
            source_hash,
        };

        let mut files = Vec::new();
        for format in &self.config.output.formats {
            let renderer = create_renderer(format, &options)?;
            let rendered = renderer.render(module)?;
            debug!("{} renderer produced {} file(s)", renderer.format_name(), rendered.len());
            files.extend(rendered);
        }
        Ok(files)
    }
}

fn combined_hash(hashes: &[String]) -> String {
    let mut sorted = hashes.to_vec();
    sorted.sort();
    let mut hasher = Sha256::new();
    for hash in &sorted {
        hasher.update(hash.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn write_outputs(output_dir: &Path, files: &[RenderedFile], diff: &ContentDiff, force: bool) -> Result<usize> {
    let mut written = 0;
    for file in files {
        if !force && !diff.is_changed(&file.path) {
            continue;
        }
        let target = output_dir.join(&file.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &file.content)?;
        debug!("Wrote {}", target.display());
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.project.name = "lib".to_string();
        config.project.docs_dir = root.join("docs");
        config.passes[0].source_roots = vec![root.join("src")];
        config
    }

    #[tokio::test]
    async fn test_generate_then_sync() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("src/p/A.java").write_str("package p; /** A thing. */ public class A {}").unwrap();

        let mut engine = Engine::with_config(config_for(temp.path()));
        engine.generate(None, None, false).await.unwrap();

        temp.child("docs/module.json").assert(predicates::path::exists());
        temp.child("docs/index.md").assert(predicates::str::contains("# Module lib"));
        temp.child("docs/packages/p.md").assert(predicates::str::contains("A thing."));

        // timestamps in the front matter do not count as changes
        engine.sync(false, true).await.unwrap();

        temp.child("src/p/A.java").write_str("package p; /** Another thing. */ public class A {}").unwrap();
        let err = engine.sync(true, true).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<JdocError>(), Some(JdocError::StaleOutput { count: 2 })));

        engine.sync(true, false).await.unwrap();
        temp.child("docs/packages/p.md").assert(predicates::str::contains("A thing."));

        engine.sync(false, false).await.unwrap();
        temp.child("docs/packages/p.md").assert(predicates::str::contains("Another thing."));
    }

    #[tokio::test]
    async fn test_passes_merge_by_platform() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("jvm/p/A.java").write_str("package p; public class A {}").unwrap();
        temp.child("android/p/A.java").write_str("package p; class A {}").unwrap();

        let mut config = config_for(temp.path());
        config.passes[0].source_roots = vec![temp.path().join("jvm")];
        let mut android = config.passes[0].clone();
        android.source_roots = vec![temp.path().join("android")];
        android.targets = vec!["android".to_string()];
        config.passes.push(android);
        config.output.formats = vec!["json".to_string()];

        let mut engine = Engine::with_config(config);
        engine.generate(None, None, false).await.unwrap();

        let json = std::fs::read_to_string(temp.path().join("docs/module.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let visibility = &value["packages"][0]["classlikes"][0]["visibility"];
        assert_eq!(visibility["jvm[jvm]"], "public");
        assert_eq!(visibility["jvm[android]"], "private");
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite() {
        let temp = assert_fs::TempDir::new().unwrap();
        let engine = Engine::with_config(Config::default());

        engine.init(Some(temp.path().to_path_buf())).await.unwrap();
        temp.child("jdoc.toml").assert(predicates::str::contains("[[passes]]"));

        temp.child("jdoc.toml").write_str("# mine").unwrap();
        engine.init(Some(temp.path().to_path_buf())).await.unwrap();
        temp.child("jdoc.toml").assert("# mine");
    }

    #[test]
    fn test_combined_hash_ignores_order() {
        let a = vec!["1".to_string(), "2".to_string()];
        let b = vec!["2".to_string(), "1".to_string()];
        assert_eq!(combined_hash(&a), combined_hash(&b));
    }
}
