//! Renderers turn a documentation module into output files.

mod json;
mod markdown;

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;

use std::path::PathBuf;

use crate::error::{JdocError, Result};
use super::model::Module;

/// A file produced by a renderer, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
}

pub trait Renderer {
    fn render(&self, module: &Module) -> Result<Vec<RenderedFile>>;
    fn format_name(&self) -> &str;
}

/// Metadata stamped on rendered pages
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub include_metadata: bool,
    pub source_hash: String,
}

/// Create a renderer for the given format name
pub fn create_renderer(format: &str, options: &RenderOptions) -> Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(JsonRenderer)),
        "markdown" | "md" => Ok(Box::new(MarkdownRenderer::new(options.clone())?)),
        _ => Err(JdocError::Config(format!("Unsupported output format: {}", format))),
    }
}
