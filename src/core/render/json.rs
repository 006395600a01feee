//! Structured output for tooling: the module model serialized as-is.

use std::path::PathBuf;

use crate::error::Result;
use super::super::model::Module;
use super::{RenderedFile, Renderer};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, module: &Module) -> Result<Vec<RenderedFile>> {
        let mut content = serde_json::to_string_pretty(module)?;
        content.push('\n');
        Ok(vec![RenderedFile {
            path: PathBuf::from("module.json"),
            content,
        }])
    }

    fn format_name(&self) -> &str {
        "json"
    }
}
