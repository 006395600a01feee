mod engine;
mod parser;
mod differ;
mod merger;
mod translator;
mod resolver;
mod javadoc;

pub mod dri;
pub mod psi;
pub mod model;
pub mod render;

// Language front ends
mod languages;

pub use parser::{CodeParser, ParsedFile};
pub use differ::{ContentDiffer, ContentDiff};
pub use merger::merge_modules;
pub use translator::{DefaultDocumentationTranslator, DocumentationTranslator};
pub use resolver::{ClassIndex, Resolver};
pub use model::{Module, Platform, PlatformData};
pub use render::{create_renderer, RenderOptions, RenderedFile, Renderer};

// Export the main engine
pub use engine::Engine;
