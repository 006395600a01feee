use std::path::PathBuf;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;
use super::super::model::{
    Class, DocumentationNode, Function, JavaTypeWrapper, Module, Package, PlatformData, PlatformInfo,
    Property, TagWrapper, Visibility,
};
use super::{RenderOptions, RenderedFile, Renderer};

const FRONT_MATTER: &str = r#"{% if metadata %}---
module: {{ module }}
{% if page_package %}package: {{ page_package }}
{% endif %}generated_at: {{ generated_at }}
source_hash: {{ source_hash }}
---

{% endif %}"#;

const INDEX_TEMPLATE: &str = r#"{% include "front_matter.md" %}# Module {{ module }}

| Package | Classes |
|---------|---------|
{% for package in packages %}| [{{ package.name }}](packages/{{ package.file }}) | {{ package.classes | length }} |
{% endfor %}"#;

const PACKAGE_TEMPLATE: &str = r#"{% include "front_matter.md" %}# Package {{ package.name }}
{% for class in package.classes %}
## {{ class.kind }} {{ class.qualified }}

Visibility: {{ class.visibility }}{% if class.extra %} | Modifiers: {{ class.extra | join(sep=" ") }}{% endif %}
{% if class.platforms %}Platforms: {{ class.platforms | join(sep=", ") }}
{% endif %}{% if class.inherited %}
Inherits: {{ class.inherited | join(sep=", ") }}
{% endif %}{% if class.description %}
{{ class.description }}
{% endif %}{% for tag in class.tags %}
- {{ tag }}{% endfor %}
{% for section in class.sections %}
### {{ section.title }}
{% for function in section.functions %}
#### `{{ function.signature }}`

Visibility: {{ function.visibility }}
{% if function.description %}
{{ function.description }}
{% endif %}{% for parameter in function.parameters %}
- `{{ parameter.name }}`: `{{ parameter.type_name }}`{% if parameter.description %} {{ parameter.description }}{% endif %}{% endfor %}{% for tag in function.tags %}
- {{ tag }}{% endfor %}
{% endfor %}{% endfor %}{% if class.properties %}
### Properties

| Name | Type | Visibility | Description |
|------|------|------------|-------------|
{% for property in class.properties %}| `{{ property.name }}` | `{{ property.type_name }}` | {{ property.visibility }} | {{ property.description }} |
{% endfor %}{% endif %}{% endfor %}"#;

/// Markdown pages rendered through tera templates: an index plus one page per package
pub struct MarkdownRenderer {
    tera: Tera,
    options: RenderOptions,
}

#[derive(Debug, Serialize)]
struct PackageView {
    name: String,
    file: String,
    classes: Vec<ClassView>,
}

#[derive(Debug, Serialize)]
struct ClassView {
    kind: String,
    qualified: String,
    visibility: String,
    platforms: Vec<String>,
    extra: Vec<String>,
    inherited: Vec<String>,
    description: Option<String>,
    tags: Vec<String>,
    sections: Vec<SectionView>,
    properties: Vec<PropertyView>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    title: String,
    functions: Vec<FunctionView>,
}

#[derive(Debug, Serialize)]
struct FunctionView {
    signature: String,
    visibility: String,
    description: Option<String>,
    parameters: Vec<ParameterView>,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ParameterView {
    name: String,
    type_name: String,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct PropertyView {
    name: String,
    type_name: String,
    visibility: String,
    description: String,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("front_matter.md", FRONT_MATTER),
            ("index.md", INDEX_TEMPLATE),
            ("package.md", PACKAGE_TEMPLATE),
        ])?;
        Ok(Self { tera, options })
    }

    fn base_context(&self, module: &Module, package: Option<&str>) -> Context {
        let mut context = Context::new();
        context.insert("metadata", &self.options.include_metadata);
        context.insert("module", &module.name);
        context.insert("page_package", &package);
        context.insert("generated_at", &chrono::Utc::now().to_rfc3339());
        context.insert("source_hash", &self.options.source_hash);
        context
    }

    fn package_view(&self, package: &Package) -> PackageView {
        let mut classes = Vec::new();
        for class in &package.classlikes {
            flatten_classes(class, &mut classes);
        }
        PackageView {
            name: package_title(&package.name),
            file: package_file(&package.name),
            classes,
        }
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, module: &Module) -> Result<Vec<RenderedFile>> {
        let views: Vec<PackageView> = module.packages.iter()
            .map(|p| self.package_view(p))
            .collect();

        let mut context = self.base_context(module, None);
        context.insert("packages", &views);
        let mut files = vec![RenderedFile {
            path: PathBuf::from("index.md"),
            content: self.tera.render("index.md", &context)?,
        }];

        for view in &views {
            let mut context = self.base_context(module, Some(&view.name));
            context.insert("package", view);
            files.push(RenderedFile {
                path: PathBuf::from("packages").join(&view.file),
                content: self.tera.render("package.md", &context)?,
            });
        }

        Ok(files)
    }

    fn format_name(&self) -> &str {
        "markdown"
    }
}

fn package_title(name: &str) -> String {
    if name.is_empty() {
        "(default package)".to_string()
    } else {
        name.to_string()
    }
}

fn package_file(name: &str) -> String {
    if name.is_empty() {
        "default.md".to_string()
    } else {
        format!("{}.md", name)
    }
}

/// Nested classes get their own section, after their outer class
fn flatten_classes(class: &Class, out: &mut Vec<ClassView>) {
    let (description, tags) = documentation_of(&class.actual);
    let inherited = class.actual.iter()
        .flat_map(|info| info.inherited.iter())
        .filter_map(|dri| {
            let classes = dri.class_names.as_deref()?;
            Some(match dri.package_name.as_deref() {
                Some(package) if !package.is_empty() => format!("`{}.{}`", package, classes),
                _ => format!("`{}`", classes),
            })
        })
        .fold(Vec::new(), |mut acc: Vec<String>, name| {
            if !acc.contains(&name) {
                acc.push(name);
            }
            acc
        });

    let mut sections = Vec::new();
    if !class.constructors.is_empty() {
        sections.push(SectionView {
            title: "Constructors".to_string(),
            functions: class.constructors.iter().map(|f| function_view(f, &class.name)).collect(),
        });
    }
    if !class.functions.is_empty() {
        sections.push(SectionView {
            title: "Functions".to_string(),
            functions: class.functions.iter().map(|f| function_view(f, &class.name)).collect(),
        });
    }

    out.push(ClassView {
        kind: class.kind.to_string(),
        qualified: class.dri.class_names.clone().unwrap_or_else(|| class.name.clone()),
        visibility: visibility_text(&class.visibility),
        platforms: platforms_of(&class.actual),
        extra: class.extra.iter().cloned().collect(),
        inherited,
        description,
        tags,
        sections,
        properties: class.properties.iter().map(property_view).collect(),
    });

    for inner in &class.classlikes {
        flatten_classes(inner, out);
    }
}

fn function_view(function: &Function, class_name: &str) -> FunctionView {
    let (description, tags) = documentation_of(&function.actual);
    let parameters: Vec<ParameterView> = function.parameters.iter()
        .map(|parameter| ParameterView {
            name: parameter.name.clone(),
            type_name: type_label(&parameter.type_),
            description: documentation_of(&parameter.actual).0,
        })
        .collect();

    let arguments: Vec<String> = parameters.iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect();
    let signature = match &function.return_type {
        Some(return_type) => format!("{} {}({})", type_label(return_type), function.name, arguments.join(", ")),
        None if function.is_constructor => format!("{}({})", class_name, arguments.join(", ")),
        None => format!("{}({})", function.name, arguments.join(", ")),
    };

    FunctionView {
        signature,
        visibility: visibility_text(&function.visibility),
        description,
        parameters,
        tags,
    }
}

fn property_view(property: &Property) -> PropertyView {
    PropertyView {
        name: property.name.clone(),
        type_name: property.type_.as_ref().map(type_label).unwrap_or_default(),
        visibility: visibility_text(&property.visibility),
        description: documentation_of(&property.actual).0
            .map(|d| table_cell(&d))
            .unwrap_or_default(),
    }
}

/// Flatten text into one Markdown table cell
fn table_cell(text: &str) -> String {
    text.replace('\n', " ").replace('|', "\\|")
}

/// Platforms a declaration is documented for, in first-seen order
fn platforms_of<P: PlatformInfo>(infos: &[P]) -> Vec<String> {
    let mut platforms: Vec<String> = Vec::new();
    for platform in infos.iter().flat_map(|info| info.platform_data()) {
        let name = platform.to_string();
        if !platforms.contains(&name) {
            platforms.push(name);
        }
    }
    platforms
}

/// Readable type name; unresolved references fall back to their written class name
fn type_label(wrapper: &JavaTypeWrapper) -> String {
    let base = match wrapper.constructor_fq_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => wrapper.dri.as_ref()
            .and_then(|dri| dri.class_names.clone())
            .unwrap_or_else(|| "?".to_string()),
    };
    if wrapper.arguments.is_empty() {
        base
    } else {
        let arguments: Vec<String> = wrapper.arguments.iter().map(type_label).collect();
        format!("{}<{}>", base, arguments.join(", "))
    }
}

fn visibility_text(visibility: &std::collections::BTreeMap<PlatformData, Visibility>) -> String {
    let mut distinct: Vec<Visibility> = visibility.values().copied().collect();
    distinct.dedup();
    if distinct.len() == 1 {
        return distinct[0].to_string();
    }
    visibility.iter()
        .map(|(platform, visibility)| format!("{} on {}", visibility, platform))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Description and remaining block tags of the first documented platform
fn documentation_of<P: PlatformInfo>(infos: &[P]) -> (Option<String>, Vec<String>) {
    let Some(documentation) = infos.iter()
        .map(|info| info.documentation())
        .find(|doc| !doc.is_empty())
    else {
        return (None, Vec::new());
    };

    let description = documentation.description().map(|d| d.to_string());
    (description, block_tags(documentation))
}

fn block_tags(documentation: &DocumentationNode) -> Vec<String> {
    documentation.children.iter()
        .filter_map(|tag| {
            let text = tag.root().to_string().replace('\n', " ");
            match tag {
                TagWrapper::Description { .. } | TagWrapper::Param { .. } => None,
                TagWrapper::Return { .. } => Some(format!("Returns: {}", text)),
                TagWrapper::Throws { name, .. } => Some(format!("Throws `{}`: {}", name, text)),
                TagWrapper::See { name, .. } => Some(format!("See: `{}`", name)),
                TagWrapper::Author { .. } => Some(format!("Author: {}", text)),
                TagWrapper::Since { .. } => Some(format!("Since: {}", text)),
                TagWrapper::Deprecated { .. } => Some(format!("Deprecated: {}", text)),
                TagWrapper::CustomTag { name, .. } => Some(format!("@{}: {}", name, text)),
            }
        })
        .collect()
}
