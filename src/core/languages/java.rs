use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::error::{JdocError, Result};
use super::super::psi::{
    Import, JavaClass, JavaField, JavaFile, JavaMethod, JavaParameter, JavaType, WildcardBound,
};
use super::SourceFrontEnd;

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "annotation_type_declaration",
    "record_declaration",
];

const TYPE_NODES: &[&str] = &[
    "void_type",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "type_identifier",
    "scoped_type_identifier",
    "generic_type",
    "array_type",
    "annotated_type",
];

/// Java front end backed by the tree-sitter Java grammar
pub struct JavaFrontEnd {
    parser: Parser,
}

impl JavaFrontEnd {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser.set_language(&java_language)
            .map_err(|e| JdocError::Parser(format!("Failed to set Java language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl SourceFrontEnd for JavaFrontEnd {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<JavaFile> {
        let tree = self.parser.parse(content, None)
            .ok_or_else(|| JdocError::Parser(format!("Failed to parse {}", file_path.display())))?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            warn!("{} has syntax errors, documenting the recoverable parts", file_path.display());
        }

        let mut file = JavaFile {
            path: file_path.to_path_buf(),
            package_name: String::new(),
            imports: Vec::new(),
            classes: Vec::new(),
        };

        let mut cursor = root_node.walk();
        for child in root_node.children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    file.package_name = self.package_name(child, content);
                }
                "import_declaration" => {
                    file.imports.push(self.parse_import(child, content));
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => {
                    if let Some(class) = self.parse_class(child, content) {
                        file.classes.push(class);
                    }
                }
                _ => {}
            }
        }

        debug!(
            "Parsed {}: package '{}', {} import(s), {} top-level class(es)",
            file_path.display(),
            file.package_name,
            file.imports.len(),
            file.classes.len()
        );

        Ok(file)
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_name(&self) -> &str {
        "java"
    }
}

impl JavaFrontEnd {
    fn package_name(&self, node: Node, source: &str) -> String {
        let mut cursor = node.walk();
        let name = node.named_children(&mut cursor)
            .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
            .map(|child| self.dotted_text(child, source));
        name.unwrap_or_default()
    }

    fn parse_import(&self, node: Node, source: &str) -> Import {
        let mut import = Import {
            name: String::new(),
            is_static: false,
            on_demand: false,
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => import.is_static = true,
                "asterisk" => import.on_demand = true,
                "identifier" | "scoped_identifier" => import.name = self.dotted_text(child, source),
                _ => {}
            }
        }

        import
    }

    /// Parse any type declaration (class, interface, enum, annotation type or record)
    fn parse_class(&self, node: Node, source: &str) -> Option<JavaClass> {
        let name = self.node_text(node.child_by_field_name("name")?, source);
        let kind = node.kind();

        let mut class = JavaClass {
            name,
            is_annotation_type: kind == "annotation_type_declaration",
            // annotation types are interfaces too
            is_interface: kind == "interface_declaration" || kind == "annotation_type_declaration",
            is_enum: kind == "enum_declaration",
            is_record: kind == "record_declaration",
            modifiers: self.modifiers(node, source),
            doc_comment: self.doc_comment(node, source),
            type_parameters: self.type_parameters(node, source),
            ..Default::default()
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "superclass" | "super_interfaces" | "extends_interfaces") {
                self.collect_types(child, source, &mut class.super_types);
            }
        }

        let mut components = Vec::new();
        if class.is_record {
            if let Some(parameters) = node.child_by_field_name("parameters") {
                components = self.parse_formal_parameters(parameters, source);
            }
            for component in &components {
                class.fields.push(JavaField {
                    name: component.name.clone(),
                    containing_class: Some(class.name.clone()),
                    modifiers: Some(vec!["private".to_string(), "final".to_string()]),
                    doc_comment: None,
                    type_: component.type_.clone(),
                });
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.collect_members(body, source, &mut class, &components);
        }

        Some(class)
    }

    fn collect_members(&self, body: Node, source: &str, class: &mut JavaClass, components: &[JavaParameter]) {
        let owner = class.name.clone();
        let mut cursor = body.walk();

        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    class.fields.extend(self.parse_fields(child, source, &owner));
                }
                "enum_constant" => {
                    if let Some(constant) = self.parse_enum_constant(child, source, &owner) {
                        class.fields.push(constant);
                    }
                }
                "method_declaration" | "annotation_type_element_declaration" => {
                    if let Some(method) = self.parse_method(child, source, &owner) {
                        class.methods.push(method);
                    }
                }
                "constructor_declaration" => {
                    if let Some(constructor) = self.parse_constructor(child, source, &owner, None) {
                        class.constructors.push(constructor);
                    }
                }
                "compact_constructor_declaration" => {
                    if let Some(constructor) = self.parse_constructor(child, source, &owner, Some(components)) {
                        class.constructors.push(constructor);
                    }
                }
                "enum_body_declarations" => {
                    self.collect_members(child, source, class, components);
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => {
                    if let Some(inner) = self.parse_class(child, source) {
                        class.inner_classes.push(inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_method(&self, node: Node, source: &str, owner: &str) -> Option<JavaMethod> {
        let name = self.node_text(node.child_by_field_name("name")?, source);
        let declared = self.parse_type(node.child_by_field_name("type")?, source);
        let return_type = self.with_dimensions(declared, node.child_by_field_name("dimensions"), source);

        let parameters = node.child_by_field_name("parameters")
            .map(|p| self.parse_formal_parameters(p, source))
            .unwrap_or_default();

        Some(JavaMethod {
            name,
            is_constructor: false,
            containing_class: Some(owner.to_string()),
            modifiers: self.modifiers(node, source),
            doc_comment: self.doc_comment(node, source),
            type_parameters: self.type_parameters(node, source),
            return_type: Some(return_type),
            parameters,
        })
    }

    fn parse_constructor(
        &self,
        node: Node,
        source: &str,
        owner: &str,
        record_components: Option<&[JavaParameter]>,
    ) -> Option<JavaMethod> {
        let name = self.node_text(node.child_by_field_name("name")?, source);
        let parameters = match record_components {
            Some(components) => components.to_vec(),
            None => node.child_by_field_name("parameters")
                .map(|p| self.parse_formal_parameters(p, source))
                .unwrap_or_default(),
        };

        Some(JavaMethod {
            name,
            is_constructor: true,
            containing_class: Some(owner.to_string()),
            modifiers: self.modifiers(node, source),
            doc_comment: self.doc_comment(node, source),
            type_parameters: self.type_parameters(node, source),
            return_type: None,
            parameters,
        })
    }

    fn parse_formal_parameters(&self, node: Node, source: &str) -> Vec<JavaParameter> {
        let mut parameters = Vec::new();
        let mut cursor = node.walk();

        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    let (Some(type_node), Some(name_node)) =
                        (child.child_by_field_name("type"), child.child_by_field_name("name"))
                    else {
                        continue;
                    };
                    let declared = self.parse_type(type_node, source);
                    parameters.push(JavaParameter {
                        name: self.node_text(name_node, source),
                        type_: self.with_dimensions(declared, child.child_by_field_name("dimensions"), source),
                    });
                }
                "spread_parameter" => {
                    let mut inner = child.walk();
                    let mut element = None;
                    let mut name = None;
                    for part in child.named_children(&mut inner) {
                        if TYPE_NODES.contains(&part.kind()) && element.is_none() {
                            element = Some(self.parse_type(part, source));
                        } else if part.kind() == "variable_declarator" {
                            name = part.child_by_field_name("name").map(|n| self.node_text(n, source));
                        }
                    }
                    if let (Some(element), Some(name)) = (element, name) {
                        parameters.push(JavaParameter {
                            name,
                            type_: JavaType::Ellipsis(Box::new(element)),
                        });
                    }
                }
                // receiver parameters (`Outer this`) are not real parameters
                _ => {}
            }
        }

        parameters
    }

    /// One field per declarator: `int a, b[];` declares `a: int` and `b: int[]`
    fn parse_fields(&self, node: Node, source: &str, owner: &str) -> Vec<JavaField> {
        let Some(type_node) = node.child_by_field_name("type") else {
            return Vec::new();
        };
        let declared = self.parse_type(type_node, source);
        let modifiers = self.modifiers(node, source);
        let doc_comment = self.doc_comment(node, source);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();

        declarators.into_iter()
            .filter_map(|declarator| {
                let name = self.node_text(declarator.child_by_field_name("name")?, source);
                Some(JavaField {
                    name,
                    containing_class: Some(owner.to_string()),
                    modifiers: modifiers.clone(),
                    doc_comment: doc_comment.clone(),
                    type_: self.with_dimensions(declared.clone(), declarator.child_by_field_name("dimensions"), source),
                })
            })
            .collect()
    }

    fn parse_enum_constant(&self, node: Node, source: &str, owner: &str) -> Option<JavaField> {
        let name = self.node_text(node.child_by_field_name("name")?, source);
        Some(JavaField {
            name,
            containing_class: Some(owner.to_string()),
            modifiers: self.modifiers(node, source),
            doc_comment: self.doc_comment(node, source),
            type_: JavaType::class_reference(owner, Vec::new()),
        })
    }

    fn parse_type(&self, node: Node, source: &str) -> JavaType {
        match node.kind() {
            "void_type" | "integral_type" | "floating_point_type" | "boolean_type" => {
                JavaType::Primitive(self.node_text(node, source))
            }
            "type_identifier" | "scoped_type_identifier" => {
                JavaType::class_reference(&self.type_name(node, source), Vec::new())
            }
            "generic_type" => {
                let mut cursor = node.walk();
                let mut name = String::new();
                let mut arguments = Vec::new();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "type_identifier" | "scoped_type_identifier" => name = self.type_name(child, source),
                        "type_arguments" => arguments = self.type_arguments(child, source),
                        _ => {}
                    }
                }
                JavaType::class_reference(&name, arguments)
            }
            "array_type" => {
                let element = node.child_by_field_name("element")
                    .map(|e| self.parse_type(e, source))
                    .unwrap_or_else(|| JavaType::class_reference("java.lang.Object", Vec::new()));
                self.with_dimensions(element, node.child_by_field_name("dimensions"), source)
            }
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node.named_children(&mut cursor)
                    .filter(|child| TYPE_NODES.contains(&child.kind()))
                    .last();
                match inner {
                    Some(inner) => self.parse_type(inner, source),
                    None => JavaType::class_reference(&self.node_text(node, source), Vec::new()),
                }
            }
            "wildcard" => self.parse_wildcard(node, source),
            _ => JavaType::class_reference(&self.node_text(node, source), Vec::new()),
        }
    }

    fn parse_wildcard(&self, node: Node, source: &str) -> JavaType {
        let mut cursor = node.walk();
        let mut is_super = false;
        let mut bound = None;
        for child in node.children(&mut cursor) {
            if child.kind() == "super" {
                is_super = true;
            } else if TYPE_NODES.contains(&child.kind()) {
                bound = Some(Box::new(self.parse_type(child, source)));
            }
        }
        let bound = bound.map(|b| if is_super { WildcardBound::Super(b) } else { WildcardBound::Extends(b) });
        JavaType::Wildcard { bound }
    }

    fn type_arguments(&self, node: Node, source: &str) -> Vec<JavaType> {
        let mut cursor = node.walk();
        let arguments = node.named_children(&mut cursor)
            .filter(|child| child.kind() == "wildcard" || TYPE_NODES.contains(&child.kind()))
            .map(|child| self.parse_type(child, source))
            .collect();
        arguments
    }

    /// Dotted name of a possibly scoped type, skipping annotations and type arguments
    fn type_name(&self, node: Node, source: &str) -> String {
        match node.kind() {
            "scoped_type_identifier" | "generic_type" => {
                let mut cursor = node.walk();
                let segments: Vec<String> = node.named_children(&mut cursor)
                    .filter(|child| matches!(
                        child.kind(),
                        "type_identifier" | "identifier" | "scoped_type_identifier" | "generic_type"
                    ))
                    .map(|child| self.type_name(child, source))
                    .collect();
                segments.join(".")
            }
            _ => self.node_text(node, source),
        }
    }

    fn with_dimensions(&self, mut element: JavaType, dimensions: Option<Node>, source: &str) -> JavaType {
        let count = dimensions
            .map(|d| self.node_text(d, source).matches('[').count())
            .unwrap_or(0);
        for _ in 0..count {
            element = JavaType::Array(Box::new(element));
        }
        element
    }

    fn collect_types(&self, node: Node, source: &str, types: &mut Vec<JavaType>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "type_list" {
                self.collect_types(child, source, types);
            } else if TYPE_NODES.contains(&child.kind()) {
                types.push(self.parse_type(child, source));
            }
        }
    }

    fn type_parameters(&self, node: Node, source: &str) -> Vec<String> {
        let Some(list) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        let parameters: Vec<Node> = list.named_children(&mut cursor)
            .filter(|child| child.kind() == "type_parameter")
            .collect();

        parameters.into_iter()
            .filter_map(|parameter| {
                let mut inner = parameter.walk();
                let name = parameter.named_children(&mut inner)
                    .find(|child| matches!(child.kind(), "type_identifier" | "identifier"))
                    .map(|child| self.node_text(child, source));
                name
            })
            .collect()
    }

    /// Texts of the modifier list children, `None` when there is no modifier list
    fn modifiers(&self, node: Node, source: &str) -> Option<Vec<String>> {
        let mut cursor = node.walk();
        let list = node.children(&mut cursor).find(|child| child.kind() == "modifiers")?;

        let mut inner = list.walk();
        let modifiers = list.children(&mut inner)
            .filter(|child| !child.is_extra())
            .map(|child| self.node_text(child, source))
            .collect();
        Some(modifiers)
    }

    /// The `/** ... */` comment directly in front of a declaration
    fn doc_comment(&self, node: Node, source: &str) -> Option<String> {
        let mut sibling = node.prev_sibling();
        while let Some(candidate) = sibling {
            match candidate.kind() {
                "line_comment" => sibling = candidate.prev_sibling(),
                "block_comment" => {
                    let text = self.node_text(candidate, source);
                    return (text.starts_with("/**") && text != "/**/").then_some(text);
                }
                _ => return None,
            }
        }
        None
    }

    /// Extract text content of a node
    fn node_text(&self, node: Node, source: &str) -> String {
        source[node.byte_range()].to_string()
    }

    fn dotted_text(&self, node: Node, source: &str) -> String {
        self.node_text(node, source).split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> JavaFile {
        let mut front_end = JavaFrontEnd::new().unwrap();
        front_end.parse(source, Path::new("Test.java")).unwrap()
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse(r#"
package com.example.cache;

import java.util.List;
import java.util.concurrent.*;
import static java.util.Objects.requireNonNull;

class Empty {}
"#);
        assert_eq!(file.package_name, "com.example.cache");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0], Import { name: "java.util.List".into(), is_static: false, on_demand: false });
        assert_eq!(file.imports[1], Import { name: "java.util.concurrent".into(), is_static: false, on_demand: true });
        assert!(file.imports[2].is_static);
        assert_eq!(file.classes[0].name, "Empty");
    }

    #[test]
    fn test_default_package() {
        let file = parse("public class Main {}");
        assert_eq!(file.package_name, "");
        assert_eq!(file.classes[0].modifiers, Some(vec!["public".to_string()]));
    }

    #[test]
    fn test_class_kinds() {
        let file = parse(r#"
class A {}
interface B {}
enum C { X, Y }
@interface D {}
record E(int x) {}
"#);
        let classes = &file.classes;
        assert_eq!(classes.len(), 5);
        assert!(!classes[0].is_interface && !classes[0].is_enum);
        assert!(classes[1].is_interface);
        assert!(classes[2].is_enum);
        assert!(classes[3].is_annotation_type && classes[3].is_interface);
        assert!(classes[4].is_record);
        assert_eq!(classes[0].modifiers, None);
    }

    #[test]
    fn test_members_and_doc_comments() {
        let file = parse(r#"
package p;

/** A cache. */
public class Cache<K, V> extends Base implements Iterable<K>, java.io.Serializable {
    /** Number of entries. */
    private int size, slots[];

    // plain comment
    /**
     * Creates a cache.
     */
    public Cache(int capacity) {}

    protected <T> V put(K key, V value, T... hints) { return null; }

    public static class Entry {}
}
"#);
        let cache = &file.classes[0];
        assert_eq!(cache.doc_comment.as_deref(), Some("/** A cache. */"));
        assert_eq!(cache.type_parameters, vec!["K", "V"]);
        assert_eq!(cache.super_types.len(), 3);
        assert_eq!(cache.super_types[1].canonical_text(), "Iterable<K>");
        assert_eq!(cache.super_types[2].canonical_text(), "java.io.Serializable");

        assert_eq!(cache.fields.len(), 2);
        assert_eq!(cache.fields[0].type_, JavaType::Primitive("int".into()));
        assert_eq!(cache.fields[1].type_.canonical_text(), "int[]");
        assert_eq!(cache.fields[1].doc_comment.as_deref(), Some("/** Number of entries. */"));

        assert_eq!(cache.constructors.len(), 1);
        assert!(cache.constructors[0].is_constructor);
        assert!(cache.constructors[0].doc_comment.as_deref().unwrap().contains("Creates a cache."));

        let put = &cache.methods[0];
        assert_eq!(put.name, "put");
        assert_eq!(put.type_parameters, vec!["T"]);
        assert_eq!(put.modifiers, Some(vec!["protected".to_string()]));
        assert_eq!(put.parameters.len(), 3);
        assert_eq!(put.parameters[2].name, "hints");
        assert_eq!(put.parameters[2].type_.canonical_text(), "T...");
        assert!(put.doc_comment.is_none());

        assert_eq!(cache.inner_classes[0].name, "Entry");
    }

    #[test]
    fn test_enum_constants_and_body_declarations() {
        let file = parse(r#"
enum Level {
    /** Lowest. */
    LOW,
    HIGH;

    public int weight() { return 0; }
}
"#);
        let level = &file.classes[0];
        assert_eq!(level.fields.len(), 2);
        assert_eq!(level.fields[0].name, "LOW");
        assert_eq!(level.fields[0].doc_comment.as_deref(), Some("/** Lowest. */"));
        assert_eq!(level.fields[0].type_.canonical_text(), "Level");
        assert_eq!(level.methods[0].name, "weight");
    }

    #[test]
    fn test_generic_and_wildcard_types() {
        let file = parse(r#"
class A {
    java.util.Map<String, ? extends Number> m;
    java.util.List<? super Integer> l;
    java.util.List<?> any;
}
"#);
        let fields = &file.classes[0].fields;
        assert_eq!(fields[0].type_.canonical_text(), "java.util.Map<String,? extends Number>");
        assert_eq!(fields[1].type_.canonical_text(), "java.util.List<? super Integer>");
        assert_eq!(fields[2].type_.canonical_text(), "java.util.List<?>");
    }

    #[test]
    fn test_annotation_elements_are_methods() {
        let file = parse(r#"
public @interface Retry {
    int times();
    String[] on() default {};
}
"#);
        let retry = &file.classes[0];
        assert_eq!(retry.methods.len(), 2);
        assert_eq!(retry.methods[1].return_type.as_ref().unwrap().canonical_text(), "String[]");
    }

    #[test]
    fn test_record_components_become_fields() {
        let file = parse(r#"
record Point(int x, int y) {
    Point {
    }
}
"#);
        let point = &file.classes[0];
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[1].name, "y");
        assert_eq!(point.constructors.len(), 1);
        assert_eq!(point.constructors[0].parameters.len(), 2);
    }
}
