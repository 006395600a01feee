//! Best-effort resolution of written type names to canonical dotted names.
//!
//! There is no classpath here: a name resolves against the classes declared by
//! the analysed sources plus a table of well-known JDK classes, and a written
//! fully-qualified name falls back to the package/class naming convention.

use std::collections::HashMap;
use tracing::trace;

use super::psi::{Import, JavaClass, JavaFile, JavaMethod, JavaType, Resolution};

const JDK_CLASSES: &[(&str, &[&str])] = &[
    ("java.lang", &[
        "AutoCloseable", "Boolean", "Byte", "CharSequence", "Character", "Class", "ClassCastException",
        "Cloneable", "Comparable", "Deprecated", "Double", "Enum", "Error", "Exception", "Float",
        "FunctionalInterface", "IllegalArgumentException", "IllegalStateException",
        "IndexOutOfBoundsException", "Integer", "InterruptedException", "Iterable", "Long", "Math",
        "NullPointerException", "Number", "Object", "Override", "Record", "Runnable",
        "RuntimeException", "SafeVarargs", "Short", "String", "StringBuilder", "SuppressWarnings",
        "System", "Thread", "Throwable", "UnsupportedOperationException", "Void",
    ]),
    ("java.util", &[
        "ArrayDeque", "ArrayList", "Arrays", "Collection", "Collections", "Comparator", "Deque",
        "EnumMap", "EnumSet", "HashMap", "HashSet", "Iterator", "LinkedHashMap", "LinkedHashSet",
        "LinkedList", "List", "Locale", "Map", "NavigableMap", "Objects", "Optional", "Queue",
        "Set", "SortedMap", "SortedSet", "TreeMap", "TreeSet", "UUID",
    ]),
    ("java.util.function", &[
        "BiConsumer", "BiFunction", "BinaryOperator", "Consumer", "Function", "Predicate",
        "Supplier", "UnaryOperator",
    ]),
    ("java.io", &[
        "Closeable", "File", "IOException", "InputStream", "OutputStream", "Reader",
        "Serializable", "UncheckedIOException", "Writer",
    ]),
];

/// Nested JDK classes commonly referenced through their outer class
const JDK_NESTED_CLASSES: &[(&str, &[&str])] = &[
    ("java.util", &["Map", "Entry"]),
];

/// Every class a pass knows about, keyed by qualified name
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    known: HashMap<String, (String, Vec<String>)>,
}

impl ClassIndex {
    /// Index seeded with the well-known JDK classes
    pub fn new() -> Self {
        let mut index = Self::default();
        for (package, classes) in JDK_CLASSES {
            for class in *classes {
                index.insert(package, vec![class.to_string()]);
            }
        }
        for (package, class_names) in JDK_NESTED_CLASSES {
            index.insert(package, class_names.iter().map(|c| c.to_string()).collect());
        }
        index
    }

    pub fn from_files(files: &[JavaFile]) -> Self {
        let mut index = Self::new();
        for file in files {
            index.add_file(file);
        }
        index
    }

    pub fn add_file(&mut self, file: &JavaFile) {
        for class in &file.classes {
            self.add_class(&file.package_name, &mut Vec::new(), class);
        }
    }

    fn add_class(&mut self, package: &str, outer: &mut Vec<String>, class: &JavaClass) {
        outer.push(class.name.clone());
        self.insert(package, outer.clone());
        for inner in &class.inner_classes {
            self.add_class(package, outer, inner);
        }
        outer.pop();
    }

    fn insert(&mut self, package: &str, class_names: Vec<String>) {
        let qualified = qualify(package, &class_names);
        self.known.insert(qualified, (package.to_string(), class_names));
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn lookup(&self, package: &str, class_names: &[String]) -> Option<Resolution> {
        self.find_qualified(&qualify(package, class_names))
    }

    pub fn find_qualified(&self, qualified: &str) -> Option<Resolution> {
        self.known.get(qualified).map(|(package_name, class_names)| Resolution::Class {
            package_name: package_name.clone(),
            class_names: class_names.clone(),
        })
    }
}

fn qualify(package: &str, class_names: &[String]) -> String {
    let classes = class_names.join(".");
    if package.is_empty() {
        classes
    } else {
        format!("{}.{}", package, classes)
    }
}

/// Lexical context a type name is looked up in
struct Scope<'a> {
    package: &'a str,
    imports: &'a [Import],
    /// Enclosing class names, outermost first
    classes: &'a [String],
    type_parameters: &'a [String],
}

pub struct Resolver<'a> {
    index: &'a ClassIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ClassIndex) -> Self {
        Self { index }
    }

    /// Rewrite the resolution of every class reference in the file
    pub fn resolve_file(&self, file: &mut JavaFile) {
        let package = file.package_name.clone();
        let imports = file.imports.clone();
        for class in &mut file.classes {
            self.resolve_class(class, &package, &imports, &[], &[]);
        }
    }

    fn resolve_class(
        &self,
        class: &mut JavaClass,
        package: &str,
        imports: &[Import],
        outer_classes: &[String],
        outer_type_parameters: &[String],
    ) {
        let mut classes = outer_classes.to_vec();
        classes.push(class.name.clone());
        let mut type_parameters = outer_type_parameters.to_vec();
        type_parameters.extend(class.type_parameters.iter().cloned());

        let scope = Scope {
            package,
            imports,
            classes: &classes,
            type_parameters: &type_parameters,
        };

        for super_type in &mut class.super_types {
            self.resolve_type(super_type, &scope);
        }
        for field in &mut class.fields {
            self.resolve_type(&mut field.type_, &scope);
        }
        for method in class.constructors.iter_mut().chain(class.methods.iter_mut()) {
            self.resolve_method(method, &scope);
        }
        for inner in &mut class.inner_classes {
            self.resolve_class(inner, package, imports, &classes, &type_parameters);
        }
    }

    fn resolve_method(&self, method: &mut JavaMethod, scope: &Scope) {
        let mut type_parameters = scope.type_parameters.to_vec();
        type_parameters.extend(method.type_parameters.iter().cloned());
        let method_scope = Scope {
            type_parameters: &type_parameters,
            ..*scope
        };

        if let Some(return_type) = &mut method.return_type {
            self.resolve_type(return_type, &method_scope);
        }
        for parameter in &mut method.parameters {
            self.resolve_type(&mut parameter.type_, &method_scope);
        }
    }

    fn resolve_type(&self, type_: &mut JavaType, scope: &Scope) {
        type_.for_each_mut(&mut |node| {
            if let JavaType::ClassReference { written, resolution, .. } = node {
                *resolution = self.resolve_name(written, scope);
                trace!("{} resolved to {:?}", written, resolution);
            }
        });
    }

    fn resolve_name(&self, written: &str, scope: &Scope) -> Resolution {
        let segments: Vec<String> = written.split('.').map(str::to_string).collect();
        let first = &segments[0];
        let rest = &segments[1..];

        if rest.is_empty() && scope.type_parameters.iter().any(|p| p == first) {
            return Resolution::TypeParameter;
        }

        // member classes of the enclosing classes, innermost first
        for depth in (1..=scope.classes.len()).rev() {
            let mut class_names = scope.classes[..depth].to_vec();
            class_names.push(first.clone());
            if let Some(found) = self.index.lookup(scope.package, &class_names) {
                return with_nested(found, rest);
            }
        }

        for import in scope.imports.iter().filter(|i| !i.on_demand) {
            if import.name.rsplit('.').next() == Some(first.as_str()) {
                if let Some(found) = self.resolve_qualified(&import.name) {
                    return with_nested(found, rest);
                }
            }
        }

        if let Some(found) = self.index.lookup(scope.package, std::slice::from_ref(first)) {
            return with_nested(found, rest);
        }

        for import in scope.imports.iter().filter(|i| i.on_demand) {
            if let Some(found) = self.index.find_qualified(&format!("{}.{}", import.name, first)) {
                return with_nested(found, rest);
            }
        }

        if let Some(found) = self.index.lookup("java.lang", std::slice::from_ref(first)) {
            return with_nested(found, rest);
        }

        if !rest.is_empty() {
            if let Some(found) = self.resolve_qualified(written) {
                return found;
            }
        }

        Resolution::Unresolved
    }

    /// Resolve a written fully-qualified name against the index, then by convention
    fn resolve_qualified(&self, qualified: &str) -> Option<Resolution> {
        if let Some(found) = self.index.find_qualified(qualified) {
            return Some(found);
        }

        let segments: Vec<&str> = qualified.split('.').collect();
        let first_class = segments.iter()
            .position(|s| s.chars().next().is_some_and(char::is_uppercase))?;
        if first_class == 0 {
            return None;
        }

        Some(Resolution::Class {
            package_name: segments[..first_class].join("."),
            class_names: segments[first_class..].iter().map(|s| s.to_string()).collect(),
        })
    }
}

fn with_nested(found: Resolution, rest: &[String]) -> Resolution {
    match found {
        Resolution::Class { package_name, mut class_names } => {
            class_names.extend(rest.iter().cloned());
            Resolution::Class { package_name, class_names }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::core::languages::{JavaFrontEnd, SourceFrontEnd};

    fn parse_all(sources: &[&str]) -> Vec<JavaFile> {
        let mut front_end = JavaFrontEnd::new().unwrap();
        let mut files: Vec<JavaFile> = sources.iter()
            .map(|s| front_end.parse(s, Path::new("T.java")).unwrap())
            .collect();
        let index = ClassIndex::from_files(&files);
        let resolver = Resolver::new(&index);
        for file in &mut files {
            resolver.resolve_file(file);
        }
        files
    }

    fn field_type(file: &JavaFile, name: &str) -> String {
        file.classes[0].fields.iter()
            .find(|f| f.name == name)
            .map(|f| f.type_.canonical_text())
            .unwrap()
    }

    #[test]
    fn test_resolution_order() {
        let files = parse_all(&[
            r#"
package app;

import java.util.List;
import java.util.function.*;
import com.acme.Widget;

class Holder<T> {
    String text;
    List<Helper> helpers;
    Function<T, Widget> factory;
    Inner inner;
    Missing missing;
    T value;

    static class Inner {}
}
"#,
            "package app; public class Helper {}",
        ]);
        let holder = &files[0];
        assert_eq!(field_type(holder, "text"), "java.lang.String");
        assert_eq!(field_type(holder, "helpers"), "java.util.List<app.Helper>");
        assert_eq!(field_type(holder, "factory"), "java.util.function.Function<T,com.acme.Widget>");
        assert_eq!(field_type(holder, "inner"), "app.Holder.Inner");
        assert_eq!(field_type(holder, "missing"), "Missing");
        assert_eq!(field_type(holder, "value"), "T");
    }

    #[test]
    fn test_nested_and_qualified_names() {
        let files = parse_all(&[r#"
package app;

import java.util.Map;

class Registry {
    Map.Entry<String, Integer> entry;
    java.time.Duration timeout;
    Outer.Deep deep;
}
"#, "package app; class Outer { static class Deep {} }"]);
        let registry = &files[0];
        assert_eq!(field_type(registry, "entry"), "java.util.Map.Entry<java.lang.String,java.lang.Integer>");
        assert_eq!(field_type(registry, "timeout"), "java.time.Duration");
        assert_eq!(field_type(registry, "deep"), "app.Outer.Deep");

        if let JavaType::ClassReference { resolution, .. } = &registry.classes[0].fields[0].type_ {
            assert_eq!(resolution, &Resolution::Class {
                package_name: "java.util".into(),
                class_names: vec!["Map".into(), "Entry".into()],
            });
        } else {
            panic!("expected a class reference");
        }
    }

    #[test]
    fn test_method_type_parameters_shadow_classes() {
        let files = parse_all(&["package app; class T {} class Box { <T> T get(T fallback) { return fallback; } }"]);
        let get = &files[0].classes[1].methods[0];
        assert_eq!(get.return_type.as_ref().unwrap(), &JavaType::ClassReference {
            written: "T".into(),
            class_name: "T".into(),
            arguments: vec![],
            resolution: Resolution::TypeParameter,
        });
    }

    #[test]
    fn test_index_contains_nested_classes() {
        let files = parse_all(&["package p; class A { class B { class C {} } }"]);
        let index = ClassIndex::from_files(&files);
        assert!(index.find_qualified("p.A.B.C").is_some());
        assert!(index.find_qualified("java.lang.String").is_some());
        assert!(index.len() > 3);
    }
}
