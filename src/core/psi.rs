//! Program structure tree produced by the front end.
//!
//! The translator only ever reads these types. Name resolution fills in
//! [`Resolution`] on class references before translation starts.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaFile {
    pub path: PathBuf,
    /// Empty for the default package
    pub package_name: String,
    pub imports: Vec<Import>,
    pub classes: Vec<JavaClass>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Dotted name as written, without the trailing `.*`
    pub name: String,
    pub is_static: bool,
    pub on_demand: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JavaClass {
    pub name: String,
    pub is_annotation_type: bool,
    pub is_interface: bool,
    pub is_enum: bool,
    pub is_record: bool,
    /// Keyword and annotation texts; `None` when the declaration has no modifier list
    pub modifiers: Option<Vec<String>>,
    pub doc_comment: Option<String>,
    pub type_parameters: Vec<String>,
    /// `extends` followed by `implements` clauses, in source order
    pub super_types: Vec<JavaType>,
    pub constructors: Vec<JavaMethod>,
    pub methods: Vec<JavaMethod>,
    pub fields: Vec<JavaField>,
    pub inner_classes: Vec<JavaClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaMethod {
    pub name: String,
    pub is_constructor: bool,
    pub containing_class: Option<String>,
    pub modifiers: Option<Vec<String>>,
    pub doc_comment: Option<String>,
    pub type_parameters: Vec<String>,
    /// `None` for constructors
    pub return_type: Option<JavaType>,
    pub parameters: Vec<JavaParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaParameter {
    pub name: String,
    pub type_: JavaType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaField {
    pub name: String,
    pub containing_class: Option<String>,
    pub modifiers: Option<Vec<String>>,
    pub doc_comment: Option<String>,
    pub type_: JavaType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JavaType {
    /// `int`, `boolean`, `void`, ...
    Primitive(String),
    ClassReference {
        /// Name as written, e.g. `Map.Entry`
        written: String,
        /// Last segment of the written name
        class_name: String,
        arguments: Vec<JavaType>,
        resolution: Resolution,
    },
    Array(Box<JavaType>),
    /// Variadic parameter type, `T...`
    Ellipsis(Box<JavaType>),
    Wildcard {
        bound: Option<WildcardBound>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WildcardBound {
    Extends(Box<JavaType>),
    Super(Box<JavaType>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Unresolved,
    /// A type variable declared by an enclosing method or class
    TypeParameter,
    Class {
        package_name: String,
        class_names: Vec<String>,
    },
}

impl Resolution {
    pub fn qualified_name(&self) -> Option<String> {
        match self {
            Resolution::Class { package_name, class_names } => {
                let classes = class_names.join(".");
                if package_name.is_empty() {
                    Some(classes)
                } else {
                    Some(format!("{}.{}", package_name, classes))
                }
            }
            _ => None,
        }
    }
}

impl JavaType {
    pub fn class_reference(written: &str, arguments: Vec<JavaType>) -> Self {
        let class_name = written.rsplit('.').next().unwrap_or(written).to_string();
        JavaType::ClassReference {
            written: written.to_string(),
            class_name,
            arguments,
            resolution: Resolution::Unresolved,
        }
    }

    /// Fully expanded type text, the form used in callable signatures.
    pub fn canonical_text(&self) -> String {
        match self {
            JavaType::Primitive(name) => name.clone(),
            JavaType::ClassReference { written, arguments, resolution, .. } => {
                let base = match resolution {
                    Resolution::Class { .. } => resolution.qualified_name().unwrap_or_else(|| written.clone()),
                    _ => written.clone(),
                };
                if arguments.is_empty() {
                    base
                } else {
                    let args: Vec<String> = arguments.iter().map(|a| a.canonical_text()).collect();
                    format!("{}<{}>", base, args.join(","))
                }
            }
            JavaType::Array(element) => format!("{}[]", element.canonical_text()),
            JavaType::Ellipsis(element) => format!("{}...", element.canonical_text()),
            JavaType::Wildcard { bound: None } => "?".to_string(),
            JavaType::Wildcard { bound: Some(WildcardBound::Extends(t)) } => {
                format!("? extends {}", t.canonical_text())
            }
            JavaType::Wildcard { bound: Some(WildcardBound::Super(t)) } => {
                format!("? super {}", t.canonical_text())
            }
        }
    }

    /// Visits this type and every nested type, depth first.
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut JavaType)) {
        f(self);
        match self {
            JavaType::ClassReference { arguments, .. } => {
                for argument in arguments {
                    argument.for_each_mut(f);
                }
            }
            JavaType::Array(element) | JavaType::Ellipsis(element) => element.for_each_mut(f),
            JavaType::Wildcard { bound: Some(WildcardBound::Extends(t)) }
            | JavaType::Wildcard { bound: Some(WildcardBound::Super(t)) } => t.for_each_mut(f),
            JavaType::Primitive(_) | JavaType::Wildcard { bound: None } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(package: &str, classes: &[&str], arguments: Vec<JavaType>) -> JavaType {
        JavaType::ClassReference {
            written: classes.last().unwrap().to_string(),
            class_name: classes.last().unwrap().to_string(),
            arguments,
            resolution: Resolution::Class {
                package_name: package.to_string(),
                class_names: classes.iter().map(|c| c.to_string()).collect(),
            },
        }
    }

    #[test]
    fn test_canonical_text_of_generic_reference() {
        let map = resolved("java.util", &["Map"], vec![
            resolved("java.lang", &["String"], vec![]),
            JavaType::Wildcard {
                bound: Some(WildcardBound::Extends(Box::new(resolved("java.lang", &["Number"], vec![])))),
            },
        ]);
        assert_eq!(map.canonical_text(), "java.util.Map<java.lang.String,? extends java.lang.Number>");
    }

    #[test]
    fn test_canonical_text_of_arrays_and_varargs() {
        let matrix = JavaType::Array(Box::new(JavaType::Array(Box::new(JavaType::Primitive("int".into())))));
        assert_eq!(matrix.canonical_text(), "int[][]");

        let varargs = JavaType::Ellipsis(Box::new(resolved("java.lang", &["String"], vec![])));
        assert_eq!(varargs.canonical_text(), "java.lang.String...");
    }

    #[test]
    fn test_unresolved_reference_keeps_written_text() {
        let t = JavaType::class_reference("Outer.Missing", vec![]);
        assert_eq!(t.canonical_text(), "Outer.Missing");
        if let JavaType::ClassReference { class_name, .. } = t {
            assert_eq!(class_name, "Missing");
        }
    }

    #[test]
    fn test_nested_class_qualified_name() {
        let r = Resolution::Class {
            package_name: "java.util".into(),
            class_names: vec!["Map".into(), "Entry".into()],
        };
        assert_eq!(r.qualified_name().as_deref(), Some("java.util.Map.Entry"));
        assert_eq!(Resolution::TypeParameter.qualified_name(), None);
    }
}
