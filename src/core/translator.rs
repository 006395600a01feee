use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::error::Result;
use super::dri::{Callable, Dri, TypeReference};
use super::javadoc::JavadocParser;
use super::model::{
    BasePlatformInfo, Class, ClassPlatformInfo, DocumentationNode, Function, JavaClassKind,
    JavaTypeWrapper, Module, Package, Parameter, PlatformData, Property, TagWrapper, Visibility,
};
use super::psi::{JavaClass, JavaField, JavaFile, JavaMethod, JavaType, Resolution};

/// Turns the program structure tree of one pass into a documentation module
pub trait DocumentationTranslator {
    fn translate(&self, module_name: &str, files: &[JavaFile], platform: &PlatformData) -> Result<Module>;
}

pub struct DefaultDocumentationTranslator;

impl DocumentationTranslator for DefaultDocumentationTranslator {
    fn translate(&self, module_name: &str, files: &[JavaFile], platform: &PlatformData) -> Result<Module> {
        let doc_parser = DocParser::new(platform.clone())?;

        // one package node per file; packages sharing a name are merged later
        let packages: Vec<Package> = files.iter()
            .map(|file| {
                let dri = Dri::for_package(file.package_name.clone());
                Package {
                    name: file.package_name.clone(),
                    functions: Vec::new(),
                    properties: Vec::new(),
                    classlikes: file.classes.iter()
                        .map(|class| doc_parser.parse_class(class, &dri))
                        .collect(),
                    dri,
                }
            })
            .collect();

        info!("Translated {} file(s) for {} into module '{}'", files.len(), platform, module_name);

        Ok(Module {
            name: module_name.to_string(),
            packages,
        })
    }
}

/// Per-pass translation state: the platform every piece of data is tagged with
pub struct DocParser {
    platform: PlatformData,
    javadoc_parser: JavadocParser,
}

impl DocParser {
    pub fn new(platform: PlatformData) -> Result<Self> {
        Ok(Self {
            platform,
            javadoc_parser: JavadocParser::new()?,
        })
    }

    fn comment(&self, documentation: DocumentationNode) -> Vec<BasePlatformInfo> {
        vec![BasePlatformInfo {
            documentation,
            platform_data: vec![self.platform.clone()],
        }]
    }

    fn visibility(&self, modifiers: &Option<Vec<String>>) -> BTreeMap<PlatformData, Visibility> {
        BTreeMap::from([(self.platform.clone(), visibility_of(modifiers))])
    }

    pub fn parse_class(&self, class: &JavaClass, parent: &Dri) -> Class {
        let kind = if class.is_annotation_type {
            JavaClassKind::AnnotationClass
        } else if class.is_interface {
            JavaClassKind::Interface
        } else if class.is_enum {
            JavaClassKind::EnumClass
        } else {
            JavaClassKind::Class
        };
        let dri = parent.with_class(&class.name);
        debug!("Translating {} {}", kind, dri);

        let inherited: Vec<Dri> = class.super_types.iter()
            .filter(|t| matches!(t, JavaType::ClassReference { resolution: Resolution::Class { .. }, .. }))
            .filter_map(|t| JavaTypeWrapper::from_type(t).dri)
            .collect();
        let documentation = self.javadoc_parser.parse(class.doc_comment.as_deref());
        let actual = self.comment(documentation).into_iter()
            .map(|info| ClassPlatformInfo { info, inherited: inherited.clone() })
            .collect();

        Class {
            name: class.name.clone(),
            kind,
            constructors: class.constructors.iter()
                .map(|c| self.parse_function(c, &dri, true))
                .collect(),
            functions: class.methods.iter()
                .filter(|m| !m.is_constructor)
                .map(|m| self.parse_function(m, &dri, false))
                .collect(),
            properties: class.fields.iter()
                .map(|f| self.parse_field(f, &dri))
                .collect(),
            classlikes: class.inner_classes.iter()
                .map(|inner| self.parse_class(inner, &dri))
                .collect(),
            expected: None,
            actual,
            extra: extra_modifiers(&class.modifiers),
            visibility: self.visibility(&class.modifiers),
            dri,
        }
    }

    fn parse_function(&self, method: &JavaMethod, parent: &Dri, is_constructor: bool) -> Function {
        let dri = parent.with_callable(Callable::new(
            method.name.clone(),
            Some(TypeReference::JavaClass(method.containing_class.clone().unwrap_or_default())),
            method.parameters.iter()
                .map(|p| TypeReference::JavaClass(p.type_.canonical_text()))
                .collect(),
        ));
        let documentation = self.javadoc_parser.parse(method.doc_comment.as_deref());

        let parameters = method.parameters.iter()
            .enumerate()
            .map(|(index, parameter)| {
                let own_doc = DocumentationNode {
                    children: documentation.param(&parameter.name)
                        .map(|root| vec![TagWrapper::Description { root: root.clone() }])
                        .unwrap_or_default(),
                };
                Parameter {
                    dri: dri.with_target(index + 1),
                    name: parameter.name.clone(),
                    type_: JavaTypeWrapper::from_type(&parameter.type_),
                    expected: None,
                    actual: self.comment(own_doc),
                }
            })
            .collect();

        Function {
            name: if is_constructor { "<init>".to_string() } else { method.name.clone() },
            return_type: method.return_type.as_ref().map(JavaTypeWrapper::from_type),
            is_constructor,
            receiver: None,
            parameters,
            expected: None,
            actual: self.comment(documentation),
            visibility: self.visibility(&method.modifiers),
            dri,
        }
    }

    fn parse_field(&self, field: &JavaField, parent: &Dri) -> Property {
        let dri = parent.with_callable(Callable::new(
            field.name.clone(),
            Some(TypeReference::JavaClass(field.containing_class.clone().unwrap_or_default())),
            Vec::new(),
        ));

        Property {
            name: field.name.clone(),
            type_: Some(JavaTypeWrapper::from_type(&field.type_)),
            receiver: None,
            expected: None,
            actual: self.comment(self.javadoc_parser.parse(field.doc_comment.as_deref())),
            accessors: Vec::new(),
            visibility: self.visibility(&field.modifiers),
            dri,
        }
    }
}

/// `public` wins over `protected`; anything else, including no modifier list, is private
fn visibility_of(modifiers: &Option<Vec<String>>) -> Visibility {
    match modifiers {
        Some(list) if list.iter().any(|m| m == "public") => Visibility::Public,
        Some(list) if list.iter().any(|m| m == "protected") => Visibility::Protected,
        _ => Visibility::Private,
    }
}

fn extra_modifiers(modifiers: &Option<Vec<String>>) -> BTreeSet<String> {
    modifiers.iter()
        .flatten()
        .filter(|m| !matches!(m.as_str(), "public" | "protected" | "private"))
        .cloned()
        .collect()
}
