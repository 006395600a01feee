//! Language-agnostic documentation model.
//!
//! module → package → class → {constructor, function, property}. Everything a
//! platform can disagree on (visibility, documentation) is keyed by
//! [`PlatformData`] so passes over different platforms can be merged later.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use super::dri::Dri;
use super::psi::{JavaType, Resolution, WildcardBound};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Jvm,
    Js,
    Native,
    Common,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jvm" => Ok(Platform::Jvm),
            "js" => Ok(Platform::Js),
            "native" => Ok(Platform::Native),
            "common" => Ok(Platform::Common),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Jvm => "jvm",
            Platform::Js => "js",
            Platform::Native => "native",
            Platform::Common => "common",
        };
        f.write_str(name)
    }
}

/// A platform together with the targets a pass documents for it.
///
/// Serialized as `jvm[jvm,android]` so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PlatformData {
    pub platform_type: Platform,
    pub targets: Vec<String>,
}

impl PlatformData {
    pub fn new(platform_type: Platform, targets: Vec<String>) -> Self {
        Self { platform_type, targets }
    }
}

impl fmt::Display for PlatformData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.platform_type, self.targets.join(","))
    }
}

impl FromStr for PlatformData {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (platform, targets) = match s.split_once('[') {
            Some((platform, rest)) => {
                let inner = rest.strip_suffix(']')
                    .ok_or_else(|| format!("Malformed platform data: {}", s))?;
                let targets = inner.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                (platform, targets)
            }
            None => (s, Vec::new()),
        };
        Ok(Self::new(platform.parse()?, targets))
    }
}

impl From<PlatformData> for String {
    fn from(data: PlatformData) -> Self {
        data.to_string()
    }
}

impl TryFrom<String> for PlatformData {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        };
        f.write_str(keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JavaClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    AnnotationClass,
}

impl fmt::Display for JavaClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            JavaClassKind::Class => "class",
            JavaClassKind::Interface => "interface",
            JavaClassKind::EnumClass => "enum",
            JavaClassKind::EnumEntry => "enum entry",
            JavaClassKind::AnnotationClass => "annotation",
        };
        f.write_str(keyword)
    }
}

// ---- documentation comments ----

/// Parsed documentation comment: a description followed by block tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationNode {
    pub children: Vec<TagWrapper>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum TagWrapper {
    Description { root: DocText },
    Param { name: String, root: DocText },
    Return { root: DocText },
    Throws { name: String, root: DocText },
    See { name: String, root: DocText },
    Author { root: DocText },
    Since { root: DocText },
    Deprecated { root: DocText },
    CustomTag { name: String, root: DocText },
}

/// Text with inline markup resolved into fragments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocText {
    pub fragments: Vec<DocFragment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocFragment {
    Text { text: String },
    Code { code: String },
    Link { target: String, label: Option<String> },
}

impl DocumentationNode {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn description(&self) -> Option<&DocText> {
        self.children.iter().find_map(|tag| match tag {
            TagWrapper::Description { root } => Some(root),
            _ => None,
        })
    }

    /// Documentation of a single parameter, from its `@param` tag
    pub fn param(&self, name: &str) -> Option<&DocText> {
        self.children.iter().find_map(|tag| match tag {
            TagWrapper::Param { name: param, root } if param == name => Some(root),
            _ => None,
        })
    }
}

impl TagWrapper {
    pub fn root(&self) -> &DocText {
        match self {
            TagWrapper::Description { root }
            | TagWrapper::Param { root, .. }
            | TagWrapper::Return { root }
            | TagWrapper::Throws { root, .. }
            | TagWrapper::See { root, .. }
            | TagWrapper::Author { root }
            | TagWrapper::Since { root }
            | TagWrapper::Deprecated { root }
            | TagWrapper::CustomTag { root, .. } => root,
        }
    }
}

impl DocText {
    #[cfg(test)]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            fragments: vec![DocFragment::Text { text: text.into() }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl fmt::Display for DocText {
    /// Markdown flavoured rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            match fragment {
                DocFragment::Text { text } => f.write_str(text)?,
                DocFragment::Code { code } => write!(f, "`{}`", code)?,
                DocFragment::Link { target, label: Some(label) } => write!(f, "[{}]({})", label, target)?,
                DocFragment::Link { target, label: None } => write!(f, "`{}`", target)?,
            }
        }
        Ok(())
    }
}

// ---- platform infos ----

/// Documentation data paired with the platforms it applies to
pub trait PlatformInfo {
    fn documentation(&self) -> &DocumentationNode;
    fn platform_data(&self) -> &[PlatformData];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePlatformInfo {
    pub documentation: DocumentationNode,
    pub platform_data: Vec<PlatformData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassPlatformInfo {
    pub info: BasePlatformInfo,
    /// Super types declared for this class
    pub inherited: Vec<Dri>,
}

impl PlatformInfo for BasePlatformInfo {
    fn documentation(&self) -> &DocumentationNode {
        &self.documentation
    }

    fn platform_data(&self) -> &[PlatformData] {
        &self.platform_data
    }
}

impl PlatformInfo for ClassPlatformInfo {
    fn documentation(&self) -> &DocumentationNode {
        &self.info.documentation
    }

    fn platform_data(&self) -> &[PlatformData] {
        &self.info.platform_data
    }
}

// ---- documentables ----

pub trait Documentable {
    fn dri(&self) -> &Dri;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub dri: Dri,
    pub name: String,
    pub functions: Vec<Function>,
    pub properties: Vec<Property>,
    pub classlikes: Vec<Class>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub dri: Dri,
    pub name: String,
    pub kind: JavaClassKind,
    pub constructors: Vec<Function>,
    pub functions: Vec<Function>,
    pub properties: Vec<Property>,
    pub classlikes: Vec<Class>,
    pub expected: Option<ClassPlatformInfo>,
    pub actual: Vec<ClassPlatformInfo>,
    /// Modifiers other than visibility, e.g. `static`, `abstract`, `@Deprecated`
    pub extra: BTreeSet<String>,
    pub visibility: BTreeMap<PlatformData, Visibility>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub dri: Dri,
    /// `<init>` for constructors
    pub name: String,
    pub return_type: Option<JavaTypeWrapper>,
    pub is_constructor: bool,
    pub receiver: Option<Parameter>,
    pub parameters: Vec<Parameter>,
    pub expected: Option<BasePlatformInfo>,
    pub actual: Vec<BasePlatformInfo>,
    pub visibility: BTreeMap<PlatformData, Visibility>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub dri: Dri,
    pub name: String,
    pub type_: JavaTypeWrapper,
    pub expected: Option<BasePlatformInfo>,
    pub actual: Vec<BasePlatformInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub dri: Dri,
    pub name: String,
    pub type_: Option<JavaTypeWrapper>,
    pub receiver: Option<Parameter>,
    pub expected: Option<BasePlatformInfo>,
    pub actual: Vec<BasePlatformInfo>,
    pub accessors: Vec<Function>,
    pub visibility: BTreeMap<PlatformData, Visibility>,
}

macro_rules! impl_documentable {
    ($($ty:ty),*) => {
        $(
            impl Documentable for $ty {
                fn dri(&self) -> &Dri {
                    &self.dri
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_documentable!(Package, Class, Function, Parameter, Property);

// ---- type references ----

/// Documentation-friendly view of a type usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaTypeWrapper {
    pub constructor_fq_name: Option<String>,
    pub constructor_name_path_segments: Vec<String>,
    pub arguments: Vec<JavaTypeWrapper>,
    pub dri: Option<Dri>,
    pub is_primitive: bool,
}

impl JavaTypeWrapper {
    pub fn new(
        constructor_name_path_segments: Vec<String>,
        arguments: Vec<JavaTypeWrapper>,
        dri: Option<Dri>,
        is_primitive: bool,
    ) -> Self {
        Self {
            constructor_fq_name: Some(constructor_name_path_segments.join(".")),
            constructor_name_path_segments,
            arguments,
            dri,
            is_primitive,
        }
    }

    pub fn from_type(type_: &JavaType) -> Self {
        match type_ {
            JavaType::ClassReference { written, class_name, arguments, resolution } => {
                let fq_name = resolution.qualified_name();
                let segments = fq_name.as_ref()
                    .map(|name| name.split('.').map(str::to_string).collect())
                    .unwrap_or_default();
                Self {
                    constructor_fq_name: fq_name,
                    constructor_name_path_segments: segments,
                    arguments: arguments.iter()
                        .filter(|a| matches!(a, JavaType::ClassReference { .. }))
                        .map(Self::from_type)
                        .collect(),
                    dri: Some(class_dri(written, class_name, resolution)),
                    is_primitive: false,
                }
            }
            JavaType::Ellipsis(_) => {
                let canonical = type_.canonical_text();
                Self {
                    constructor_fq_name: Some(canonical.clone()),
                    constructor_name_path_segments: vec![canonical],
                    arguments: Vec::new(),
                    dri: Some(Dri::new("java.lang", "Object")),
                    is_primitive: false,
                }
            }
            JavaType::Array(element) => {
                let canonical = type_.canonical_text();
                // unresolved elements fall back to java.lang.Object
                let dri = match innermost_element(element) {
                    JavaType::ClassReference { resolution: Resolution::Class { package_name, class_names }, .. } => {
                        Some(Dri::new(package_name.clone(), class_names.join(".")))
                    }
                    JavaType::Primitive(_) => None,
                    _ => Some(Dri::new("java.lang", "Object")),
                };
                Self {
                    constructor_fq_name: Some(canonical.clone()),
                    constructor_name_path_segments: vec![canonical],
                    arguments: Vec::new(),
                    dri,
                    is_primitive: false,
                }
            }
            JavaType::Primitive(name) => Self {
                constructor_fq_name: Some(name.clone()),
                constructor_name_path_segments: name.split('.').map(str::to_string).collect(),
                arguments: Vec::new(),
                dri: None,
                is_primitive: true,
            },
            JavaType::Wildcard { bound: Some(WildcardBound::Extends(bound)) }
            | JavaType::Wildcard { bound: Some(WildcardBound::Super(bound)) } => Self::from_type(bound),
            JavaType::Wildcard { bound: None } => Self::new(
                vec!["java".to_string(), "lang".to_string(), "Object".to_string()],
                Vec::new(),
                Some(Dri::new("java.lang", "Object")),
                false,
            ),
        }
    }
}

fn innermost_element(type_: &JavaType) -> &JavaType {
    match type_ {
        JavaType::Array(element) => innermost_element(element),
        other => other,
    }
}

fn class_dri(written: &str, class_name: &str, resolution: &Resolution) -> Dri {
    match resolution {
        Resolution::Class { package_name, class_names } => Dri::new(package_name.clone(), class_names.join(".")),
        // unresolved names keep whatever qualifier was written
        _ => {
            let package = written.strip_suffix(class_name)
                .map(|p| p.trim_end_matches('.'))
                .unwrap_or_default();
            Dri::new(package, class_name)
        }
    }
}

impl fmt::Display for JavaTypeWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constructor_fq_name.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(written: &str, resolution: Resolution, arguments: Vec<JavaType>) -> JavaType {
        match JavaType::class_reference(written, arguments) {
            JavaType::ClassReference { written, class_name, arguments, .. } => {
                JavaType::ClassReference { written, class_name, arguments, resolution }
            }
            other => other,
        }
    }

    fn string_type() -> JavaType {
        reference("String", Resolution::Class {
            package_name: "java.lang".into(),
            class_names: vec!["String".into()],
        }, vec![])
    }

    #[test]
    fn test_platform_data_string_form() {
        let data = PlatformData::new(Platform::Jvm, vec!["jvm".into(), "android".into()]);
        assert_eq!(data.to_string(), "jvm[jvm,android]");
        assert_eq!("jvm[jvm,android]".parse::<PlatformData>().unwrap(), data);
        assert_eq!("common".parse::<PlatformData>().unwrap().targets, Vec::<String>::new());
        assert!("wasm[x]".parse::<PlatformData>().is_err());
    }

    #[test]
    fn test_visibility_map_serializes_with_string_keys() {
        let mut visibility = BTreeMap::new();
        visibility.insert(PlatformData::new(Platform::Jvm, vec!["jvm".into()]), Visibility::Public);
        let json = serde_json::to_string(&visibility).unwrap();
        assert_eq!(json, r#"{"jvm[jvm]":"public"}"#);

        let back: BTreeMap<PlatformData, Visibility> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, visibility);
    }

    #[test]
    fn test_wrapper_of_generic_class_reference() {
        let list = reference("List", Resolution::Class {
            package_name: "java.util".into(),
            class_names: vec!["List".into()],
        }, vec![
            string_type(),
            JavaType::Array(Box::new(JavaType::Primitive("int".into()))),
        ]);

        let wrapper = JavaTypeWrapper::from_type(&list);
        assert_eq!(wrapper.constructor_fq_name.as_deref(), Some("java.util.List"));
        assert_eq!(wrapper.constructor_name_path_segments, vec!["java", "util", "List"]);
        assert_eq!(wrapper.arguments.len(), 1);
        assert_eq!(wrapper.arguments[0].to_string(), "java.lang.String");
        assert_eq!(wrapper.dri, Some(Dri::new("java.util", "List")));
        assert!(!wrapper.is_primitive);
    }

    #[test]
    fn test_wrapper_of_unresolved_and_type_parameter() {
        let unresolved = JavaTypeWrapper::from_type(&reference("com.acme.Gadget", Resolution::Unresolved, vec![]));
        assert_eq!(unresolved.constructor_fq_name, None);
        assert!(unresolved.constructor_name_path_segments.is_empty());
        assert_eq!(unresolved.dri, Some(Dri::new("com.acme", "Gadget")));
        assert_eq!(unresolved.to_string(), "");

        let type_parameter = JavaTypeWrapper::from_type(&reference("T", Resolution::TypeParameter, vec![]));
        assert_eq!(type_parameter.constructor_fq_name, None);
        assert_eq!(type_parameter.dri, Some(Dri::new("", "T")));
    }

    #[test]
    fn test_wrapper_of_varargs_array_and_primitive() {
        let varargs = JavaTypeWrapper::from_type(&JavaType::Ellipsis(Box::new(string_type())));
        assert_eq!(varargs.constructor_fq_name.as_deref(), Some("java.lang.String..."));
        assert_eq!(varargs.constructor_name_path_segments, vec!["java.lang.String..."]);
        assert_eq!(varargs.dri, Some(Dri::new("java.lang", "Object")));

        let strings = JavaTypeWrapper::from_type(&JavaType::Array(Box::new(string_type())));
        assert_eq!(strings.constructor_fq_name.as_deref(), Some("java.lang.String[]"));
        assert_eq!(strings.dri, Some(Dri::new("java.lang", "String")));

        let ints = JavaTypeWrapper::from_type(&JavaType::Array(Box::new(JavaType::Primitive("int".into()))));
        assert_eq!(ints.dri, None);

        let missing = JavaTypeWrapper::from_type(&JavaType::Array(Box::new(
            JavaType::class_reference("Missing", Vec::new()),
        )));
        assert_eq!(missing.constructor_fq_name.as_deref(), Some("Missing[]"));
        assert_eq!(missing.dri, Some(Dri::new("java.lang", "Object")));

        let void = JavaTypeWrapper::from_type(&JavaType::Primitive("void".into()));
        assert!(void.is_primitive);
        assert_eq!(void.constructor_name_path_segments, vec!["void"]);
        assert_eq!(void.dri, None);
    }

    #[test]
    fn test_documentation_node_lookups() {
        let node = DocumentationNode {
            children: vec![
                TagWrapper::Description { root: DocText::plain("Adds.") },
                TagWrapper::Param { name: "a".into(), root: DocText::plain("left") },
                TagWrapper::Param { name: "b".into(), root: DocText::plain("right") },
            ],
        };
        assert_eq!(node.description().unwrap().to_string(), "Adds.");
        assert_eq!(node.param("b").unwrap().to_string(), "right");
        assert!(node.param("c").is_none());
    }
}
