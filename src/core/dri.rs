use std::fmt;
use serde::{Deserialize, Serialize};

/// Structural address of a declaration in the documentation model.
///
/// Built from qualified names and canonical parameter type text, never from
/// compiler symbol identity, so two passes over the same sources always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dri {
    pub package_name: Option<String>,
    pub class_names: Option<String>,
    pub callable: Option<Callable>,
    /// 0 points at the declaration itself, n at the n-th callable parameter
    pub target: usize,
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Callable {
    pub name: String,
    pub receiver: Option<TypeReference>,
    pub params: Vec<TypeReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name")]
pub enum TypeReference {
    JavaClass(String),
}

impl Dri {
    pub fn for_package(package_name: impl Into<String>) -> Self {
        Self {
            package_name: Some(package_name.into()),
            class_names: None,
            callable: None,
            target: 0,
            extra: None,
        }
    }

    pub fn new(package_name: impl Into<String>, class_names: impl Into<String>) -> Self {
        Self {
            class_names: Some(class_names.into()),
            ..Self::for_package(package_name)
        }
    }

    /// Address of a class nested in (or declared by) this one.
    pub fn with_class(&self, name: &str) -> Self {
        let class_names = match &self.class_names {
            Some(outer) => format!("{}.{}", outer, name),
            None => name.to_string(),
        };
        Self {
            package_name: self.package_name.clone(),
            class_names: Some(class_names),
            callable: None,
            target: 0,
            extra: self.extra.clone(),
        }
    }

    pub fn with_callable(&self, callable: Callable) -> Self {
        Self {
            callable: Some(callable),
            ..self.clone()
        }
    }

    pub fn with_target(&self, target: usize) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

impl Callable {
    pub fn new(name: impl Into<String>, receiver: Option<TypeReference>, params: Vec<TypeReference>) -> Self {
        Self {
            name: name.into(),
            receiver,
            params,
        }
    }

    pub fn signature(&self) -> String {
        let receiver = self.receiver.as_ref().map(|r| r.to_string()).unwrap_or_default();
        let mut signature = receiver;
        for param in &self.params {
            signature.push('#');
            signature.push_str(&param.to_string());
        }
        if self.params.is_empty() {
            signature.push('#');
        }
        signature
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeReference::JavaClass(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Dri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.package_name.as_deref().unwrap_or_default(),
            self.class_names.as_deref().unwrap_or_default(),
            self.callable.as_ref().map(|c| c.name.as_str()).unwrap_or_default(),
            self.callable.as_ref().map(|c| c.signature()).unwrap_or_default(),
            self.target,
            self.extra.as_deref().unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_class_nests_names() {
        let dri = Dri::for_package("com.example").with_class("Outer").with_class("Inner");
        assert_eq!(dri.package_name.as_deref(), Some("com.example"));
        assert_eq!(dri.class_names.as_deref(), Some("Outer.Inner"));
    }

    #[test]
    fn test_display_of_callable_parameter() {
        let callable = Callable::new(
            "put",
            Some(TypeReference::JavaClass("Cache".to_string())),
            vec![
                TypeReference::JavaClass("java.lang.String".to_string()),
                TypeReference::JavaClass("int[]".to_string()),
            ],
        );
        let dri = Dri::new("com.example", "Cache").with_callable(callable).with_target(2);
        assert_eq!(dri.to_string(), "com.example/Cache/put/Cache#java.lang.String#int[]/2/");
    }

    #[test]
    fn test_display_of_parameterless_callable() {
        let callable = Callable::new("size", Some(TypeReference::JavaClass("Cache".to_string())), vec![]);
        let dri = Dri::new("", "Cache").with_callable(callable);
        assert_eq!(dri.to_string(), "/Cache/size/Cache#/0/");
    }

    #[test]
    fn test_with_class_drops_callable() {
        let callable = Callable::new("f", None, vec![]);
        let dri = Dri::new("p", "A").with_callable(callable).with_class("B");
        assert!(dri.callable.is_none());
        assert_eq!(dri.to_string(), "p/A.B///0/");
    }
}
