//! Folds documentation modules together.
//!
//! Declarations are matched by DRI. Platform-keyed data (visibility, platform
//! infos) of matching declarations is unioned, everything else is kept from
//! the first occurrence.

use tracing::debug;

use super::model::{Class, Documentable, Function, Module, Package, Property};

pub fn merge_modules(name: &str, modules: Vec<Module>) -> Module {
    let mut packages: Vec<Package> = Vec::new();
    for module in modules {
        for package in module.packages {
            merge_into(&mut packages, package, merge_package);
        }
    }
    packages.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("Merged module '{}' has {} package(s)", name, packages.len());
    Module {
        name: name.to_string(),
        packages,
    }
}

fn merge_into<T: Documentable>(items: &mut Vec<T>, item: T, merge: fn(&mut T, T)) {
    match items.iter_mut().find(|existing| existing.dri() == item.dri()) {
        Some(existing) => {
            debug!("Merging declarations of {}", item.name());
            merge(existing, item)
        }
        None => items.push(item),
    }
}

fn extend_unique<T: PartialEq>(target: &mut Vec<T>, other: Vec<T>) {
    for item in other {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

fn merge_package(target: &mut Package, other: Package) {
    for function in other.functions {
        merge_into(&mut target.functions, function, merge_function);
    }
    for property in other.properties {
        merge_into(&mut target.properties, property, merge_property);
    }
    for class in other.classlikes {
        merge_into(&mut target.classlikes, class, merge_class);
    }
}

fn merge_class(target: &mut Class, other: Class) {
    for constructor in other.constructors {
        merge_into(&mut target.constructors, constructor, merge_function);
    }
    for function in other.functions {
        merge_into(&mut target.functions, function, merge_function);
    }
    for property in other.properties {
        merge_into(&mut target.properties, property, merge_property);
    }
    for class in other.classlikes {
        merge_into(&mut target.classlikes, class, merge_class);
    }

    if target.expected.is_none() {
        target.expected = other.expected;
    }
    extend_unique(&mut target.actual, other.actual);
    target.extra.extend(other.extra);
    target.visibility.extend(other.visibility);
}

fn merge_function(target: &mut Function, other: Function) {
    for (parameter, other_parameter) in target.parameters.iter_mut().zip(other.parameters) {
        extend_unique(&mut parameter.actual, other_parameter.actual);
    }
    if target.expected.is_none() {
        target.expected = other.expected;
    }
    extend_unique(&mut target.actual, other.actual);
    target.visibility.extend(other.visibility);
}

fn merge_property(target: &mut Property, other: Property) {
    for accessor in other.accessors {
        merge_into(&mut target.accessors, accessor, merge_function);
    }
    if target.expected.is_none() {
        target.expected = other.expected;
    }
    extend_unique(&mut target.actual, other.actual);
    target.visibility.extend(other.visibility);
}
